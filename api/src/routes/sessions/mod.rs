//! Routes for the `/sessions` endpoint group: attendance session lifecycle.
//!
//! Everything here is lecturer-only; students only ever touch a session
//! through `/checkin`.

mod common;
pub mod get;
pub mod post;
pub mod put;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post, put},
};

use crate::auth::guards::allow_lecturer;
use crate::state::AppState;

pub use get::{get_session, list_session_records, list_sessions};
pub use post::create_session;
pub use put::close_session;

pub fn sessions_routes(app_state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            post(create_session)
                .route_layer(from_fn_with_state(app_state.clone(), allow_lecturer)),
        )
        .route(
            "/",
            get(list_sessions).route_layer(from_fn_with_state(app_state.clone(), allow_lecturer)),
        )
        .route(
            "/{session_id}",
            get(get_session).route_layer(from_fn_with_state(app_state.clone(), allow_lecturer)),
        )
        .route(
            "/{session_id}/close",
            put(close_session).route_layer(from_fn_with_state(app_state.clone(), allow_lecturer)),
        )
        .route(
            "/{session_id}/records",
            get(list_session_records)
                .route_layer(from_fn_with_state(app_state, allow_lecturer)),
        )
}
