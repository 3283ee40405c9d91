//! Routes for the `/classes` endpoint group.

pub mod get;
pub mod post;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};

use crate::auth::guards::{allow_authenticated, allow_lecturer};
use crate::state::AppState;

pub use get::list_classes;
pub use post::create_class;

pub fn classes_routes(app_state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            post(create_class).route_layer(from_fn_with_state(app_state.clone(), allow_lecturer)),
        )
        .route(
            "/",
            get(list_classes)
                .route_layer(from_fn_with_state(app_state, allow_authenticated)),
        )
}
