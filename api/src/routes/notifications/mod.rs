//! Routes for the `/notifications` endpoint group.
//!
//! Creation of notification records only. Delivery is somebody else's
//! problem; students read theirs under `/me/notifications`.

pub mod post;

use axum::{Router, middleware::from_fn_with_state, routing::post};

use crate::auth::guards::allow_lecturer;
use crate::state::AppState;
pub use post::create_notification;

pub fn notifications_routes(app_state: AppState) -> Router<AppState> {
    Router::new().route(
        "/",
        post(create_notification).route_layer(from_fn_with_state(app_state, allow_lecturer)),
    )
}
