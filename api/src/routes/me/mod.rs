//! Routes for the `/me` endpoint group: caller-specific reads.

pub mod get;

use axum::{Router, routing::get};

use crate::state::AppState;
pub use get::list_my_notifications;

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/notifications", get(list_my_notifications))
}
