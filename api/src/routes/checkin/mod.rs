//! Routes for the `/checkin` endpoint group: the page a scanned QR link
//! lands on, and the check-in submission itself.

pub mod get;
pub mod post;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

pub use get::checkin_page;
pub use post::process_checkin;

/// The page route is public (the secret in the link is the gate); the
/// submission route authenticates through the bearer token itself.
pub fn checkin_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(checkin_page))
        .route("/{session_id}", post(process_checkin))
}
