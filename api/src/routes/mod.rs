//! HTTP route entry point for `/api/...`.
//!
//! Routes are organized by domain, each protected via the appropriate
//! access-control middleware:
//! - `/health` → Health check endpoint (public)
//! - `/auth` → Registration and login (public)
//! - `/classes` → Class management (lecturer create, authenticated read)
//! - `/sessions` → Attendance session lifecycle (lecturer only)
//! - `/checkin` → Check-in page (public) and check-in submission (student token)
//! - `/notifications` → Notification records (lecturer only)
//! - `/me` → Caller-specific endpoints (authenticated)

use axum::{Router, middleware::from_fn_with_state};

use crate::auth::guards::allow_authenticated;
use crate::routes::{
    auth::auth_routes, checkin::checkin_routes, classes::classes_routes, health::health_routes,
    me::me_routes, notifications::notifications_routes, sessions::sessions_routes,
};
use crate::state::AppState;

pub mod auth;
pub mod checkin;
pub mod classes;
pub mod health;
pub mod me;
pub mod notifications;
pub mod sessions;

/// Builds the complete application router for all HTTP endpoints.
pub fn routes(app_state: AppState) -> Router {
    Router::new()
        .nest("/health", health_routes())
        .nest("/auth", auth_routes())
        .nest("/classes", classes_routes(app_state.clone()))
        .nest("/sessions", sessions_routes(app_state.clone()))
        .nest("/checkin", checkin_routes())
        .nest("/notifications", notifications_routes(app_state.clone()))
        .nest(
            "/me",
            me_routes().route_layer(from_fn_with_state(app_state.clone(), allow_authenticated)),
        )
        .with_state(app_state)
}
