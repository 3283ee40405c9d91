use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};

use db::models::class_session;

use crate::auth::AuthUser;
use crate::response::ApiResponse;
use crate::state::AppState;

use super::common::{SessionLookupError, SessionResponse, owned_session};

/// PUT /api/sessions/{session_id}/close
///
/// Stops accepting check-ins for a session. Idempotent: closing an
/// already-closed session answers 200 without changing anything. There is
/// no reopen endpoint.
///
/// **Auth**: the owning lecturer.
pub async fn close_session(
    State(state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    Path(session_id): Path<i64>,
) -> (StatusCode, Json<ApiResponse<SessionResponse>>) {
    if let Err(e) = owned_session(&state, session_id, claims.sub).await {
        return match e {
            SessionLookupError::NotFound => (
                StatusCode::NOT_FOUND,
                Json(ApiResponse::error("Attendance session not found")),
            ),
            SessionLookupError::NotOwner => (
                StatusCode::FORBIDDEN,
                Json(ApiResponse::error("You do not lecture this class")),
            ),
            SessionLookupError::Db(e) => {
                tracing::error!(error = %e, "session lookup failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ApiResponse::error("Failed to close session")),
                )
            }
        };
    }

    match class_session::Model::close(state.db(), session_id).await {
        Ok(Some(session)) => (
            StatusCode::OK,
            Json(ApiResponse::success(session.into(), "Session closed")),
        ),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error("Attendance session not found")),
        ),
        Err(e) => {
            tracing::error!(error = %e, session_id, "failed to close session");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Failed to close session")),
            )
        }
    }
}
