use axum::{Extension, Json, extract::State, http::StatusCode};
use sea_orm::{EntityTrait, SqlErr};
use validator::Validate;

use common::format_validation_errors;
use db::models::{class, class_session};

use crate::auth::AuthUser;
use crate::response::ApiResponse;
use crate::state::AppState;

use super::common::{CreateSessionReq, SessionResponse};

/// POST /api/sessions
///
/// Creates an attendance session for a class the caller lectures: anchored
/// to the given GPS coordinate and radius, open for check-ins, with a
/// freshly generated secret included in the response so the caller can
/// render the QR link.
///
/// **Auth**: lecturer only (router guard), and the class must be theirs.
///
/// ### Responses
/// - `201 Created` with the session including its `secret`
/// - `400 Bad Request` on validation failure
/// - `403 Forbidden` when the class belongs to another lecturer
/// - `404 Not Found` for an unknown class
/// - `409 Conflict` on a uniqueness violation
pub async fn create_session(
    State(state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    Json(req): Json<CreateSessionReq>,
) -> (StatusCode, Json<ApiResponse<SessionResponse>>) {
    if let Err(validation_errors) = req.validate() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error(format_validation_errors(
                &validation_errors,
            ))),
        );
    }

    let class = match class::Entity::find_by_id(req.class_id).one(state.db()).await {
        Ok(Some(class)) => class,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ApiResponse::error("Class not found")),
            );
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to load class");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Failed to create session")),
            );
        }
    };

    if class.lecturer_id != claims.sub {
        return (
            StatusCode::FORBIDDEN,
            Json(ApiResponse::error("You do not lecture this class")),
        );
    }

    match class_session::Model::create(
        state.db(),
        class.id,
        req.session_date,
        req.start_time,
        req.end_time,
        req.latitude,
        req.longitude,
        req.radius_m.unwrap_or(50),
        None, // generate random secret
    )
    .await
    {
        Ok(session) => (
            StatusCode::CREATED,
            Json(ApiResponse::success(
                session.into(),
                "Attendance session created",
            )),
        ),
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => (
            StatusCode::CONFLICT,
            Json(ApiResponse::error("Session already exists")),
        ),
        Err(e) => {
            tracing::error!(error = %e, class_id = class.id, "failed to create session");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Failed to create session")),
            )
        }
    }
}
