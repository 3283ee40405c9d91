use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};

use db::models::{
    attendance_record,
    class,
    class_session::{Column as SessionCol, Entity as SessionEntity},
};

use crate::auth::AuthUser;
use crate::response::ApiResponse;
use crate::state::AppState;

use super::common::{
    AttendanceRecordResponse, ListQuery, SessionLookupError, SessionResponse, owned_session,
};

fn lookup_failure<T: serde::Serialize + Default>(
    err: SessionLookupError,
) -> (StatusCode, Json<ApiResponse<T>>) {
    match err {
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
                Json(ApiResponse::error("Failed to load session")),
            )
        }
    }
}

/// GET /api/sessions?class_id={id}
///
/// Lists a class's attendance sessions, newest first.
///
/// **Auth**: the class's lecturer.
pub async fn list_sessions(
    State(state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    Query(q): Query<ListQuery>,
) -> (StatusCode, Json<ApiResponse<Vec<SessionResponse>>>) {
    let class = match class::Entity::find_by_id(q.class_id).one(state.db()).await {
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
                Json(ApiResponse::error("Failed to list sessions")),
            );
        }
    };

    if class.lecturer_id != claims.sub {
        return (
            StatusCode::FORBIDDEN,
            Json(ApiResponse::error("You do not lecture this class")),
        );
    }

    match SessionEntity::find()
        .filter(SessionCol::ClassId.eq(class.id))
        .order_by_desc(SessionCol::CreatedAt)
        .all(state.db())
        .await
    {
        Ok(rows) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                rows.into_iter().map(SessionResponse::from).collect(),
                "Attendance sessions retrieved",
            )),
        ),
        Err(e) => {
            tracing::error!(error = %e, class_id = class.id, "failed to list sessions");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Failed to list sessions")),
            )
        }
    }
}

/// GET /api/sessions/{session_id}
///
/// Fetches a single attendance session, secret included.
///
/// **Auth**: the owning lecturer.
pub async fn get_session(
    State(state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    Path(session_id): Path<i64>,
) -> (StatusCode, Json<ApiResponse<SessionResponse>>) {
    match owned_session(&state, session_id, claims.sub).await {
        Ok(session) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                session.into(),
                "Attendance session retrieved",
            )),
        ),
        Err(e) => lookup_failure(e),
    }
}

/// GET /api/sessions/{session_id}/records
///
/// Lists the attendance records captured for a session, in check-in order.
///
/// **Auth**: the owning lecturer.
pub async fn list_session_records(
    State(state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    Path(session_id): Path<i64>,
) -> (StatusCode, Json<ApiResponse<Vec<AttendanceRecordResponse>>>) {
    let session = match owned_session(&state, session_id, claims.sub).await {
        Ok(session) => session,
        Err(e) => return lookup_failure(e),
    };

    match attendance_record::Model::list_for_session(state.db(), session.id).await {
        Ok(rows) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                rows.into_iter().map(AttendanceRecordResponse::from).collect(),
                "Attendance records retrieved",
            )),
        ),
        Err(e) => {
            tracing::error!(error = %e, session_id, "failed to list attendance records");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Failed to list attendance records")),
            )
        }
    }
}
