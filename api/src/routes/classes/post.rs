use axum::{Extension, Json, extract::State, http::StatusCode};
use sea_orm::SqlErr;
use serde::{Deserialize, Serialize};
use validator::Validate;

use common::format_validation_errors;
use db::models::class::Model as ClassModel;

use crate::auth::AuthUser;
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateClassReq {
    #[validate(length(min = 2, max = 20, message = "Class code must be 2-20 characters"))]
    pub code: String,

    #[validate(length(min = 1, max = 100, message = "Class title must be 1-100 characters"))]
    pub title: String,

    pub semester: Option<String>,
}

#[derive(Debug, Serialize, Default)]
pub struct ClassResponse {
    pub id: i64,
    pub code: String,
    pub title: String,
    pub semester: Option<String>,
    pub lecturer_id: i64,
}

impl From<ClassModel> for ClassResponse {
    fn from(m: ClassModel) -> Self {
        Self {
            id: m.id,
            code: m.code,
            title: m.title,
            semester: m.semester,
            lecturer_id: m.lecturer_id,
        }
    }
}

/// POST /api/classes
///
/// Creates a class owned by the calling lecturer.
///
/// **Auth**: lecturer only (enforced by router guard).
pub async fn create_class(
    State(state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    Json(req): Json<CreateClassReq>,
) -> (StatusCode, Json<ApiResponse<ClassResponse>>) {
    if let Err(validation_errors) = req.validate() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error(format_validation_errors(
                &validation_errors,
            ))),
        );
    }

    match ClassModel::create(
        state.db(),
        &req.code,
        &req.title,
        req.semester.as_deref(),
        claims.sub,
    )
    .await
    {
        Ok(class) => (
            StatusCode::CREATED,
            Json(ApiResponse::success(class.into(), "Class created")),
        ),
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => (
            StatusCode::CONFLICT,
            Json(ApiResponse::error("A class with this code already exists")),
        ),
        Err(e) => {
            tracing::error!(error = %e, "failed to create class");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Failed to create class")),
            )
        }
    }
}
