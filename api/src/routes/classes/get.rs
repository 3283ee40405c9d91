use axum::{Json, extract::State, http::StatusCode};
use sea_orm::{EntityTrait, QueryOrder};

use db::models::class::{Column as ClassCol, Entity as ClassEntity};

use crate::response::ApiResponse;
use crate::state::AppState;

use super::post::ClassResponse;

/// GET /api/classes
///
/// Lists all classes, newest first.
///
/// **Auth**: any authenticated user.
pub async fn list_classes(
    State(state): State<AppState>,
) -> (StatusCode, Json<ApiResponse<Vec<ClassResponse>>>) {
    match ClassEntity::find()
        .order_by_desc(ClassCol::CreatedAt)
        .all(state.db())
        .await
    {
        Ok(rows) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                rows.into_iter().map(ClassResponse::from).collect(),
                "Classes retrieved",
            )),
        ),
        Err(e) => {
            tracing::error!(error = %e, "failed to list classes");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Failed to list classes")),
            )
        }
    }
}
