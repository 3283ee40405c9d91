use axum::{Extension, Json, extract::State, http::StatusCode};
use serde::Serialize;

use db::models::notification::Model as NotificationModel;

use crate::auth::AuthUser;
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Serialize, Default)]
pub struct NotificationResponse {
    pub id: i64,
    pub title: String,
    pub body: String,
    pub created_at: String,
}

impl From<NotificationModel> for NotificationResponse {
    fn from(m: NotificationModel) -> Self {
        Self {
            id: m.id,
            title: m.title,
            body: m.body,
            created_at: m.created_at.to_rfc3339(),
        }
    }
}

/// GET /api/me/notifications
///
/// Lists the caller's notification records, newest first.
pub async fn list_my_notifications(
    State(state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
) -> (StatusCode, Json<ApiResponse<Vec<NotificationResponse>>>) {
    match NotificationModel::list_for_user(state.db(), claims.sub).await {
        Ok(rows) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                rows.into_iter().map(NotificationResponse::from).collect(),
                "Notifications retrieved",
            )),
        ),
        Err(e) => {
            tracing::error!(error = %e, user_id = claims.sub, "failed to list notifications");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Failed to list notifications")),
            )
        }
    }
}
