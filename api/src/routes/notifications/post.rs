use axum::{Json, extract::State, http::StatusCode};
use sea_orm::EntityTrait;
use serde::Deserialize;
use validator::Validate;

use common::format_validation_errors;
use db::models::{notification::Model as NotificationModel, user};

use crate::response::ApiResponse;
use crate::routes::me::get::NotificationResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateNotificationReq {
    pub user_id: i64,

    #[validate(length(min = 1, max = 100, message = "Title must be 1-100 characters"))]
    pub title: String,

    #[validate(length(min = 1, max = 500, message = "Body must be 1-500 characters"))]
    pub body: String,
}

/// POST /api/notifications
///
/// Creates a notification record for a user.
///
/// **Auth**: lecturer only (router guard).
pub async fn create_notification(
    State(state): State<AppState>,
    Json(req): Json<CreateNotificationReq>,
) -> (StatusCode, Json<ApiResponse<NotificationResponse>>) {
    if let Err(validation_errors) = req.validate() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error(format_validation_errors(
                &validation_errors,
            ))),
        );
    }

    match user::Entity::find_by_id(req.user_id).one(state.db()).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ApiResponse::error("User not found")),
            );
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to load user");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Failed to create notification")),
            );
        }
    }

    match NotificationModel::create(state.db(), req.user_id, &req.title, &req.body).await {
        Ok(notification) => (
            StatusCode::CREATED,
            Json(ApiResponse::success(
                notification.into(),
                "Notification created",
            )),
        ),
        Err(e) => {
            tracing::error!(error = %e, user_id = req.user_id, "failed to create notification");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Failed to create notification")),
            )
        }
    }
}
