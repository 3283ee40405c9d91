use axum::{
    Json,
    body::Body,
    extract::{FromRequestParts, State},
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
};
use db::models::user::Role;

use crate::auth::claims::AuthUser;
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(serde::Serialize, Default)]
pub struct Empty;

/// Helper to extract and validate the user from request headers and insert
/// the `AuthUser` back into the request extensions for downstream handlers.
async fn extract_and_insert_authuser(
    state: &AppState,
    mut req: Request<Body>,
) -> Result<(Request<Body>, AuthUser), (StatusCode, Json<ApiResponse<Empty>>)> {
    let (mut parts, body) = req.into_parts();
    let user = AuthUser::from_request_parts(&mut parts, state)
        .await
        .map_err(|_| {
            (
                StatusCode::UNAUTHORIZED,
                Json(ApiResponse::error("Authentication required")),
            )
        })?;

    req = Request::from_parts(parts, body);
    req.extensions_mut().insert(user.clone());
    Ok((req, user))
}

/// Basic guard to ensure the request is authenticated.
pub async fn allow_authenticated(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, (StatusCode, Json<ApiResponse<Empty>>)> {
    let (req, _user) = extract_and_insert_authuser(&state, req).await?;

    Ok(next.run(req).await)
}

/// Lecturer-only guard for class and session management routes.
pub async fn allow_lecturer(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, (StatusCode, Json<ApiResponse<Empty>>)> {
    let (req, user) = extract_and_insert_authuser(&state, req).await?;

    if user.0.role != Role::Lecturer {
        return Err((
            StatusCode::FORBIDDEN,
            Json(ApiResponse::error("Lecturer access required")),
        ));
    }

    Ok(next.run(req).await)
}
