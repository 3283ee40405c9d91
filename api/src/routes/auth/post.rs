use axum::{Json, extract::State, http::StatusCode};
use sea_orm::SqlErr;
use serde::{Deserialize, Serialize};
use validator::Validate;

use common::format_validation_errors;
use db::models::user::{Model as UserModel, Role};

use crate::auth::generate_jwt;
use crate::response::ApiResponse;
use crate::state::AppState;

lazy_static::lazy_static! {
    static ref USERNAME_REGEX: regex::Regex =
        regex::Regex::new("^[A-Za-z0-9][A-Za-z0-9_.-]{2,19}$").unwrap();
}

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(regex(
        path = *USERNAME_REGEX,
        message = "Username must be 3-20 characters: letters, digits, '.', '-' or '_'"
    ))]
    pub username: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    /// Defaults to `student` when omitted.
    pub role: Option<Role>,
}

#[derive(Debug, Serialize, Default)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: String,
}

/// POST /api/auth/register
///
/// Creates an account. The password is stored as an Argon2 hash, never in
/// plain text.
///
/// ### Responses
/// - `201 Created` with the new user's public fields
/// - `400 Bad Request` on validation failure
/// - `409 Conflict` when the username or email is already taken
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> (StatusCode, Json<ApiResponse<UserResponse>>) {
    if let Err(validation_errors) = req.validate() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error(format_validation_errors(
                &validation_errors,
            ))),
        );
    }

    let role = req.role.unwrap_or(Role::Student);

    match UserModel::create(state.db(), &req.username, &req.email, &req.password, role).await {
        Ok(user) => (
            StatusCode::CREATED,
            Json(ApiResponse::success(
                UserResponse {
                    id: user.id,
                    username: user.username,
                    email: user.email,
                    role: user.role.to_string(),
                },
                "User registered successfully",
            )),
        ),
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => (
            StatusCode::CONFLICT,
            Json(ApiResponse::error(
                "A user with this username or email already exists",
            )),
        ),
        Err(e) => {
            tracing::error!(error = %e, "failed to register user");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Failed to register user")),
            )
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Default)]
pub struct LoginResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: String,
    pub token: String,
    pub expires_at: String,
}

/// POST /api/auth/login
///
/// Verifies credentials and issues a signed identity token carrying the
/// subject id and role. Unknown usernames and wrong passwords get the same
/// answer.
///
/// ### Responses
/// - `200 OK` with `{ token, expires_at, ... }`
/// - `401 Unauthorized` on bad credentials
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> (StatusCode, Json<ApiResponse<LoginResponse>>) {
    match UserModel::verify_credentials(state.db(), &req.username, &req.password).await {
        Ok(Some(user)) => {
            let (token, expires_at) = generate_jwt(&state, user.id, user.role.clone());
            (
                StatusCode::OK,
                Json(ApiResponse::success(
                    LoginResponse {
                        id: user.id,
                        username: user.username,
                        email: user.email,
                        role: user.role.to_string(),
                        token,
                        expires_at,
                    },
                    "Login successful",
                )),
            )
        }
        Ok(None) => (
            StatusCode::UNAUTHORIZED,
            Json(ApiResponse::error("Invalid username or password")),
        ),
        Err(e) => {
            tracing::error!(error = %e, "login failed unexpectedly");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Failed to log in")),
            )
        }
    }
}
