use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use common::format_validation_errors;
use db::models::attendance_record::{CheckInError, CheckInOutcome, Model as AttendanceRecord};
use db::models::user::Role;

use crate::auth::AuthUser;
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct CheckInRequest {
    #[validate(range(min = -90.0, max = 90.0, message = "Latitude must be between -90 and 90 degrees"))]
    pub latitude: f64,

    #[validate(range(min = -180.0, max = 180.0, message = "Longitude must be between -180 and 180 degrees"))]
    pub longitude: f64,
}

#[derive(Debug, Deserialize)]
pub struct SecretQuery {
    /// The session secret carried in the scanned link as `?c=...`.
    pub c: Option<String>,
}

#[derive(Debug, Serialize, Default)]
pub struct CheckInData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_m: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radius_m: Option<i32>,
}

/// POST /api/checkin/{session_id}?c={secret}
///
/// Marks the calling student present at a session if the secret matches,
/// the session is still open, and the submitted coordinates fall within
/// the session radius.
///
/// **Auth**: bearer token with role `student`. A lecturer token is always
/// rejected; lecturers cannot mark themselves present.
///
/// ### Responses
/// - `200 OK` "Attendance recorded" with the computed distance
/// - `200 OK` "Already checked in..." when a record already exists (a
///   repeat scan is not an error)
/// - `400 Bad Request` for a wrong secret, a closed session, bad
///   coordinates, or an out-of-range position (the latter carries the
///   computed distance and allowed radius in `data`)
/// - `401 Unauthorized` for a missing or invalid token
/// - `403 Forbidden` for a non-student role
/// - `404 Not Found` for an unknown session
pub async fn process_checkin(
    State(state): State<AppState>,
    Path(session_id): Path<i64>,
    Query(query): Query<SecretQuery>,
    AuthUser(claims): AuthUser,
    Json(body): Json<CheckInRequest>,
) -> (StatusCode, Json<ApiResponse<CheckInData>>) {
    if claims.role != Role::Student {
        return (
            StatusCode::FORBIDDEN,
            Json(ApiResponse::error("Only students can check in to a session")),
        );
    }

    if let Err(validation_errors) = body.validate() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error(format_validation_errors(
                &validation_errors,
            ))),
        );
    }

    let supplied_secret = query.c.unwrap_or_default();

    match AttendanceRecord::check_in(
        state.db(),
        session_id,
        claims.sub,
        &supplied_secret,
        body.latitude,
        body.longitude,
    )
    .await
    {
        Ok(CheckInOutcome::Recorded { distance_m }) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                CheckInData {
                    distance_m: Some(distance_m),
                    radius_m: None,
                },
                "Attendance recorded",
            )),
        ),
        Ok(CheckInOutcome::AlreadyCheckedIn) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                CheckInData::default(),
                "Already checked in for this session, no need to scan again",
            )),
        ),
        Err(CheckInError::SessionNotFound) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error("Class session not found")),
        ),
        Err(e @ (CheckInError::SecretMismatch | CheckInError::SessionClosed)) => (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error(e.to_string())),
        ),
        Err(CheckInError::OutOfRange { distance_m, radius_m }) => (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error_with_data(
                CheckInData {
                    distance_m: Some(distance_m),
                    radius_m: Some(radius_m),
                },
                format!(
                    "Too far from the class location: {distance_m:.0}m away (allowed: {radius_m}m)"
                ),
            )),
        ),
        Err(CheckInError::Db(e)) => {
            tracing::error!(
                error = %e,
                session_id,
                user_id = claims.sub,
                "check-in failed unexpectedly"
            );
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Failed to record attendance")),
            )
        }
    }
}
