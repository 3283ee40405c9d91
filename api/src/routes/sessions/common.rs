use chrono::{NaiveDate, NaiveTime};
use rust_decimal::prelude::ToPrimitive;
use sea_orm::EntityTrait;
use serde::{Deserialize, Serialize};
use validator::Validate;

use db::models::{attendance_record, class, class_session};

use crate::state::AppState;

#[derive(Debug, Serialize, Default)]
pub struct SessionResponse {
    pub id: i64,
    pub class_id: i64,
    pub session_date: String,
    pub start_time: String,
    pub end_time: String,
    pub latitude: f64,
    pub longitude: f64,
    pub radius_m: i32,
    /// The QR link secret. Only lecturers ever see a session through these
    /// routes, so returning it here is what lets them render the link.
    pub secret: String,
    pub open: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<class_session::Model> for SessionResponse {
    fn from(m: class_session::Model) -> Self {
        let (latitude, longitude) = m.anchor();
        Self {
            id: m.id,
            class_id: m.class_id,
            session_date: m.session_date.to_string(),
            start_time: m.start_time.to_string(),
            end_time: m.end_time.to_string(),
            latitude,
            longitude,
            radius_m: m.radius_m,
            secret: m.secret,
            open: m.open,
            created_at: m.created_at.to_rfc3339(),
            updated_at: m.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateSessionReq {
    pub class_id: i64,
    pub session_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,

    #[validate(range(min = -90.0, max = 90.0, message = "Latitude must be between -90 and 90 degrees"))]
    pub latitude: f64,

    #[validate(range(min = -180.0, max = 180.0, message = "Longitude must be between -180 and 180 degrees"))]
    pub longitude: f64,

    /// Defaults to 50 meters when omitted.
    #[validate(range(min = 1, message = "Radius must be a positive number of meters"))]
    pub radius_m: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub class_id: i64,
}

#[derive(Debug, Serialize, Default)]
pub struct AttendanceRecordResponse {
    pub session_id: i64,
    pub user_id: i64,
    pub checked_in_at: String,
    pub status: String,
    pub latitude: f64,
    pub longitude: f64,
    pub distance_m: f64,
}

impl From<attendance_record::Model> for AttendanceRecordResponse {
    fn from(m: attendance_record::Model) -> Self {
        Self {
            session_id: m.session_id,
            user_id: m.user_id,
            checked_in_at: m.checked_in_at.to_rfc3339(),
            status: m.status.to_string(),
            latitude: m.latitude.to_f64().unwrap_or_default(),
            longitude: m.longitude.to_f64().unwrap_or_default(),
            distance_m: m.distance_m,
        }
    }
}

/// What a lecturer-facing session lookup can fail with.
pub(super) enum SessionLookupError {
    NotFound,
    NotOwner,
    Db(sea_orm::DbErr),
}

/// Resolves a session and checks the calling lecturer owns its class.
///
/// Ownership goes through an explicit class lookup rather than a relation
/// traversal.
pub(super) async fn owned_session(
    state: &AppState,
    session_id: i64,
    lecturer_id: i64,
) -> Result<class_session::Model, SessionLookupError> {
    let session = class_session::Entity::find_by_id(session_id)
        .one(state.db())
        .await
        .map_err(SessionLookupError::Db)?
        .ok_or(SessionLookupError::NotFound)?;

    let class = class::Entity::find_by_id(session.class_id)
        .one(state.db())
        .await
        .map_err(SessionLookupError::Db)?
        .ok_or(SessionLookupError::NotFound)?;

    if class.lecturer_id != lecturer_id {
        return Err(SessionLookupError::NotOwner);
    }

    Ok(session)
}
