use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{DatabaseConnection, QueryFilter, QueryOrder, Set, SqlErr};
use strum::{Display, EnumString};
use thiserror::Error;

use crate::models::class_session::{self, SessionAccessError, to_coord};
use util::geo;

/// One student's recorded presence at one session.
///
/// The composite primary key (`session_id`, `user_id`) is enforced by the
/// storage layer and is the final authority against duplicate check-ins;
/// rows are never mutated or deleted by the check-in path.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, serde::Serialize)]
#[sea_orm(table_name = "attendance_records")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub session_id: i64,
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: i64,

    pub checked_in_at: DateTime<Utc>,
    pub status: AttendanceStatus,
    /// The position the student submitted, kept for later fraud review.
    #[sea_orm(column_type = "Decimal(Some((10, 7)))")]
    pub latitude: Decimal,
    #[sea_orm(column_type = "Decimal(Some((10, 7)))")]
    pub longitude: Decimal,
    /// Computed distance to the session anchor at check-in time, in meters.
    pub distance_m: f64,
}

/// Check-in only ever writes `Present`; `Late` and `Absent` exist for
/// post-session processing outside this path.
#[derive(
    Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Display, EnumString,
    serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "attendance_status_type")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum AttendanceStatus {
    #[sea_orm(string_value = "present")]
    Present,
    #[sea_orm(string_value = "late")]
    Late,
    #[sea_orm(string_value = "absent")]
    Absent,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::class_session::Entity",
        from = "Column::SessionId",
        to = "super::class_session::Column::Id"
    )]
    Session,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::class_session::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Session.def()
    }
    fn via() -> Option<RelationDef> {
        None
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
    fn via() -> Option<RelationDef> {
        None
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Successful result of a check-in attempt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CheckInOutcome {
    /// A new record was written; `distance_m` is the computed distance.
    Recorded { distance_m: f64 },
    /// A record for this (session, student) pair already exists. This is a
    /// friendly no-op, not a conflict.
    AlreadyCheckedIn,
}

/// Why a check-in attempt was rejected.
#[derive(Debug, Error)]
pub enum CheckInError {
    #[error("Class session not found")]
    SessionNotFound,
    #[error("Check-in secret does not match this session")]
    SecretMismatch,
    #[error("Check-in for this session is closed")]
    SessionClosed,
    #[error("Too far from the class location: {distance_m:.0}m away (allowed: {radius_m}m)")]
    OutOfRange { distance_m: f64, radius_m: i32 },
    #[error(transparent)]
    Db(#[from] DbErr),
}

impl Model {
    /// Records a student's presence at a session.
    ///
    /// Validation order matters and each step short-circuits: session lookup,
    /// secret, open flag, existing record, then distance. The insert at the
    /// end is the only mutation. Two near-simultaneous requests from the same
    /// student can both pass the existence check; the composite primary key
    /// decides the race and the loser is reported as `AlreadyCheckedIn`.
    pub async fn check_in(
        db: &DatabaseConnection,
        session_id: i64,
        user_id: i64,
        supplied_secret: &str,
        latitude: f64,
        longitude: f64,
    ) -> Result<CheckInOutcome, CheckInError> {
        let session = class_session::Entity::find_by_id(session_id)
            .one(db)
            .await?
            .ok_or(CheckInError::SessionNotFound)?;

        session
            .validate_access(supplied_secret)
            .map_err(|e| match e {
                SessionAccessError::SecretMismatch => CheckInError::SecretMismatch,
                SessionAccessError::SessionClosed => CheckInError::SessionClosed,
            })?;

        if Self::find_for(db, session_id, user_id).await?.is_some() {
            return Ok(CheckInOutcome::AlreadyCheckedIn);
        }

        let (anchor_lat, anchor_lon) = session.anchor();
        let distance_m = geo::haversine_distance_m(anchor_lat, anchor_lon, latitude, longitude);

        if distance_m > f64::from(session.radius_m) {
            return Err(CheckInError::OutOfRange {
                distance_m,
                radius_m: session.radius_m,
            });
        }

        let record = ActiveModel {
            session_id: Set(session_id),
            user_id: Set(user_id),
            checked_in_at: Set(Utc::now()),
            status: Set(AttendanceStatus::Present),
            latitude: Set(to_coord(latitude, "latitude")?),
            longitude: Set(to_coord(longitude, "longitude")?),
            distance_m: Set(distance_m),
        };

        match record.insert(db).await {
            Ok(_) => Ok(CheckInOutcome::Recorded { distance_m }),
            // Lost the race to a concurrent submission for the same pair;
            // the row that made it in wins.
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                Ok(CheckInOutcome::AlreadyCheckedIn)
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn find_for(
        db: &DatabaseConnection,
        session_id: i64,
        user_id: i64,
    ) -> Result<Option<Self>, DbErr> {
        Entity::find_by_id((session_id, user_id)).one(db).await
    }

    pub async fn list_for_session(
        db: &DatabaseConnection,
        session_id: i64,
    ) -> Result<Vec<Self>, DbErr> {
        Entity::find()
            .filter(Column::SessionId.eq(session_id))
            .order_by_asc(Column::CheckedInAt)
            .all(db)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{class, class_session, user, user::Role};
    use crate::test_utils::setup_test_db;
    use chrono::{NaiveDate, NaiveTime};
    use sea_orm::PaginatorTrait;

    const ANCHOR_LAT: f64 = 21.0285;
    const ANCHOR_LON: f64 = 105.8542;
    const SECRET: &str = "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";

    struct Ctx {
        student: user::Model,
        session: class_session::Model,
    }

    async fn setup(db: &DatabaseConnection) -> Ctx {
        let lecturer = user::Model::create(db, "lect1", "lect1@test.com", "password", Role::Lecturer)
            .await
            .unwrap();
        let student = user::Model::create(db, "stud1", "stud1@test.com", "password", Role::Student)
            .await
            .unwrap();
        let class = class::Model::create(db, "IT001", "Intro to IT", None, lecturer.id)
            .await
            .unwrap();
        let session = class_session::Model::create(
            db,
            class.id,
            NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
            NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            ANCHOR_LAT,
            ANCHOR_LON,
            50,
            Some(SECRET),
        )
        .await
        .unwrap();

        Ctx { student, session }
    }

    async fn record_count(db: &DatabaseConnection, session_id: i64) -> u64 {
        Entity::find()
            .filter(Column::SessionId.eq(session_id))
            .count(db)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn check_in_at_anchor_is_recorded_present() {
        let db = setup_test_db().await;
        let ctx = setup(&db).await;

        let outcome = Model::check_in(
            &db, ctx.session.id, ctx.student.id, SECRET, ANCHOR_LAT, ANCHOR_LON,
        )
        .await
        .unwrap();

        let CheckInOutcome::Recorded { distance_m } = outcome else {
            panic!("expected Recorded, got {outcome:?}");
        };
        assert!(distance_m < 1.0);

        let rec = Model::find_for(&db, ctx.session.id, ctx.student.id)
            .await
            .unwrap()
            .expect("record persisted");
        assert_eq!(rec.status, AttendanceStatus::Present);
        assert!(rec.distance_m < 1.0);
    }

    #[tokio::test]
    async fn repeat_check_in_is_a_no_op() {
        let db = setup_test_db().await;
        let ctx = setup(&db).await;

        let first = Model::check_in(
            &db, ctx.session.id, ctx.student.id, SECRET, ANCHOR_LAT, ANCHOR_LON,
        )
        .await
        .unwrap();
        assert!(matches!(first, CheckInOutcome::Recorded { .. }));

        let second = Model::check_in(
            &db, ctx.session.id, ctx.student.id, SECRET, ANCHOR_LAT, ANCHOR_LON,
        )
        .await
        .unwrap();
        assert_eq!(second, CheckInOutcome::AlreadyCheckedIn);

        assert_eq!(record_count(&db, ctx.session.id).await, 1);
    }

    #[tokio::test]
    async fn concurrent_duplicates_leave_exactly_one_record() {
        let db = setup_test_db().await;
        let ctx = setup(&db).await;

        let a = Model::check_in(&db, ctx.session.id, ctx.student.id, SECRET, ANCHOR_LAT, ANCHOR_LON);
        let b = Model::check_in(&db, ctx.session.id, ctx.student.id, SECRET, ANCHOR_LAT, ANCHOR_LON);
        let (a, b) = tokio::join!(a, b);

        let outcomes = [a.unwrap(), b.unwrap()];
        assert!(
            outcomes
                .iter()
                .any(|o| matches!(o, CheckInOutcome::Recorded { .. }))
        );
        assert_eq!(record_count(&db, ctx.session.id).await, 1);
    }

    #[tokio::test]
    async fn out_of_range_carries_distance_and_radius_and_writes_nothing() {
        let db = setup_test_db().await;
        let ctx = setup(&db).await;

        // ~1.1km north of the anchor
        let err = Model::check_in(
            &db, ctx.session.id, ctx.student.id, SECRET, ANCHOR_LAT + 0.01, ANCHOR_LON,
        )
        .await
        .expect_err("must be out of range");

        let CheckInError::OutOfRange { distance_m, radius_m } = err else {
            panic!("expected OutOfRange, got {err:?}");
        };
        assert_eq!(radius_m, 50);
        assert!((1100.0..1125.0).contains(&distance_m), "got {distance_m}");

        assert_eq!(record_count(&db, ctx.session.id).await, 0);
    }

    #[tokio::test]
    async fn boundary_distance_is_still_in_range() {
        let db = setup_test_db().await;
        let ctx = setup(&db).await;

        // ~33m north, well within the 50m radius
        let outcome = Model::check_in(
            &db, ctx.session.id, ctx.student.id, SECRET, ANCHOR_LAT + 0.0003, ANCHOR_LON,
        )
        .await
        .unwrap();
        assert!(matches!(outcome, CheckInOutcome::Recorded { .. }));
    }

    #[tokio::test]
    async fn wrong_or_missing_secret_is_rejected() {
        let db = setup_test_db().await;
        let ctx = setup(&db).await;

        let err = Model::check_in(
            &db, ctx.session.id, ctx.student.id, "bogus", ANCHOR_LAT, ANCHOR_LON,
        )
        .await
        .expect_err("wrong secret");
        assert!(matches!(err, CheckInError::SecretMismatch));

        let err = Model::check_in(&db, ctx.session.id, ctx.student.id, "", ANCHOR_LAT, ANCHOR_LON)
            .await
            .expect_err("empty secret");
        assert!(matches!(err, CheckInError::SecretMismatch));

        assert_eq!(record_count(&db, ctx.session.id).await, 0);
    }

    #[tokio::test]
    async fn closed_session_rejects_valid_check_in() {
        let db = setup_test_db().await;
        let ctx = setup(&db).await;

        class_session::Model::close(&db, ctx.session.id).await.unwrap();

        let err = Model::check_in(
            &db, ctx.session.id, ctx.student.id, SECRET, ANCHOR_LAT, ANCHOR_LON,
        )
        .await
        .expect_err("closed session");
        assert!(matches!(err, CheckInError::SessionClosed));
    }

    #[tokio::test]
    async fn unknown_session_is_not_found() {
        let db = setup_test_db().await;
        let ctx = setup(&db).await;

        let err = Model::check_in(&db, 424242, ctx.student.id, SECRET, ANCHOR_LAT, ANCHOR_LON)
            .await
            .expect_err("unknown session");
        assert!(matches!(err, CheckInError::SessionNotFound));
    }
}
