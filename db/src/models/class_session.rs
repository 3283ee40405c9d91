use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use sea_orm::entity::prelude::*;
use sea_orm::{DatabaseConnection, IntoActiveModel, Set};
use thiserror::Error;

/// A single scheduled class meeting eligible for attendance check-in,
/// anchored to a GPS point and radius.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, serde::Serialize)]
#[sea_orm(table_name = "class_sessions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub class_id: i64,
    pub session_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    /// Anchor latitude in degrees, as set by the lecturer.
    #[sea_orm(column_type = "Decimal(Some((10, 7)))")]
    pub latitude: Decimal,
    /// Anchor longitude in degrees.
    #[sea_orm(column_type = "Decimal(Some((10, 7)))")]
    pub longitude: Decimal,
    /// Maximum allowed distance from the anchor, in meters. Always positive.
    pub radius_m: i32,
    /// Opaque token embedded in the check-in link. Immutable once issued.
    pub secret: String,
    /// Whether check-ins are currently accepted. Transitions true -> false
    /// only; a closed session never reopens.
    pub open: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::class::Entity",
        from = "Column::ClassId",
        to = "super::class::Column::Id"
    )]
    Class,
    #[sea_orm(has_many = "super::attendance_record::Entity")]
    Records,
}

impl Related<super::class::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Class.def()
    }
    fn via() -> Option<RelationDef> {
        None
    }
}

impl Related<super::attendance_record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Records.def()
    }
    fn via() -> Option<RelationDef> {
        None
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Why a supplied secret does not grant access to a session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionAccessError {
    #[error("Check-in secret does not match this session")]
    SecretMismatch,
    #[error("Check-in for this session is closed")]
    SessionClosed,
}

/// Converts a degree coordinate into the fixed-precision column type.
///
/// Only non-finite inputs can fail; handlers validate ranges before this.
pub(crate) fn to_coord(value: f64, field: &str) -> Result<Decimal, DbErr> {
    Decimal::from_f64_retain(value)
        .ok_or_else(|| DbErr::Custom(format!("{field} is not a finite number")))
}

fn generate_secret() -> String {
    use rand::RngCore;
    let mut buf = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut buf);
    hex::encode(buf)
}

impl Model {
    /// Creates a session with a freshly generated secret and `open = true`.
    ///
    /// `secret` is only accepted explicitly so tests can pin a known value;
    /// production callers pass `None` and get 32 CSPRNG bytes, hex-encoded.
    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        db: &DatabaseConnection,
        class_id: i64,
        session_date: NaiveDate,
        start_time: NaiveTime,
        end_time: NaiveTime,
        latitude: f64,
        longitude: f64,
        radius_m: i32,
        secret: Option<&str>,
    ) -> Result<Self, DbErr> {
        if radius_m <= 0 {
            return Err(DbErr::Custom("session radius must be positive".into()));
        }

        let secret = match secret {
            Some(s) => s.to_owned(),
            None => generate_secret(),
        };

        let now = Utc::now();
        let session = ActiveModel {
            class_id: Set(class_id),
            session_date: Set(session_date),
            start_time: Set(start_time),
            end_time: Set(end_time),
            latitude: Set(to_coord(latitude, "latitude")?),
            longitude: Set(to_coord(longitude, "longitude")?),
            radius_m: Set(radius_m),
            secret: Set(secret),
            open: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        session.insert(db).await
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// The anchor coordinates in degrees, for distance computation.
    pub fn anchor(&self) -> (f64, f64) {
        (
            self.latitude.to_f64().unwrap_or_default(),
            self.longitude.to_f64().unwrap_or_default(),
        )
    }

    /// Gate for check-in attempts: the supplied secret must match exactly
    /// (an empty secret never matches) and the session must still be open.
    ///
    /// The comparison is not timing-safe; the secret deters casual guessing,
    /// it is not a cryptographic credential.
    pub fn validate_access(&self, supplied_secret: &str) -> Result<(), SessionAccessError> {
        if supplied_secret.is_empty() || supplied_secret != self.secret {
            return Err(SessionAccessError::SecretMismatch);
        }
        if !self.open {
            return Err(SessionAccessError::SessionClosed);
        }
        Ok(())
    }

    /// Closes a session. Closing an already-closed session is a no-op;
    /// there is deliberately no operation that reopens one.
    pub async fn close(db: &DatabaseConnection, id: i64) -> Result<Option<Self>, DbErr> {
        let Some(session) = Entity::find_by_id(id).one(db).await? else {
            return Ok(None);
        };

        if !session.open {
            return Ok(Some(session));
        }

        let mut active = session.into_active_model();
        active.open = Set(false);
        active.updated_at = Set(Utc::now());
        active.update(db).await.map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{class, user, user::Role};
    use crate::test_utils::setup_test_db;

    async fn seed_class(db: &DatabaseConnection) -> class::Model {
        let lecturer = user::Model::create(db, "lect1", "lect1@test.com", "password", Role::Lecturer)
            .await
            .expect("create lecturer");
        class::Model::create(db, "IT001", "Intro to IT", Some("2026-1"), lecturer.id)
            .await
            .expect("create class")
    }

    fn times() -> (NaiveDate, NaiveTime, NaiveTime) {
        (
            NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
            NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
        )
    }

    #[tokio::test]
    async fn create_generates_secret_and_opens() {
        let db = setup_test_db().await;
        let c = seed_class(&db).await;
        let (d, s, e) = times();

        let sess = Model::create(&db, c.id, d, s, e, 21.0285, 105.8542, 50, None)
            .await
            .unwrap();

        assert!(sess.open);
        assert_eq!(sess.secret.len(), 64);
        assert!(sess.secret.chars().all(|ch| ch.is_ascii_hexdigit()));
        assert_eq!(sess.radius_m, 50);

        let other = Model::create(&db, c.id, d, s, e, 21.0285, 105.8542, 50, None)
            .await
            .unwrap();
        assert_ne!(sess.secret, other.secret);
    }

    #[tokio::test]
    async fn create_rejects_non_positive_radius() {
        let db = setup_test_db().await;
        let c = seed_class(&db).await;
        let (d, s, e) = times();

        assert!(Model::create(&db, c.id, d, s, e, 0.0, 0.0, 0, None).await.is_err());
        assert!(Model::create(&db, c.id, d, s, e, 0.0, 0.0, -5, None).await.is_err());
    }

    #[tokio::test]
    async fn validate_access_checks_secret_then_open_flag() {
        let db = setup_test_db().await;
        let c = seed_class(&db).await;
        let (d, s, e) = times();

        let sess = Model::create(&db, c.id, d, s, e, 21.0285, 105.8542, 50, Some("topsecret"))
            .await
            .unwrap();

        assert_eq!(sess.validate_access("topsecret"), Ok(()));
        assert_eq!(
            sess.validate_access("wrong"),
            Err(SessionAccessError::SecretMismatch)
        );
        assert_eq!(
            sess.validate_access(""),
            Err(SessionAccessError::SecretMismatch)
        );

        let closed = Model::close(&db, sess.id).await.unwrap().unwrap();
        assert_eq!(
            closed.validate_access("topsecret"),
            Err(SessionAccessError::SessionClosed)
        );
        // a bad secret on a closed session still reads as a secret mismatch
        assert_eq!(
            closed.validate_access("wrong"),
            Err(SessionAccessError::SecretMismatch)
        );
    }

    #[tokio::test]
    async fn close_is_idempotent_and_final() {
        let db = setup_test_db().await;
        let c = seed_class(&db).await;
        let (d, s, e) = times();

        let sess = Model::create(&db, c.id, d, s, e, 21.0285, 105.8542, 50, None)
            .await
            .unwrap();
        let secret_before = sess.secret.clone();

        let once = Model::close(&db, sess.id).await.unwrap().unwrap();
        assert!(!once.open);

        let twice = Model::close(&db, sess.id).await.unwrap().unwrap();
        assert!(!twice.open);
        // the secret never changes across the lifecycle
        assert_eq!(twice.secret, secret_before);

        assert!(Model::close(&db, 9999).await.unwrap().is_none());
    }
}
