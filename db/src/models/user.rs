use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use chrono::{DateTime, Utc};
use rand::rngs::OsRng;
use sea_orm::entity::prelude::*;
use sea_orm::{DatabaseConnection, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Represents a user in the `users` table.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Primary key ID (auto-incremented).
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Unique student or staff number.
    pub username: String,
    /// User's unique email address.
    pub email: String,
    /// Securely hashed password string.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Account role: student or lecturer.
    pub role: Role,
    /// Timestamp when the user was created.
    pub created_at: DateTime<Utc>,
    /// Timestamp when the user was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Account-level role. Lecturers run sessions; students check in to them.
#[derive(
    Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Display, EnumString, Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "user_role_type")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Role {
    #[sea_orm(string_value = "lecturer")]
    Lecturer,

    #[sea_orm(string_value = "student")]
    Student,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        panic!("No RelationDef implemented")
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Creates a user with an Argon2-hashed password.
    ///
    /// A duplicate username or email surfaces as a unique-constraint
    /// violation from the storage layer; callers decide how to present it.
    pub async fn create(
        db: &DatabaseConnection,
        username: &str,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<Self, DbErr> {
        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| DbErr::Custom(format!("Failed to hash password: {e}")))?
            .to_string();

        let now = Utc::now();
        let user = ActiveModel {
            username: Set(username.to_owned()),
            email: Set(email.to_owned()),
            password_hash: Set(password_hash),
            role: Set(role),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        user.insert(db).await
    }

    pub async fn find_by_username(
        db: &DatabaseConnection,
        username: &str,
    ) -> Result<Option<Self>, DbErr> {
        Entity::find()
            .filter(Column::Username.eq(username))
            .one(db)
            .await
    }

    /// Looks up a user by username and verifies the password.
    ///
    /// Returns `Ok(None)` for unknown usernames and wrong passwords alike so
    /// the login handler can answer both with the same message.
    pub async fn verify_credentials(
        db: &DatabaseConnection,
        username: &str,
        password: &str,
    ) -> Result<Option<Self>, DbErr> {
        let Some(user) = Self::find_by_username(db, username).await? else {
            return Ok(None);
        };

        let Ok(parsed_hash) = PasswordHash::new(&user.password_hash) else {
            return Ok(None);
        };

        if Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
        {
            Ok(Some(user))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::setup_test_db;
    use sea_orm::SqlErr;

    #[tokio::test]
    async fn create_and_verify_credentials() {
        let db = setup_test_db().await;

        let user = Model::create(&db, "u0401", "u0401@test.com", "password123", Role::Student)
            .await
            .expect("create user");
        assert_eq!(user.role, Role::Student);
        assert_ne!(user.password_hash, "password123");

        let ok = Model::verify_credentials(&db, "u0401", "password123")
            .await
            .unwrap();
        assert_eq!(ok.map(|u| u.id), Some(user.id));

        let wrong_pw = Model::verify_credentials(&db, "u0401", "nope").await.unwrap();
        assert!(wrong_pw.is_none());

        let unknown = Model::verify_credentials(&db, "ghost", "password123")
            .await
            .unwrap();
        assert!(unknown.is_none());
    }

    #[tokio::test]
    async fn duplicate_username_is_a_unique_violation() {
        let db = setup_test_db().await;

        Model::create(&db, "dup", "dup1@test.com", "password123", Role::Student)
            .await
            .unwrap();
        let err = Model::create(&db, "dup", "dup2@test.com", "password123", Role::Student)
            .await
            .expect_err("second insert must fail");

        assert!(matches!(
            err.sql_err(),
            Some(SqlErr::UniqueConstraintViolation(_))
        ));
    }
}
