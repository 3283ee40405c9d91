use jsonwebtoken::{DecodingKey, EncodingKey};
use sea_orm::DatabaseConnection;

/// Central application state shared across all route handlers.
///
/// The JWT signing configuration is constructed exactly once at startup and
/// injected here; nothing in the request path reads signing material from
/// the environment.
#[derive(Clone)]
pub struct AppState {
    db: DatabaseConnection,
    jwt_encoding_key: EncodingKey,
    jwt_decoding_key: DecodingKey,
    jwt_duration_minutes: i64,
}

impl AppState {
    pub fn new(db: DatabaseConnection, jwt_secret: &str, jwt_duration_minutes: i64) -> Self {
        Self {
            db,
            jwt_encoding_key: EncodingKey::from_secret(jwt_secret.as_bytes()),
            jwt_decoding_key: DecodingKey::from_secret(jwt_secret.as_bytes()),
            jwt_duration_minutes,
        }
    }

    /// Returns a shared reference to the internal `DatabaseConnection`.
    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Returns a cloned copy of the database connection, for spawned tasks
    /// that require ownership.
    pub fn db_clone(&self) -> DatabaseConnection {
        self.db.clone()
    }

    pub fn encoding_key(&self) -> &EncodingKey {
        &self.jwt_encoding_key
    }

    pub fn decoding_key(&self) -> &DecodingKey {
        &self.jwt_decoding_key
    }

    pub fn jwt_duration_minutes(&self) -> i64 {
        self.jwt_duration_minutes
    }
}
