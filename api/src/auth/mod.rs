pub mod claims;
pub mod extractors;
pub mod guards;
pub mod middleware;

pub use claims::{AuthUser, Claims};

use chrono::{Duration, Utc};
use db::models::user::Role;
use jsonwebtoken::{Header, encode};

use crate::state::AppState;

/// Generates a JWT and its expiry timestamp for a given user, signed with
/// the keys injected into `AppState` at startup.
pub fn generate_jwt(state: &AppState, user_id: i64, role: Role) -> (String, String) {
    let expiry = Utc::now() + Duration::minutes(state.jwt_duration_minutes());
    let exp_timestamp = expiry.timestamp() as usize;

    let claims = Claims {
        sub: user_id,
        role,
        exp: exp_timestamp,
    };

    let token = encode(&Header::default(), &claims, state.encoding_key())
        .expect("Token encoding failed");

    (token, expiry.to_rfc3339())
}
