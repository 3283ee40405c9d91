use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
};
use axum_extra::extract::TypedHeader;
use headers::{Authorization, authorization::Bearer};
use jsonwebtoken::{Algorithm, Validation, decode};

use crate::auth::claims::{AuthUser, Claims};
use crate::state::AppState;

/// Implements extraction of `AuthUser` from request headers.
///
/// Checks for a valid Bearer token in the `Authorization` header and
/// verifies the JWT against the decoding key held in `AppState`, so
/// verification uses the signing configuration injected at startup.
///
/// # Errors
/// Returns `401 Unauthorized` if the header is missing, malformed, or the
/// token is invalid or expired.
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| {
                    (
                        StatusCode::UNAUTHORIZED,
                        "Missing or invalid Authorization header",
                    )
                })?;

        let token_data = decode::<Claims>(
            bearer.token(),
            state.decoding_key(),
            &Validation::new(Algorithm::HS256),
        )
        .map_err(|_| (StatusCode::UNAUTHORIZED, "Invalid or expired token"))?;

        Ok(AuthUser(token_data.claims))
    }
}
