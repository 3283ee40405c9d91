use axum::{
    body::Body,
    extract::{ConnectInfo, FromRequestParts, State},
    http::{Method, Request, StatusCode},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::TypedHeader;
use headers::{Origin, UserAgent};
use std::net::SocketAddr;
use tracing::info;

use crate::auth::claims::AuthUser;
use crate::state::AppState;

/// Logs method, path, IP address, user ID (if authenticated), origin, and
/// user-agent for each incoming HTTP request. Automatically skips CORS
/// preflight `OPTIONS` requests.
pub async fn log_request(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let (mut parts, body) = req.into_parts();

    // Skip logging for preflight requests
    if parts.method == Method::OPTIONS {
        let req = Request::from_parts(parts, body);
        return Ok(next.run(req).await);
    }

    // Try extracting the user ID from claims
    let user_id = AuthUser::from_request_parts(&mut parts, &state)
        .await
        .ok()
        .map(|AuthUser(c)| c.sub);

    let origin = TypedHeader::<Origin>::from_request_parts(&mut parts, &state)
        .await
        .ok()
        .map(|TypedHeader(o)| o.to_string());

    let user_agent = TypedHeader::<UserAgent>::from_request_parts(&mut parts, &state)
        .await
        .ok()
        .map(|TypedHeader(ua)| ua.to_string());

    info!(
        method = ?parts.method,
        path = %parts.uri.path(),
        ip = %addr.ip(),
        user = user_id.unwrap_or(0),
        origin = origin.unwrap_or_else(|| "unknown".into()),
        user_agent = user_agent.unwrap_or_else(|| "unknown".into()),
        "Incoming request"
    );

    let req = Request::from_parts(parts, body);
    Ok(next.run(req).await)
}
