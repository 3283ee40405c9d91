use api::{routes::routes, state::AppState};
use axum::{Router, body::Body, http::Request};
use serde_json::Value;

pub const TEST_JWT_SECRET: &str = "test-jwt-secret";

/// Builds the real `/api` router over a fresh in-memory database.
///
/// The JWT keys are injected directly, so tests never touch the
/// environment or a `.env` file.
pub async fn make_test_app() -> (Router, AppState) {
    let db = db::test_utils::setup_test_db().await;
    let app_state = AppState::new(db, TEST_JWT_SECRET, 60);

    let app = Router::new().nest("/api", routes(app_state.clone()));
    (app, app_state)
}

/// Builds a JSON request with an optional bearer token.
pub fn json_request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: &Value,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json");

    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }

    builder.body(Body::from(body.to_string())).unwrap()
}

/// Reads a response body into JSON.
pub async fn response_json(resp: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
