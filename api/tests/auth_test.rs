mod helpers;

use axum::http::StatusCode;
use serde_json::json;
use tower::ServiceExt;

use helpers::app::{json_request, make_test_app, response_json};

#[tokio::test]
async fn register_then_login_and_use_the_token() {
    let (app, _app_state) = make_test_app().await;

    let resp = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/register",
            None,
            &json!({
                "username": "u0401",
                "email": "u0401@test.com",
                "password": "password123",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let json = response_json(resp).await;
    assert_eq!(json["data"]["username"], "u0401");
    assert_eq!(json["data"]["role"], "student");

    let resp = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            None,
            &json!({ "username": "u0401", "password": "password123" }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = response_json(resp).await;
    let token = json["data"]["token"].as_str().unwrap().to_owned();
    assert!(!token.is_empty());
    assert!(!json["data"]["expires_at"].as_str().unwrap().is_empty());

    // the issued token gets through an authenticated route
    let resp = app
        .oneshot(json_request(
            "GET",
            "/api/me/notifications",
            Some(&token),
            &json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn register_lecturer_role_is_honored() {
    let (app, _app_state) = make_test_app().await;

    let resp = app
        .oneshot(json_request(
            "POST",
            "/api/auth/register",
            None,
            &json!({
                "username": "lect42",
                "email": "lect42@test.com",
                "password": "password123",
                "role": "lecturer",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let json = response_json(resp).await;
    assert_eq!(json["data"]["role"], "lecturer");
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
    let (app, _app_state) = make_test_app().await;

    let body = json!({
        "username": "dup01",
        "email": "dup01@test.com",
        "password": "password123",
    });

    let first = app
        .clone()
        .oneshot(json_request("POST", "/api/auth/register", None, &body))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = app
        .oneshot(json_request("POST", "/api/auth/register", None, &body))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn register_validation_failures() {
    let (app, _app_state) = make_test_app().await;

    let resp = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/register",
            None,
            &json!({
                "username": "u0402",
                "email": "not-an-email",
                "password": "password123",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let json = response_json(resp).await;
    assert_eq!(json["message"], "Invalid email format");

    let resp = app
        .oneshot(json_request(
            "POST",
            "/api/auth/register",
            None,
            &json!({
                "username": "u0403",
                "email": "u0403@test.com",
                "password": "short",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_with_wrong_password_is_unauthorized() {
    let (app, _app_state) = make_test_app().await;

    let resp = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/register",
            None,
            &json!({
                "username": "u0404",
                "email": "u0404@test.com",
                "password": "password123",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = app
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            None,
            &json!({ "username": "u0404", "password": "wrong-password" }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}
