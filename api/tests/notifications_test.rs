mod helpers;

use axum::http::StatusCode;
use serde_json::json;
use tower::ServiceExt;

use api::auth::generate_jwt;
use db::models::user::{Model as UserModel, Role};

use helpers::app::{json_request, make_test_app, response_json};

#[tokio::test]
async fn lecturer_creates_notification_and_student_reads_it() {
    let (app, app_state) = make_test_app().await;
    let db = app_state.db();

    let lecturer = UserModel::create(db, "nt_lect", "nt_lect@test.com", "password123", Role::Lecturer)
        .await
        .unwrap();
    let student = UserModel::create(db, "nt_stud", "nt_stud@test.com", "password123", Role::Student)
        .await
        .unwrap();

    let (lect_token, _) = generate_jwt(&app_state, lecturer.id, Role::Lecturer);
    let resp = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/notifications",
            Some(&lect_token),
            &json!({
                "user_id": student.id,
                "title": "Class moved",
                "body": "Tomorrow's session starts at 09:00 in room B12.",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    let (stud_token, _) = generate_jwt(&app_state, student.id, Role::Student);
    let resp = app
        .oneshot(json_request(
            "GET",
            "/api/me/notifications",
            Some(&stud_token),
            &json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let json = response_json(resp).await;
    let rows = json["data"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["title"], "Class moved");
}

#[tokio::test]
async fn student_cannot_create_notifications() {
    let (app, app_state) = make_test_app().await;
    let student = UserModel::create(
        app_state.db(),
        "nt_stu2",
        "nt_stu2@test.com",
        "password123",
        Role::Student,
    )
    .await
    .unwrap();

    let (token, _) = generate_jwt(&app_state, student.id, Role::Student);
    let resp = app
        .oneshot(json_request(
            "POST",
            "/api/notifications",
            Some(&token),
            &json!({ "user_id": student.id, "title": "t", "body": "b" }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn notification_for_unknown_user_is_not_found() {
    let (app, app_state) = make_test_app().await;
    let lecturer = UserModel::create(
        app_state.db(),
        "nt_lec2",
        "nt_lec2@test.com",
        "password123",
        Role::Lecturer,
    )
    .await
    .unwrap();

    let (token, _) = generate_jwt(&app_state, lecturer.id, Role::Lecturer);
    let resp = app
        .oneshot(json_request(
            "POST",
            "/api/notifications",
            Some(&token),
            &json!({ "user_id": 424242, "title": "t", "body": "b" }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
