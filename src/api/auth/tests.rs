use axum::http::{Method, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use crate::test_support;

#[tokio::test]
async fn signup_then_login_flow() {
    let ctx = test_support::setup_test_context().await;

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/signup",
            None,
            Some(json!({
                "fullname": "Priya Sharma",
                "email": "priya@example.com",
                "password": "student-pass",
                "role": "student"
            })),
        ))
        .await
        .expect("signup");

    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::CREATED, "response: {body}");
    assert_eq!(body["message"], "Signup successful");
    assert!(!body["access_token"].as_str().unwrap_or("").is_empty());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/login",
            None,
            Some(json!({
                "email": "priya@example.com",
                "password": "student-pass",
                "role": "student"
            })),
        ))
        .await
        .expect("login");

    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {body}");
    assert_eq!(body["name"], "Priya Sharma");
    assert!(body["message"].as_str().unwrap_or("").contains("Welcome"));
    assert!(body["redirect"].as_str().unwrap_or("").ends_with("student-dashboard.html"));
    assert!(!body["access_token"].as_str().unwrap_or("").is_empty());
}

#[tokio::test]
async fn duplicate_signup_returns_400_and_creates_no_second_user() {
    let ctx = test_support::setup_test_context().await;

    let payload = json!({
        "fullname": "Tariq Aziz",
        "email": "Tariq@Example.com",
        "password": "some-password",
        "role": "teacher"
    });

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/signup",
            None,
            Some(payload.clone()),
        ))
        .await
        .expect("first signup");
    assert_eq!(response.status(), StatusCode::CREATED);

    // Same address with different casing must collide.
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/signup",
            None,
            Some(json!({
                "fullname": "Tariq Aziz",
                "email": "tariq@example.com",
                "password": "some-password",
                "role": "teacher"
            })),
        ))
        .await
        .expect("second signup");

    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "response: {body}");
    assert_eq!(body["error"], "User already exists");

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = $1")
        .bind("tariq@example.com")
        .fetch_one(ctx.state.db())
        .await
        .expect("count users");
    assert_eq!(count, 1);
}

#[tokio::test]
async fn login_with_wrong_role_or_password_returns_401() {
    let ctx = test_support::setup_test_context().await;
    test_support::insert_student(ctx.state.db(), "sam@example.com").await;

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/login",
            None,
            Some(json!({
                "email": "sam@example.com",
                "password": "student-pass",
                "role": "teacher"
            })),
        ))
        .await
        .expect("role mismatch login");
    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED, "response: {body}");
    assert_eq!(body["error"], "Invalid credentials");

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/login",
            None,
            Some(json!({
                "email": "sam@example.com",
                "password": "wrong-pass",
                "role": "student"
            })),
        ))
        .await
        .expect("bad password login");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn signup_rejects_short_password_and_bad_email() {
    let ctx = test_support::setup_test_context().await;

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/signup",
            None,
            Some(json!({
                "fullname": "Short Password",
                "email": "short@example.com",
                "password": "short",
                "role": "student"
            })),
        ))
        .await
        .expect("short password signup");
    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "response: {body}");
    assert!(body["error"].as_str().unwrap_or("").contains("Password must be at least"));

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/signup",
            None,
            Some(json!({
                "fullname": "Bad Email",
                "email": "not-an-email",
                "password": "long-enough-pass",
                "role": "student"
            })),
        ))
        .await
        .expect("bad email signup");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
