mod common;

use axum::http::{Method, StatusCode};
use common::{read_json, TestApp};
use serde_json::json;

#[tokio::test]
async fn registration_returns_profile_without_password() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/restaurants",
            Some(json!({
                "name": "Mario's Trattoria",
                "email": "mario@example.com",
                "password": "super-secret-pw",
                "address": "12 Via Roma",
                "phone": "+39-055-0100",
                "description": "Family-run Tuscan kitchen",
            })),
            None,
        )
        .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = read_json(response).await;
    assert_eq!(body["success"], true);

    let data = &body["data"];
    assert_eq!(data["name"], "Mario's Trattoria");
    assert_eq!(data["email"], "mario@example.com");
    assert_eq!(data["open_time"], "09:00");
    assert_eq!(data["close_time"], "22:00");
    assert_eq!(data["discount_enabled"], false);
    assert!(data.get("password").is_none());
    assert!(data.get("password_hash").is_none());
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
    let app = TestApp::new().await;
    app.register_restaurant("First", "taken@example.com").await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/restaurants",
            Some(json!({
                "name": "Second",
                "email": "taken@example.com",
                "password": "another-secret",
                "address": "2 Other Street",
                "phone": "+1-555-0101",
            })),
            None,
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json(response).await;
    assert_eq!(body["message"], "Restaurant with this email already exists");
}

#[tokio::test]
async fn login_rejects_wrong_password() {
    let app = TestApp::new().await;
    app.register_restaurant("Mario's", "mario@example.com").await;

    let response = app
        .request(
            Method::POST,
            "/auth/login",
            Some(json!({
                "email": "mario@example.com",
                "password": "not-the-password",
            })),
            None,
        )
        .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_rejects_unknown_email_with_same_error() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/auth/login",
            Some(json!({
                "email": "ghost@example.com",
                "password": "whatever-pw",
            })),
            None,
        )
        .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = read_json(response).await;
    assert_eq!(body["message"], "Authentication error: Invalid email or password");
}

#[tokio::test]
async fn session_endpoint_reflects_token_claims() {
    let app = TestApp::new().await;
    let (id, token) = app.register_restaurant("Mario's", "mario@example.com").await;

    let response = app.request(Method::GET, "/auth/me", None, Some(&token)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["data"]["restaurant_id"], id.to_string());
    assert_eq!(body["data"]["email"], "mario@example.com");

    let response = app.request(Method::GET, "/auth/me", None, None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn owner_can_update_profile_and_discount_settings() {
    let app = TestApp::new().await;
    let (id, token) = app.register_restaurant("Mario's", "mario@example.com").await;

    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/restaurants/{id}"),
            Some(json!({
                "description": "Now with a garden terrace",
                "discount_enabled": true,
                "discount_percentage": 15,
                "discount_min_order_amount": "20",
            })),
            Some(&token),
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["data"]["description"], "Now with a garden terrace");
    assert_eq!(body["data"]["discount_enabled"], true);
    assert_eq!(body["data"]["discount_percentage"], "15");

    // Unchanged fields keep their values
    assert_eq!(body["data"]["name"], "Mario's");
    assert_eq!(body["data"]["open_time"], "09:00");
}

#[tokio::test]
async fn update_requires_matching_owner() {
    let app = TestApp::new().await;
    let (id, _) = app.register_restaurant("Mario's", "mario@example.com").await;
    let (_, other_token) = app.register_restaurant("Luigi's", "luigi@example.com").await;

    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/restaurants/{id}"),
            Some(json!({"name": "Hijacked"})),
            Some(&other_token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/restaurants/{id}"),
            Some(json!({"name": "Anonymous"})),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn public_profile_is_readable_without_auth() {
    let app = TestApp::new().await;
    let (id, _) = app.register_restaurant("Mario's", "mario@example.com").await;

    let response = app
        .request(Method::GET, &format!("/api/v1/restaurants/{id}"), None, None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/restaurants/{}", uuid::Uuid::new_v4()),
            None,
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
