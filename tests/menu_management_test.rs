mod common;

use axum::http::{Method, StatusCode};
use common::{read_json, TestApp};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use std::str::FromStr;

fn money(value: &Value) -> Decimal {
    Decimal::from_str(value.as_str().expect("decimal field is a string"))
        .expect("decimal field parses")
}

#[tokio::test]
async fn menu_groups_by_category_in_first_seen_order() {
    let app = TestApp::new().await;
    let (id, token) = app.register_restaurant("Mario's", "mario@example.com").await;

    app.seed_menu_item(&token, "Bruschetta", "Starters", "6.50").await;
    app.seed_menu_item(&token, "Margherita", "Pizza", "9.00").await;
    app.seed_menu_item(&token, "Caprese", "Starters", "7.00").await;
    app.seed_menu_item(&token, "Tiramisu", "Desserts", "5.50").await;

    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/restaurants/{id}/menu"),
            None,
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;

    let categories: Vec<&str> = body["data"]
        .as_array()
        .expect("menu is an array")
        .iter()
        .map(|c| c["category"].as_str().expect("category name"))
        .collect();
    assert_eq!(categories, vec!["Starters", "Pizza", "Desserts"]);

    let starters = &body["data"][0]["items"];
    assert_eq!(starters.as_array().map(|a| a.len()), Some(2));
    assert_eq!(starters[0]["name"], "Bruschetta");
    assert_eq!(starters[1]["name"], "Caprese");
}

#[tokio::test]
async fn unavailable_items_are_hidden_from_public_menu() {
    let app = TestApp::new().await;
    let (id, token) = app.register_restaurant("Mario's", "mario@example.com").await;

    app.seed_menu_item(&token, "Margherita", "Pizza", "9.00").await;
    let hidden = app.seed_menu_item(&token, "Seasonal Special", "Pizza", "12.00").await;

    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/menu/{hidden}"),
            Some(json!({"is_available": false})),
            Some(&token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/restaurants/{id}/menu"),
            None,
            None,
        )
        .await;
    let body = read_json(response).await;
    let pizza_items = body["data"][0]["items"].as_array().unwrap();
    assert_eq!(pizza_items.len(), 1);
    assert_eq!(pizza_items[0]["name"], "Margherita");

    // The owner view can still see it
    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/restaurants/{id}/menu?include_unavailable=true"),
            None,
            None,
        )
        .await;
    let body = read_json(response).await;
    assert_eq!(body["data"][0]["items"].as_array().map(|a| a.len()), Some(2));
}

#[tokio::test]
async fn menu_for_unknown_restaurant_is_not_found() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/restaurants/{}/menu", uuid::Uuid::new_v4()),
            None,
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn menu_mutations_require_authentication() {
    let app = TestApp::new().await;
    let (_, token) = app.register_restaurant("Mario's", "mario@example.com").await;
    let item = app.seed_menu_item(&token, "Margherita", "Pizza", "9.00").await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/menu",
            Some(json!({"name": "Diavola", "price": "10.00", "category": "Pizza"})),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .request(
            Method::DELETE,
            &format!("/api/v1/menu/{item}"),
            None,
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn menu_mutations_are_tenant_scoped() {
    let app = TestApp::new().await;
    let (_, mario_token) = app.register_restaurant("Mario's", "mario@example.com").await;
    let (_, luigi_token) = app.register_restaurant("Luigi's", "luigi@example.com").await;

    let item = app
        .seed_menu_item(&mario_token, "Margherita", "Pizza", "9.00")
        .await;

    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/menu/{item}"),
            Some(json!({"price": "1.00"})),
            Some(&luigi_token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .request(
            Method::DELETE,
            &format!("/api/v1/menu/{item}"),
            None,
            Some(&luigi_token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn menu_item_crud_round_trip() {
    let app = TestApp::new().await;
    let (_, token) = app.register_restaurant("Mario's", "mario@example.com").await;

    let item = app.seed_menu_item(&token, "Margherita", "Pizza", "9.00").await;

    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/menu/{item}"),
            Some(json!({"price": "9.50", "description": "San Marzano tomatoes"})),
            Some(&token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(money(&body["data"]["price"]), dec!(9.50));
    assert_eq!(body["data"]["description"], "San Marzano tomatoes");
    assert_eq!(body["data"]["name"], "Margherita");

    let response = app
        .request(
            Method::DELETE,
            &format!("/api/v1/menu/{item}"),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .request(Method::GET, &format!("/api/v1/menu/{item}"), None, None)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn negative_price_is_rejected_but_zero_is_allowed() {
    let app = TestApp::new().await;
    let (_, token) = app.register_restaurant("Mario's", "mario@example.com").await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/menu",
            Some(json!({"name": "Margherita", "price": "-1.00", "category": "Pizza"})),
            Some(&token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Complimentary items carry a zero price
    let response = app
        .request(
            Method::POST,
            "/api/v1/menu",
            Some(json!({"name": "Tap Water", "price": "0", "category": "Drinks"})),
            Some(&token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = read_json(response).await;
    assert_eq!(money(&body["data"]["price"]), dec!(0));
}
