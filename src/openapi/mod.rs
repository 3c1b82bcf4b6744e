use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "TableBite API",
        version = "1.0.0",
        description = r#"
# TableBite Restaurant Ordering API

A multi-tenant API for restaurant ordering: restaurants manage their menu
and incoming orders, diners place orders, review them, and redeem the
one-time discount codes their reviews earn.

## Authentication

Restaurant-owner endpoints require a bearer token from `/auth/login`:

```
Authorization: Bearer <your-jwt-token>
```

Public endpoints (restaurant profile, menu, order placement, order lookup,
reviews) need no authentication.

## Error Handling

Errors use a consistent JSON body with appropriate HTTP status codes:

```json
{
  "error": "Bad Request",
  "message": "Discount code already used",
  "request_id": "req-abc123xyz",
  "timestamp": "2025-06-09T10:30:00Z"
}
```
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "Auth", description = "Restaurant session endpoints"),
        (name = "Restaurants", description = "Registration and profile endpoints"),
        (name = "Menu", description = "Menu management endpoints"),
        (name = "Orders", description = "Order placement and lifecycle endpoints"),
        (name = "Reviews", description = "Review and discount code endpoints"),
        (name = "Health", description = "Health check endpoints")
    ),
    paths(
        // Auth
        crate::handlers::auth::login,
        crate::handlers::auth::me,

        // Restaurants
        crate::handlers::restaurants::register_restaurant,
        crate::handlers::restaurants::get_restaurant,
        crate::handlers::restaurants::update_restaurant,

        // Menu
        crate::handlers::menu::get_menu,
        crate::handlers::menu::create_menu_item,
        crate::handlers::menu::get_menu_item,
        crate::handlers::menu::update_menu_item,
        crate::handlers::menu::delete_menu_item,

        // Orders
        crate::handlers::orders::create_order,
        crate::handlers::orders::get_order,
        crate::handlers::orders::list_orders,
        crate::handlers::orders::update_order,

        // Reviews
        crate::handlers::reviews::create_review,
        crate::handlers::reviews::list_reviews,
    ),
    components(
        schemas(
            // Auth types
            crate::handlers::auth::LoginRequest,
            crate::handlers::auth::LoginResponse,
            crate::handlers::auth::SessionResponse,
            crate::auth::TokenPair,

            // Restaurant types
            crate::services::restaurants::RegisterRestaurantRequest,
            crate::services::restaurants::UpdateRestaurantRequest,
            crate::services::restaurants::RestaurantResponse,

            // Menu types
            crate::services::menu::CreateMenuItemRequest,
            crate::services::menu::UpdateMenuItemRequest,
            crate::services::menu::MenuItemResponse,
            crate::services::menu::MenuCategory,

            // Order types
            crate::entities::order::OrderStatus,
            crate::services::orders::OrderLineRequest,
            crate::services::orders::CreateOrderRequest,
            crate::services::orders::UpdateOrderRequest,
            crate::services::orders::OrderItemResponse,
            crate::services::orders::OrderResponse,
            crate::services::orders::OrderListResponse,

            // Review types
            crate::services::reviews::CreateReviewRequest,
            crate::services::reviews::ReviewResponse,
            crate::services::reviews::ReviewStats,
            crate::services::reviews::ReviewListResponse,

            // Error types
            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDoc;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_document_covers_core_paths() {
        let openapi = ApiDoc::openapi();
        let json = serde_json::to_string_pretty(&openapi).unwrap();
        assert!(json.contains("TableBite API"));
        assert!(json.contains("/api/v1/orders"));
        assert!(json.contains("/api/v1/restaurants/{id}/menu"));
        assert!(json.contains("/api/v1/restaurants/{id}/reviews"));
        assert!(json.contains("/auth/login"));
    }
}
