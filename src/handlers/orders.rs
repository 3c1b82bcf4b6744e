use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::auth::AuthRestaurant;
use crate::errors::ServiceError;
use crate::services::orders::{
    CreateOrderRequest, OrderListResponse, OrderResponse, UpdateOrderRequest,
};
use crate::{ApiResponse, ApiResult, AppState};

#[derive(Debug, Deserialize, IntoParams)]
pub struct OrderListQuery {
    /// Filter by order status
    pub status: Option<String>,
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_per_page")]
    pub per_page: u64,
}

fn default_page() -> u64 {
    1
}
fn default_per_page() -> u64 {
    20
}

/// Place an order, optionally redeeming a discount code
#[utoipa::path(
    post,
    path = "/api/v1/orders",
    summary = "Create order",
    description = "Place an order for a restaurant. Redeeming a discount code and creating the order happen atomically.",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created successfully", body = ApiResponse<OrderResponse>,
            headers(("X-Request-Id" = String, description = "Unique request id"))
        ),
        (status = 400, description = "Invalid request data or discount code", body = crate::errors::ErrorResponse),
        (status = 404, description = "Restaurant not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    )
)]
pub async fn create_order(
    State(state): State<AppState>,
    Json(payload): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<ApiResponse<OrderResponse>>), ServiceError> {
    let order = state.services.orders.create_order(payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(order))))
}

/// Get an order with its line items
#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}",
    summary = "Get order",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order retrieved successfully", body = ApiResponse<OrderResponse>),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    )
)]
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<OrderResponse> {
    let order = state.services.orders.get_order(id).await?;
    Ok(Json(ApiResponse::success(order)))
}

/// List the authenticated restaurant's orders
#[utoipa::path(
    get,
    path = "/api/v1/orders",
    summary = "List orders",
    description = "List the authenticated restaurant's orders newest-first, optionally filtered by status",
    params(OrderListQuery),
    responses(
        (status = 200, description = "Orders retrieved successfully", body = ApiResponse<OrderListResponse>),
        (status = 400, description = "Invalid status filter", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<OrderListQuery>,
    auth: AuthRestaurant,
) -> ApiResult<OrderListResponse> {
    let orders = state
        .services
        .orders
        .list_orders(auth.restaurant_id, query.status, query.page, query.per_page)
        .await?;
    Ok(Json(ApiResponse::success(orders)))
}

/// Update an order's status, table number, or customer note
#[utoipa::path(
    put,
    path = "/api/v1/orders/{id}",
    summary = "Update order",
    description = "Partial update of status, table number, and customer note. A status change advances the order along its lifecycle: backward moves are rejected and cancellation is only allowed while pending. Items and totals are immutable.",
    params(("id" = Uuid, Path, description = "Order ID")),
    request_body = UpdateOrderRequest,
    responses(
        (status = 200, description = "Order status updated successfully", body = ApiResponse<OrderResponse>),
        (status = 400, description = "Unknown status or invalid transition", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn update_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    auth: AuthRestaurant,
    Json(payload): Json<UpdateOrderRequest>,
) -> ApiResult<OrderResponse> {
    let order = state
        .services
        .orders
        .update_order(auth.restaurant_id, id, payload)
        .await?;
    Ok(Json(ApiResponse::success(order)))
}
