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
use crate::services::menu::{
    CreateMenuItemRequest, MenuCategory, MenuItemResponse, UpdateMenuItemRequest,
};
use crate::{ApiResponse, ApiResult, AppState};

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct MenuQuery {
    /// Include items marked unavailable (owner dashboard view)
    #[serde(default)]
    pub include_unavailable: bool,
}

/// Get a restaurant's menu grouped by category
#[utoipa::path(
    get,
    path = "/api/v1/restaurants/{id}/menu",
    summary = "Get menu",
    description = "Get the restaurant's menu grouped by category, categories in first-seen order",
    params(
        ("id" = Uuid, Path, description = "Restaurant ID"),
        MenuQuery,
    ),
    responses(
        (status = 200, description = "Menu retrieved successfully", body = ApiResponse<Vec<MenuCategory>>),
        (status = 404, description = "Restaurant not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    )
)]
pub async fn get_menu(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<MenuQuery>,
) -> ApiResult<Vec<MenuCategory>> {
    // 404 for unknown restaurants instead of an empty menu
    state.services.restaurants.get_restaurant(id).await?;

    let menu = state
        .services
        .menu
        .get_menu(id, query.include_unavailable)
        .await?;
    Ok(Json(ApiResponse::success(menu)))
}

/// Create a menu item for the authenticated restaurant
#[utoipa::path(
    post,
    path = "/api/v1/menu",
    summary = "Create menu item",
    request_body = CreateMenuItemRequest,
    responses(
        (status = 201, description = "Menu item created successfully", body = ApiResponse<MenuItemResponse>),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn create_menu_item(
    State(state): State<AppState>,
    auth: AuthRestaurant,
    Json(payload): Json<CreateMenuItemRequest>,
) -> Result<(StatusCode, Json<ApiResponse<MenuItemResponse>>), ServiceError> {
    let item = state
        .services
        .menu
        .create_menu_item(auth.restaurant_id, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(item))))
}

/// Get a single menu item
#[utoipa::path(
    get,
    path = "/api/v1/menu/{id}",
    summary = "Get menu item",
    params(("id" = Uuid, Path, description = "Menu item ID")),
    responses(
        (status = 200, description = "Menu item retrieved successfully", body = ApiResponse<MenuItemResponse>),
        (status = 404, description = "Menu item not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    )
)]
pub async fn get_menu_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<MenuItemResponse> {
    let item = state.services.menu.get_menu_item(id).await?;
    Ok(Json(ApiResponse::success(item)))
}

/// Update a menu item owned by the authenticated restaurant
#[utoipa::path(
    put,
    path = "/api/v1/menu/{id}",
    summary = "Update menu item",
    params(("id" = Uuid, Path, description = "Menu item ID")),
    request_body = UpdateMenuItemRequest,
    responses(
        (status = 200, description = "Menu item updated successfully", body = ApiResponse<MenuItemResponse>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 404, description = "Menu item not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn update_menu_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    auth: AuthRestaurant,
    Json(payload): Json<UpdateMenuItemRequest>,
) -> ApiResult<MenuItemResponse> {
    let item = state
        .services
        .menu
        .update_menu_item(auth.restaurant_id, id, payload)
        .await?;
    Ok(Json(ApiResponse::success(item)))
}

/// Delete a menu item owned by the authenticated restaurant
#[utoipa::path(
    delete,
    path = "/api/v1/menu/{id}",
    summary = "Delete menu item",
    params(("id" = Uuid, Path, description = "Menu item ID")),
    responses(
        (status = 204, description = "Menu item deleted successfully"),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 404, description = "Menu item not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn delete_menu_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    auth: AuthRestaurant,
) -> Result<StatusCode, ServiceError> {
    state
        .services
        .menu
        .delete_menu_item(auth.restaurant_id, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
