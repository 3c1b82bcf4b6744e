use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::auth::AuthRestaurant;
use crate::errors::ServiceError;
use crate::services::restaurants::{
    RegisterRestaurantRequest, RestaurantResponse, UpdateRestaurantRequest,
};
use crate::{ApiResponse, ApiResult, AppState};

/// Register a new restaurant
#[utoipa::path(
    post,
    path = "/api/v1/restaurants",
    summary = "Register restaurant",
    description = "Create a new restaurant account",
    request_body = RegisterRestaurantRequest,
    responses(
        (status = 201, description = "Restaurant registered successfully", body = ApiResponse<RestaurantResponse>,
            headers(("X-Request-Id" = String, description = "Unique request id"))
        ),
        (status = 400, description = "Invalid request data or duplicate email", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    )
)]
pub async fn register_restaurant(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRestaurantRequest>,
) -> Result<(StatusCode, Json<ApiResponse<RestaurantResponse>>), ServiceError> {
    let restaurant = state.services.restaurants.register(payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(restaurant))))
}

/// Get a restaurant's public profile
#[utoipa::path(
    get,
    path = "/api/v1/restaurants/{id}",
    summary = "Get restaurant",
    params(("id" = Uuid, Path, description = "Restaurant ID")),
    responses(
        (status = 200, description = "Restaurant retrieved successfully", body = ApiResponse<RestaurantResponse>),
        (status = 404, description = "Restaurant not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    )
)]
pub async fn get_restaurant(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<RestaurantResponse> {
    let restaurant = state.services.restaurants.get_restaurant(id).await?;
    Ok(Json(ApiResponse::success(restaurant)))
}

/// Update the authenticated restaurant's profile and discount settings
#[utoipa::path(
    put,
    path = "/api/v1/restaurants/{id}",
    summary = "Update restaurant",
    params(("id" = Uuid, Path, description = "Restaurant ID")),
    request_body = UpdateRestaurantRequest,
    responses(
        (status = 200, description = "Restaurant updated successfully", body = ApiResponse<RestaurantResponse>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 404, description = "Restaurant not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn update_restaurant(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    auth: AuthRestaurant,
    Json(payload): Json<UpdateRestaurantRequest>,
) -> ApiResult<RestaurantResponse> {
    if auth.restaurant_id != id {
        return Err(ServiceError::Forbidden(
            "Cannot update another restaurant's profile".to_string(),
        ));
    }

    let restaurant = state
        .services
        .restaurants
        .update_restaurant(id, payload)
        .await?;
    Ok(Json(ApiResponse::success(restaurant)))
}
