use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::auth::{AuthRestaurant, TokenPair};
use crate::errors::ServiceError;
use crate::{ApiResponse, ApiResult, AppState};

#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub restaurant_id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(flatten)]
    pub token: TokenPair,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SessionResponse {
    pub restaurant_id: Uuid,
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Exchange restaurant credentials for a bearer token
#[utoipa::path(
    post,
    path = "/auth/login",
    summary = "Login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = ApiResponse<LoginResponse>),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse),
        (status = 401, description = "Invalid credentials", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<LoginResponse> {
    payload
        .validate()
        .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

    let restaurant = state
        .services
        .restaurants
        .verify_credentials(&payload.email, &payload.password)
        .await?;

    let token = state
        .auth_service
        .generate_token(restaurant.id, &restaurant.name, &restaurant.email)?;

    Ok(Json(ApiResponse::success(LoginResponse {
        restaurant_id: restaurant.id,
        name: restaurant.name,
        email: restaurant.email,
        token,
    })))
}

/// Describe the current session
#[utoipa::path(
    get,
    path = "/auth/me",
    summary = "Current session",
    responses(
        (status = 200, description = "Session details", body = ApiResponse<SessionResponse>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn me(auth: AuthRestaurant) -> ApiResult<SessionResponse> {
    Ok(Json(ApiResponse::success(SessionResponse {
        restaurant_id: auth.restaurant_id,
        name: auth.name,
        email: auth.email,
    })))
}
