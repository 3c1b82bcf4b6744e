use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::services::reviews::{CreateReviewRequest, ReviewListResponse, ReviewResponse};
use crate::{ApiResponse, ApiResult, AppState};

/// Submit a review for an order
#[utoipa::path(
    post,
    path = "/api/v1/reviews",
    summary = "Create review",
    description = "Submit a review for an order. Each order can be reviewed once; when the restaurant has discounts enabled the review returns a one-time discount code.",
    request_body = CreateReviewRequest,
    responses(
        (status = 201, description = "Review created successfully", body = ApiResponse<ReviewResponse>,
            headers(("X-Request-Id" = String, description = "Unique request id"))
        ),
        (status = 400, description = "Invalid ratings or order already reviewed", body = crate::errors::ErrorResponse),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    )
)]
pub async fn create_review(
    State(state): State<AppState>,
    Json(payload): Json<CreateReviewRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ReviewResponse>>), ServiceError> {
    let review = state.services.reviews.create_review(payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(review))))
}

/// List a restaurant's reviews with aggregate rating stats
#[utoipa::path(
    get,
    path = "/api/v1/restaurants/{id}/reviews",
    summary = "List reviews",
    params(("id" = Uuid, Path, description = "Restaurant ID")),
    responses(
        (status = 200, description = "Reviews retrieved successfully", body = ApiResponse<ReviewListResponse>),
        (status = 404, description = "Restaurant not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    )
)]
pub async fn list_reviews(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<ReviewListResponse> {
    let reviews = state.services.reviews.list_reviews(id).await?;
    Ok(Json(ApiResponse::success(reviews)))
}
