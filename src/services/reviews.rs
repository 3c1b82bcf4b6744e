use crate::{
    db::DbPool,
    entities::order::Entity as OrderEntity,
    entities::restaurant::Entity as RestaurantEntity,
    entities::review::{
        self, ActiveModel as ReviewActiveModel, Entity as ReviewEntity, Model as ReviewModel,
    },
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::{DateTime, Utc};
use rand::{distributions::Alphanumeric, Rng};
use rust_decimal::{Decimal, RoundingStrategy};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

const DISCOUNT_CODE_SUFFIX_LEN: usize = 4;

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateReviewRequest {
    pub order_id: Uuid,
    #[validate(range(min = 1, max = 5, message = "Food rating must be 1-5"))]
    pub food_rating: i32,
    #[validate(range(min = 1, max = 5, message = "Restaurant rating must be 1-5"))]
    pub restaurant_rating: i32,
    #[validate(length(max = 2000, message = "Comment too long"))]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReviewResponse {
    pub id: Uuid,
    pub restaurant_id: Uuid,
    pub order_id: Uuid,
    pub food_rating: i32,
    pub restaurant_rating: i32,
    pub comment: Option<String>,
    /// Percentage the issued code is worth, zero when none was issued.
    pub discount_earned: Decimal,
    pub discount_code: Option<String>,
    pub is_redeemed: bool,
    pub created_at: DateTime<Utc>,
}

impl From<ReviewModel> for ReviewResponse {
    fn from(model: ReviewModel) -> Self {
        Self {
            id: model.id,
            restaurant_id: model.restaurant_id,
            order_id: model.order_id,
            food_rating: model.food_rating,
            restaurant_rating: model.restaurant_rating,
            comment: model.comment,
            discount_earned: model.discount_earned,
            discount_code: model.discount_code,
            is_redeemed: model.is_redeemed,
            created_at: model.created_at,
        }
    }
}

/// Aggregate rating statistics for a restaurant, averages rounded to one
/// decimal place.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReviewStats {
    pub total_reviews: u64,
    pub average_food_rating: Decimal,
    pub average_restaurant_rating: Decimal,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReviewListResponse {
    pub reviews: Vec<ReviewResponse>,
    pub stats: ReviewStats,
}

/// Service for reviews and the discount codes they mint
#[derive(Clone)]
pub struct ReviewService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl ReviewService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Creates a review for an order.
    ///
    /// An order can be reviewed exactly once. When the restaurant has
    /// discounts enabled the review mints a one-time code worth the
    /// restaurant's configured percentage.
    #[instrument(skip(self, request), fields(order_id = %request.order_id))]
    pub async fn create_review(
        &self,
        request: CreateReviewRequest,
    ) -> Result<ReviewResponse, ServiceError> {
        request.validate()?;

        let db = &*self.db_pool;

        let order = OrderEntity::find_by_id(request.order_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Order with ID {} not found", request.order_id))
            })?;

        let existing = ReviewEntity::find()
            .filter(review::Column::OrderId.eq(request.order_id))
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?;
        if existing.is_some() {
            return Err(ServiceError::InvalidOperation(
                "Review already submitted for this order".to_string(),
            ));
        }

        let restaurant = RestaurantEntity::find_by_id(order.restaurant_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "Restaurant with ID {} not found",
                    order.restaurant_id
                ))
            })?;

        let (discount_earned, discount_code) = if restaurant.discount_enabled {
            (
                restaurant.discount_percentage,
                Some(generate_discount_code(restaurant.discount_percentage)),
            )
        } else {
            (Decimal::ZERO, None)
        };

        let now = Utc::now();
        let review_id = Uuid::new_v4();
        let code_issued = discount_code.is_some();

        let active_model = ReviewActiveModel {
            id: Set(review_id),
            restaurant_id: Set(order.restaurant_id),
            order_id: Set(request.order_id),
            food_rating: Set(request.food_rating),
            restaurant_rating: Set(request.restaurant_rating),
            comment: Set(request.comment),
            discount_earned: Set(discount_earned),
            discount_code: Set(discount_code),
            is_redeemed: Set(false),
            created_at: Set(now),
            updated_at: Set(None),
        };

        let model = active_model.insert(db).await.map_err(|e| {
            error!(error = %e, review_id = %review_id, "Failed to create review");
            ServiceError::DatabaseError(e)
        })?;

        info!(
            review_id = %review_id,
            order_id = %request.order_id,
            code_issued,
            "Review created successfully"
        );

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender
                .send(Event::ReviewCreated {
                    review_id,
                    order_id: request.order_id,
                    discount_code_issued: code_issued,
                })
                .await
            {
                warn!(error = %e, review_id = %review_id, "Failed to send review created event");
            }
        }

        Ok(model.into())
    }

    /// Lists a restaurant's reviews newest-first with aggregate stats.
    #[instrument(skip(self), fields(restaurant_id = %restaurant_id))]
    pub async fn list_reviews(
        &self,
        restaurant_id: Uuid,
    ) -> Result<ReviewListResponse, ServiceError> {
        let db = &*self.db_pool;

        // 404 for unknown restaurants instead of an empty listing
        RestaurantEntity::find_by_id(restaurant_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Restaurant with ID {} not found", restaurant_id))
            })?;

        let reviews = ReviewEntity::find()
            .filter(review::Column::RestaurantId.eq(restaurant_id))
            .order_by_desc(review::Column::CreatedAt)
            .all(db)
            .await
            .map_err(|e| {
                error!(error = %e, restaurant_id = %restaurant_id, "Failed to fetch reviews");
                ServiceError::DatabaseError(e)
            })?;

        let stats = compute_stats(&reviews);

        Ok(ReviewListResponse {
            reviews: reviews.into_iter().map(Into::into).collect(),
            stats,
        })
    }
}

/// Builds a code like `SAVE10-7KQ2`: the percentage it is worth plus a
/// random uppercase alphanumeric suffix.
fn generate_discount_code(percentage: Decimal) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(DISCOUNT_CODE_SUFFIX_LEN)
        .map(|b| (b as char).to_ascii_uppercase())
        .collect();
    format!("SAVE{}-{}", percentage.normalize(), suffix)
}

fn compute_stats(reviews: &[ReviewModel]) -> ReviewStats {
    let total = reviews.len() as u64;
    if total == 0 {
        return ReviewStats {
            total_reviews: 0,
            average_food_rating: Decimal::ZERO,
            average_restaurant_rating: Decimal::ZERO,
        };
    }

    let food_sum: i64 = reviews.iter().map(|r| r.food_rating as i64).sum();
    let restaurant_sum: i64 = reviews.iter().map(|r| r.restaurant_rating as i64).sum();
    let count = Decimal::from(total);

    ReviewStats {
        total_reviews: total,
        average_food_rating: (Decimal::from(food_sum) / count)
            .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero),
        average_restaurant_rating: (Decimal::from(restaurant_sum) / count)
            .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn review(food: i32, restaurant: i32) -> ReviewModel {
        ReviewModel {
            id: Uuid::new_v4(),
            restaurant_id: Uuid::new_v4(),
            order_id: Uuid::new_v4(),
            food_rating: food,
            restaurant_rating: restaurant,
            comment: None,
            discount_earned: Decimal::ZERO,
            discount_code: None,
            is_redeemed: false,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn discount_code_has_expected_shape() {
        let code = generate_discount_code(dec!(10));
        assert!(code.starts_with("SAVE10-"));
        let suffix = code.strip_prefix("SAVE10-").unwrap();
        assert_eq!(suffix.len(), DISCOUNT_CODE_SUFFIX_LEN);
        assert!(suffix
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }

    #[test]
    fn discount_code_drops_trailing_zeros_from_percentage() {
        let code = generate_discount_code(dec!(15.00));
        assert!(code.starts_with("SAVE15-"), "got {code}");
    }

    #[test]
    fn stats_average_rounds_half_up_to_one_decimal() {
        // 4, 5, 4 -> 13/3 = 4.333... -> 4.3
        let reviews = vec![review(4, 5), review(5, 4), review(4, 4)];
        let stats = compute_stats(&reviews);
        assert_eq!(stats.total_reviews, 3);
        assert_eq!(stats.average_food_rating, dec!(4.3));

        // restaurant: 5, 4, 4 -> 13/3 -> 4.3
        assert_eq!(stats.average_restaurant_rating, dec!(4.3));

        // midpoint rounds away from zero: 4, 5 -> 4.5 stays 4.5; 4, 3 -> 3.5
        let reviews = vec![review(4, 4), review(5, 3)];
        let stats = compute_stats(&reviews);
        assert_eq!(stats.average_food_rating, dec!(4.5));
        assert_eq!(stats.average_restaurant_rating, dec!(3.5));
    }

    #[test]
    fn stats_for_no_reviews_are_zero() {
        let stats = compute_stats(&[]);
        assert_eq!(stats.total_reviews, 0);
        assert_eq!(stats.average_food_rating, Decimal::ZERO);
        assert_eq!(stats.average_restaurant_rating, Decimal::ZERO);
    }
}
