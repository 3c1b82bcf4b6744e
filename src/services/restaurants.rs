use crate::{
    auth::{hash_password, verify_password},
    db::DbPool,
    entities::restaurant::{
        self, ActiveModel as RestaurantActiveModel, Entity as RestaurantEntity,
        Model as RestaurantModel,
    },
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

const DEFAULT_OPEN_TIME: &str = "09:00";
const DEFAULT_CLOSE_TIME: &str = "22:00";
const DEFAULT_DISCOUNT_PERCENTAGE: u32 = 10;

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct RegisterRestaurantRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[validate(length(min = 1, message = "Address is required"))]
    pub address: String,
    #[validate(length(min = 1, message = "Phone is required"))]
    pub phone: String,
    pub description: Option<String>,
    pub open_time: Option<String>,
    pub close_time: Option<String>,
}

/// Partial update; absent fields keep their current value.
#[derive(Debug, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateRestaurantRequest {
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    pub name: Option<String>,
    #[validate(length(min = 1, message = "Address cannot be empty"))]
    pub address: Option<String>,
    #[validate(length(min = 1, message = "Phone cannot be empty"))]
    pub phone: Option<String>,
    pub description: Option<String>,
    pub open_time: Option<String>,
    pub close_time: Option<String>,
    pub discount_enabled: Option<bool>,
    #[validate(range(min = 1, max = 100, message = "Discount percentage must be 1-100"))]
    pub discount_percentage: Option<u32>,
    pub discount_min_order_amount: Option<Decimal>,
}

/// Public restaurant profile. The password hash never leaves the service.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RestaurantResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub address: String,
    pub phone: String,
    pub description: Option<String>,
    pub open_time: String,
    pub close_time: String,
    pub discount_enabled: bool,
    pub discount_percentage: Decimal,
    pub discount_min_order_amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<RestaurantModel> for RestaurantResponse {
    fn from(model: RestaurantModel) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
            address: model.address,
            phone: model.phone,
            description: model.description,
            open_time: model.open_time,
            close_time: model.close_time,
            discount_enabled: model.discount_enabled,
            discount_percentage: model.discount_percentage,
            discount_min_order_amount: model.discount_min_order_amount,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Service for restaurant registration and profile management
#[derive(Clone)]
pub struct RestaurantService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl RestaurantService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Registers a new restaurant account.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(
        &self,
        request: RegisterRestaurantRequest,
    ) -> Result<RestaurantResponse, ServiceError> {
        request.validate()?;

        let db = &*self.db_pool;
        let email = request.email.trim().to_lowercase();

        let existing = RestaurantEntity::find()
            .filter(restaurant::Column::Email.eq(email.clone()))
            .one(db)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to check for existing restaurant");
                ServiceError::DatabaseError(e)
            })?;

        if existing.is_some() {
            return Err(ServiceError::InvalidOperation(
                "Restaurant with this email already exists".to_string(),
            ));
        }

        let now = Utc::now();
        let restaurant_id = Uuid::new_v4();
        let password_hash = hash_password(&request.password)?;

        let active_model = RestaurantActiveModel {
            id: Set(restaurant_id),
            name: Set(request.name),
            email: Set(email),
            password_hash: Set(password_hash),
            address: Set(request.address),
            phone: Set(request.phone),
            description: Set(request.description),
            open_time: Set(request
                .open_time
                .unwrap_or_else(|| DEFAULT_OPEN_TIME.to_string())),
            close_time: Set(request
                .close_time
                .unwrap_or_else(|| DEFAULT_CLOSE_TIME.to_string())),
            discount_enabled: Set(false),
            discount_percentage: Set(Decimal::from(DEFAULT_DISCOUNT_PERCENTAGE)),
            discount_min_order_amount: Set(Decimal::ZERO),
            created_at: Set(now),
            updated_at: Set(None),
        };

        let model = active_model.insert(db).await.map_err(|e| {
            error!(error = %e, restaurant_id = %restaurant_id, "Failed to create restaurant");
            ServiceError::DatabaseError(e)
        })?;

        info!(restaurant_id = %restaurant_id, "Restaurant registered successfully");

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender
                .send(Event::RestaurantRegistered(restaurant_id))
                .await
            {
                warn!(error = %e, restaurant_id = %restaurant_id, "Failed to send restaurant registered event");
            }
        }

        Ok(model.into())
    }

    /// Fetches a restaurant's public profile.
    #[instrument(skip(self), fields(restaurant_id = %restaurant_id))]
    pub async fn get_restaurant(
        &self,
        restaurant_id: Uuid,
    ) -> Result<RestaurantResponse, ServiceError> {
        let model = self.find_restaurant(restaurant_id).await?;
        Ok(model.into())
    }

    /// Applies a partial update to a restaurant profile.
    #[instrument(skip(self, request), fields(restaurant_id = %restaurant_id))]
    pub async fn update_restaurant(
        &self,
        restaurant_id: Uuid,
        request: UpdateRestaurantRequest,
    ) -> Result<RestaurantResponse, ServiceError> {
        request.validate()?;

        let db = &*self.db_pool;
        let model = self.find_restaurant(restaurant_id).await?;
        let mut active = model.into_active_model();

        if let Some(name) = request.name {
            active.name = Set(name);
        }
        if let Some(address) = request.address {
            active.address = Set(address);
        }
        if let Some(phone) = request.phone {
            active.phone = Set(phone);
        }
        if let Some(description) = request.description {
            active.description = Set(Some(description));
        }
        if let Some(open_time) = request.open_time {
            active.open_time = Set(open_time);
        }
        if let Some(close_time) = request.close_time {
            active.close_time = Set(close_time);
        }
        if let Some(enabled) = request.discount_enabled {
            active.discount_enabled = Set(enabled);
        }
        if let Some(pct) = request.discount_percentage {
            active.discount_percentage = Set(Decimal::from(pct));
        }
        if let Some(min_amount) = request.discount_min_order_amount {
            if min_amount < Decimal::ZERO {
                return Err(ServiceError::InvalidInput(
                    "Minimum order amount cannot be negative".to_string(),
                ));
            }
            active.discount_min_order_amount = Set(min_amount);
        }
        active.updated_at = Set(Some(Utc::now()));

        let updated = active.update(db).await.map_err(|e| {
            error!(error = %e, restaurant_id = %restaurant_id, "Failed to update restaurant");
            ServiceError::DatabaseError(e)
        })?;

        info!(restaurant_id = %restaurant_id, "Restaurant updated successfully");

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender
                .send(Event::RestaurantUpdated(restaurant_id))
                .await
            {
                warn!(error = %e, restaurant_id = %restaurant_id, "Failed to send restaurant updated event");
            }
        }

        Ok(updated.into())
    }

    /// Verifies login credentials; returns the restaurant on success.
    ///
    /// A wrong password and an unknown email produce the same error so the
    /// endpoint does not leak which emails are registered.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn verify_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<RestaurantModel, ServiceError> {
        let db = &*self.db_pool;
        let email = email.trim().to_lowercase();

        let restaurant = RestaurantEntity::find()
            .filter(restaurant::Column::Email.eq(email))
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::AuthError("Invalid email or password".to_string()))?;

        if !verify_password(password, &restaurant.password_hash)? {
            return Err(ServiceError::AuthError(
                "Invalid email or password".to_string(),
            ));
        }

        Ok(restaurant)
    }

    pub(crate) async fn find_restaurant(
        &self,
        restaurant_id: Uuid,
    ) -> Result<RestaurantModel, ServiceError> {
        let db = &*self.db_pool;
        RestaurantEntity::find_by_id(restaurant_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Restaurant with ID {} not found", restaurant_id))
            })
    }
}
