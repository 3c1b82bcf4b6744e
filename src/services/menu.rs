use crate::{
    db::DbPool,
    entities::menu_item::{
        self, ActiveModel as MenuItemActiveModel, Entity as MenuItemEntity, Model as MenuItemModel,
    },
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, ModelTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateMenuItemRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    #[validate(length(min = 1, message = "Category is required"))]
    pub category: String,
    pub image: Option<String>,
    #[serde(default = "default_true")]
    pub is_available: bool,
}

fn default_true() -> bool {
    true
}

/// Partial update; absent fields keep their current value.
#[derive(Debug, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateMenuItemRequest {
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    #[validate(length(min = 1, message = "Category cannot be empty"))]
    pub category: Option<String>,
    pub image: Option<String>,
    pub is_available: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MenuItemResponse {
    pub id: Uuid,
    pub restaurant_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub category: String,
    pub image: Option<String>,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<MenuItemModel> for MenuItemResponse {
    fn from(model: MenuItemModel) -> Self {
        Self {
            id: model.id,
            restaurant_id: model.restaurant_id,
            name: model.name,
            description: model.description,
            price: model.price,
            category: model.category,
            image: model.image,
            is_available: model.is_available,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// One category with its items, in menu display order.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MenuCategory {
    pub category: String,
    pub items: Vec<MenuItemResponse>,
}

/// Service for menu item management and the grouped public menu view
#[derive(Clone)]
pub struct MenuService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl MenuService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Creates a menu item for a restaurant.
    #[instrument(skip(self, request), fields(restaurant_id = %restaurant_id))]
    pub async fn create_menu_item(
        &self,
        restaurant_id: Uuid,
        request: CreateMenuItemRequest,
    ) -> Result<MenuItemResponse, ServiceError> {
        request.validate()?;

        if request.price < Decimal::ZERO {
            return Err(ServiceError::InvalidInput(
                "Price cannot be negative".to_string(),
            ));
        }

        let db = &*self.db_pool;
        let now = Utc::now();
        let item_id = Uuid::new_v4();

        let active_model = MenuItemActiveModel {
            id: Set(item_id),
            restaurant_id: Set(restaurant_id),
            name: Set(request.name),
            description: Set(request.description),
            price: Set(request.price),
            category: Set(request.category),
            image: Set(request.image),
            is_available: Set(request.is_available),
            created_at: Set(now),
            updated_at: Set(None),
        };

        let model = active_model.insert(db).await.map_err(|e| {
            error!(error = %e, item_id = %item_id, "Failed to create menu item");
            ServiceError::DatabaseError(e)
        })?;

        info!(item_id = %item_id, restaurant_id = %restaurant_id, "Menu item created");

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender.send(Event::MenuItemCreated(item_id)).await {
                warn!(error = %e, item_id = %item_id, "Failed to send menu item created event");
            }
        }

        Ok(model.into())
    }

    /// Applies a partial update to a menu item owned by `restaurant_id`.
    #[instrument(skip(self, request), fields(item_id = %item_id, restaurant_id = %restaurant_id))]
    pub async fn update_menu_item(
        &self,
        restaurant_id: Uuid,
        item_id: Uuid,
        request: UpdateMenuItemRequest,
    ) -> Result<MenuItemResponse, ServiceError> {
        request.validate()?;

        if let Some(price) = request.price {
            if price < Decimal::ZERO {
                return Err(ServiceError::InvalidInput(
                    "Price cannot be negative".to_string(),
                ));
            }
        }

        let db = &*self.db_pool;
        let model = self.find_owned_item(restaurant_id, item_id).await?;
        let mut active = model.into_active_model();

        if let Some(name) = request.name {
            active.name = Set(name);
        }
        if let Some(description) = request.description {
            active.description = Set(Some(description));
        }
        if let Some(price) = request.price {
            active.price = Set(price);
        }
        if let Some(category) = request.category {
            active.category = Set(category);
        }
        if let Some(image) = request.image {
            active.image = Set(Some(image));
        }
        if let Some(is_available) = request.is_available {
            active.is_available = Set(is_available);
        }
        active.updated_at = Set(Some(Utc::now()));

        let updated = active.update(db).await.map_err(|e| {
            error!(error = %e, item_id = %item_id, "Failed to update menu item");
            ServiceError::DatabaseError(e)
        })?;

        info!(item_id = %item_id, "Menu item updated");

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender.send(Event::MenuItemUpdated(item_id)).await {
                warn!(error = %e, item_id = %item_id, "Failed to send menu item updated event");
            }
        }

        Ok(updated.into())
    }

    /// Deletes a menu item owned by `restaurant_id`.
    ///
    /// Orders that referenced the item keep their snapshot rows.
    #[instrument(skip(self), fields(item_id = %item_id, restaurant_id = %restaurant_id))]
    pub async fn delete_menu_item(
        &self,
        restaurant_id: Uuid,
        item_id: Uuid,
    ) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        let model = self.find_owned_item(restaurant_id, item_id).await?;

        model.delete(db).await.map_err(|e| {
            error!(error = %e, item_id = %item_id, "Failed to delete menu item");
            ServiceError::DatabaseError(e)
        })?;

        info!(item_id = %item_id, "Menu item deleted");

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender.send(Event::MenuItemDeleted(item_id)).await {
                warn!(error = %e, item_id = %item_id, "Failed to send menu item deleted event");
            }
        }

        Ok(())
    }

    /// Fetches a single menu item.
    #[instrument(skip(self), fields(item_id = %item_id))]
    pub async fn get_menu_item(&self, item_id: Uuid) -> Result<MenuItemResponse, ServiceError> {
        let db = &*self.db_pool;
        let model = MenuItemEntity::find_by_id(item_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Menu item with ID {} not found", item_id))
            })?;
        Ok(model.into())
    }

    /// Returns the restaurant's menu grouped by category.
    ///
    /// Categories appear in the order they are first seen when walking
    /// items oldest-first, so the menu layout is stable as items are added.
    #[instrument(skip(self), fields(restaurant_id = %restaurant_id))]
    pub async fn get_menu(
        &self,
        restaurant_id: Uuid,
        include_unavailable: bool,
    ) -> Result<Vec<MenuCategory>, ServiceError> {
        let db = &*self.db_pool;

        let mut query = MenuItemEntity::find()
            .filter(menu_item::Column::RestaurantId.eq(restaurant_id));
        if !include_unavailable {
            query = query.filter(menu_item::Column::IsAvailable.eq(true));
        }

        let items = query
            .order_by_asc(menu_item::Column::CreatedAt)
            .all(db)
            .await
            .map_err(|e| {
                error!(error = %e, restaurant_id = %restaurant_id, "Failed to fetch menu");
                ServiceError::DatabaseError(e)
            })?;

        Ok(group_by_category(items))
    }

    async fn find_owned_item(
        &self,
        restaurant_id: Uuid,
        item_id: Uuid,
    ) -> Result<MenuItemModel, ServiceError> {
        let db = &*self.db_pool;
        let model = MenuItemEntity::find_by_id(item_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Menu item with ID {} not found", item_id))
            })?;

        if model.restaurant_id != restaurant_id {
            return Err(ServiceError::Forbidden(
                "Menu item belongs to another restaurant".to_string(),
            ));
        }

        Ok(model)
    }
}

/// Groups items into categories, preserving first-seen category order.
fn group_by_category(items: Vec<MenuItemModel>) -> Vec<MenuCategory> {
    let mut categories: Vec<MenuCategory> = Vec::new();

    for item in items {
        let response: MenuItemResponse = item.into();
        match categories
            .iter_mut()
            .find(|c| c.category == response.category)
        {
            Some(category) => category.items.push(response),
            None => categories.push(MenuCategory {
                category: response.category.clone(),
                items: vec![response],
            }),
        }
    }

    categories
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn item(name: &str, category: &str, created_secs: i64) -> MenuItemModel {
        MenuItemModel {
            id: Uuid::new_v4(),
            restaurant_id: Uuid::new_v4(),
            name: name.to_string(),
            description: None,
            price: dec!(9.50),
            category: category.to_string(),
            image: None,
            is_available: true,
            created_at: DateTime::from_timestamp(created_secs, 0).unwrap(),
            updated_at: None,
        }
    }

    #[test]
    fn grouping_preserves_first_seen_category_order() {
        let items = vec![
            item("Bruschetta", "Starters", 1),
            item("Margherita", "Pizza", 2),
            item("Caprese", "Starters", 3),
            item("Tiramisu", "Desserts", 4),
            item("Diavola", "Pizza", 5),
        ];

        let grouped = group_by_category(items);

        let categories: Vec<&str> = grouped.iter().map(|c| c.category.as_str()).collect();
        assert_eq!(categories, vec!["Starters", "Pizza", "Desserts"]);

        assert_eq!(grouped[0].items.len(), 2);
        assert_eq!(grouped[0].items[0].name, "Bruschetta");
        assert_eq!(grouped[0].items[1].name, "Caprese");
        assert_eq!(grouped[1].items.len(), 2);
        assert_eq!(grouped[2].items.len(), 1);
    }

    #[test]
    fn grouping_empty_menu_yields_no_categories() {
        assert!(group_by_category(vec![]).is_empty());
    }
}
