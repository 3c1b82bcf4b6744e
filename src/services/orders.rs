use crate::{
    db::DbPool,
    entities::menu_item::{self, Entity as MenuItemEntity},
    entities::order::{
        self, ActiveModel as OrderActiveModel, Entity as OrderEntity, Model as OrderModel,
        OrderStatus,
    },
    entities::order_item::{
        self, ActiveModel as OrderItemActiveModel, Entity as OrderItemEntity,
        Model as OrderItemModel,
    },
    entities::restaurant::Entity as RestaurantEntity,
    entities::review::{self, Entity as ReviewEntity},
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct OrderLineRequest {
    pub menu_item_id: Uuid,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateOrderRequest {
    pub restaurant_id: Uuid,
    #[validate(length(min = 1, message = "Order must contain at least one item"))]
    pub items: Vec<OrderLineRequest>,
    pub table_number: Option<String>,
    pub customer_note: Option<String>,
    /// One-time discount code earned from a review.
    pub discount_code: Option<String>,
}

/// Partial update; absent fields keep their current value. Line items and
/// totals are immutable once the order is placed.
#[derive(Debug, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateOrderRequest {
    pub status: Option<String>,
    pub table_number: Option<String>,
    pub customer_note: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderItemResponse {
    pub menu_item_id: Uuid,
    pub name: String,
    pub price: Decimal,
    pub quantity: i32,
}

impl From<OrderItemModel> for OrderItemResponse {
    fn from(model: OrderItemModel) -> Self {
        Self {
            menu_item_id: model.menu_item_id,
            name: model.name,
            price: model.price,
            quantity: model.quantity,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderResponse {
    pub id: Uuid,
    pub restaurant_id: Uuid,
    pub items: Vec<OrderItemResponse>,
    pub total_price: Decimal,
    pub status: String,
    pub table_number: Option<String>,
    pub customer_note: Option<String>,
    pub discount_applied: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderListResponse {
    pub orders: Vec<OrderResponse>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

/// Service for order placement and lifecycle management
#[derive(Clone)]
pub struct OrderService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl OrderService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Places an order, optionally redeeming a discount code.
    ///
    /// The whole operation runs in one transaction. The code is consumed
    /// with a conditional update (`is_redeemed = false` in the predicate),
    /// so two concurrent orders racing on the same code cannot both get
    /// the discount: the loser sees zero affected rows and the order rolls
    /// back with "Discount code already used".
    #[instrument(skip(self, request), fields(restaurant_id = %request.restaurant_id))]
    pub async fn create_order(
        &self,
        request: CreateOrderRequest,
    ) -> Result<OrderResponse, ServiceError> {
        request.validate()?;
        for line in &request.items {
            line.validate()?;
        }

        let db = &*self.db_pool;
        let restaurant = RestaurantEntity::find_by_id(request.restaurant_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "Restaurant with ID {} not found",
                    request.restaurant_id
                ))
            })?;

        let now = Utc::now();
        let order_id = Uuid::new_v4();

        let txn = db.begin().await.map_err(|e| {
            error!(error = %e, "Failed to start transaction for order creation");
            ServiceError::DatabaseError(e)
        })?;

        // Snapshot menu items inside the transaction
        let item_ids: Vec<Uuid> = request.items.iter().map(|l| l.menu_item_id).collect();
        let menu_items: HashMap<Uuid, menu_item::Model> = MenuItemEntity::find()
            .filter(menu_item::Column::Id.is_in(item_ids))
            .filter(menu_item::Column::RestaurantId.eq(request.restaurant_id))
            .all(&txn)
            .await
            .map_err(ServiceError::DatabaseError)?
            .into_iter()
            .map(|m| (m.id, m))
            .collect();

        let mut subtotal = Decimal::ZERO;
        let mut order_items = Vec::with_capacity(request.items.len());
        for line in &request.items {
            let item = menu_items.get(&line.menu_item_id).ok_or_else(|| {
                ServiceError::InvalidInput(format!(
                    "Menu item {} not found for this restaurant",
                    line.menu_item_id
                ))
            })?;
            if !item.is_available {
                return Err(ServiceError::InvalidOperation(format!(
                    "Menu item '{}' is currently unavailable",
                    item.name
                )));
            }

            let quantity = Decimal::from(line.quantity);
            subtotal += item.price * quantity;

            order_items.push(OrderItemActiveModel {
                id: Set(Uuid::new_v4()),
                order_id: Set(order_id),
                menu_item_id: Set(item.id),
                name: Set(item.name.clone()),
                price: Set(item.price),
                quantity: Set(line.quantity),
            });
        }

        // Redeem the discount code, if any, before totals are final
        let mut discount_applied = Decimal::ZERO;
        let mut redeemed_review: Option<(Uuid, String)> = None;
        if let Some(code) = request
            .discount_code
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
        {
            let review = ReviewEntity::find()
                .filter(review::Column::DiscountCode.eq(code))
                .one(&txn)
                .await
                .map_err(ServiceError::DatabaseError)?
                .ok_or_else(|| {
                    ServiceError::InvalidOperation("Invalid discount code".to_string())
                })?;

            if review.restaurant_id != request.restaurant_id {
                return Err(ServiceError::InvalidOperation(
                    "Invalid discount code for this restaurant".to_string(),
                ));
            }

            // Minimum is checked against the pre-discount subtotal
            if subtotal < restaurant.discount_min_order_amount {
                return Err(ServiceError::InvalidOperation(format!(
                    "Minimum order amount of {} required for this discount",
                    restaurant.discount_min_order_amount
                )));
            }

            let consumed = ReviewEntity::update_many()
                .col_expr(review::Column::IsRedeemed, Expr::value(true))
                .col_expr(review::Column::UpdatedAt, Expr::value(now))
                .filter(review::Column::Id.eq(review.id))
                .filter(review::Column::IsRedeemed.eq(false))
                .exec(&txn)
                .await
                .map_err(ServiceError::DatabaseError)?;

            if consumed.rows_affected == 0 {
                return Err(ServiceError::InvalidOperation(
                    "Discount code already used".to_string(),
                ));
            }

            discount_applied = subtotal * review.discount_earned / Decimal::from(100);
            redeemed_review = Some((review.id, code.to_string()));
        }

        let total_price = subtotal - discount_applied;

        let order_active_model = OrderActiveModel {
            id: Set(order_id),
            restaurant_id: Set(request.restaurant_id),
            total_price: Set(total_price),
            status: Set(OrderStatus::Pending.to_string()),
            table_number: Set(request.table_number),
            customer_note: Set(request.customer_note),
            discount_applied: Set(discount_applied),
            created_at: Set(now),
            updated_at: Set(None),
        };

        let order_model = order_active_model.insert(&txn).await.map_err(|e| {
            error!(error = %e, order_id = %order_id, "Failed to create order");
            ServiceError::DatabaseError(e)
        })?;

        let item_count = order_items.len();
        OrderItemEntity::insert_many(order_items)
            .exec(&txn)
            .await
            .map_err(|e| {
                error!(error = %e, order_id = %order_id, "Failed to create order items");
                ServiceError::DatabaseError(e)
            })?;

        txn.commit().await.map_err(|e| {
            error!(error = %e, order_id = %order_id, "Failed to commit order creation transaction");
            ServiceError::DatabaseError(e)
        })?;

        info!(
            order_id = %order_id,
            restaurant_id = %request.restaurant_id,
            item_count,
            %total_price,
            "Order created successfully"
        );

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender.send(Event::OrderCreated(order_id)).await {
                warn!(error = %e, order_id = %order_id, "Failed to send order created event");
            }
            if let Some((review_id, code)) = redeemed_review {
                if let Err(e) = event_sender
                    .send(Event::DiscountRedeemed {
                        order_id,
                        review_id,
                        code,
                    })
                    .await
                {
                    warn!(error = %e, order_id = %order_id, "Failed to send discount redeemed event");
                }
            }
        }

        self.assemble_response(db, order_model).await
    }

    /// Fetches an order with its line items.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn get_order(&self, order_id: Uuid) -> Result<OrderResponse, ServiceError> {
        let db = &*self.db_pool;
        let order = OrderEntity::find_by_id(order_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound(format!("Order with ID {} not found", order_id)))?;

        self.assemble_response(db, order).await
    }

    /// Lists a restaurant's orders newest-first, optionally filtered by status.
    #[instrument(skip(self), fields(restaurant_id = %restaurant_id))]
    pub async fn list_orders(
        &self,
        restaurant_id: Uuid,
        status: Option<String>,
        page: u64,
        per_page: u64,
    ) -> Result<OrderListResponse, ServiceError> {
        let db = &*self.db_pool;

        let mut query = OrderEntity::find().filter(order::Column::RestaurantId.eq(restaurant_id));
        if let Some(status) = status {
            let status = OrderStatus::from_str(&status)
                .map_err(|_| ServiceError::InvalidStatus(status.clone()))?;
            query = query.filter(order::Column::Status.eq(status.to_string()));
        }

        let paginator = query
            .order_by_desc(order::Column::CreatedAt)
            .paginate(db, per_page);

        let total = paginator.num_items().await.map_err(|e| {
            error!(error = %e, "Failed to count orders");
            ServiceError::DatabaseError(e)
        })?;

        let orders = paginator.fetch_page(page.saturating_sub(1)).await.map_err(|e| {
            error!(error = %e, page, per_page, "Failed to fetch orders page");
            ServiceError::DatabaseError(e)
        })?;

        let mut responses = Vec::with_capacity(orders.len());
        for order in orders {
            responses.push(self.assemble_response(db, order).await?);
        }

        Ok(OrderListResponse {
            orders: responses,
            total,
            page,
            per_page,
        })
    }

    /// Applies a partial update to an order. A status change enforces the
    /// forward-only lifecycle; table number and customer note are free-form.
    #[instrument(skip(self, request), fields(order_id = %order_id))]
    pub async fn update_order(
        &self,
        restaurant_id: Uuid,
        order_id: Uuid,
        request: UpdateOrderRequest,
    ) -> Result<OrderResponse, ServiceError> {
        let new_status = request
            .status
            .as_deref()
            .map(|s| OrderStatus::from_str(s).map_err(|_| ServiceError::InvalidStatus(s.to_string())))
            .transpose()?;

        let db = &*self.db_pool;
        let order = OrderEntity::find_by_id(order_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound(format!("Order with ID {} not found", order_id)))?;

        if order.restaurant_id != restaurant_id {
            return Err(ServiceError::Forbidden(
                "Order belongs to another restaurant".to_string(),
            ));
        }

        if let Some(new_status) = new_status {
            let current_status = OrderStatus::from_str(&order.status).map_err(|_| {
                ServiceError::InternalError(format!("Corrupt order status: {}", order.status))
            })?;

            if !current_status.can_transition_to(new_status) {
                return Err(ServiceError::InvalidOperation(format!(
                    "Cannot change order status from {} to {}",
                    current_status, new_status
                )));
            }
        }

        let old_status = order.status.clone();
        let mut active = order.into_active_model();
        if let Some(new_status) = new_status {
            active.status = Set(new_status.to_string());
        }
        if let Some(table_number) = request.table_number {
            active.table_number = Set(Some(table_number));
        }
        if let Some(customer_note) = request.customer_note {
            active.customer_note = Set(Some(customer_note));
        }
        active.updated_at = Set(Some(Utc::now()));

        let updated = active.update(db).await.map_err(|e| {
            error!(error = %e, order_id = %order_id, "Failed to update order");
            ServiceError::DatabaseError(e)
        })?;

        info!(order_id = %order_id, status = %updated.status, "Order updated");

        if let (Some(event_sender), Some(new_status)) = (&self.event_sender, new_status) {
            if let Err(e) = event_sender
                .send(Event::OrderStatusChanged {
                    order_id,
                    old_status: old_status.clone(),
                    new_status: new_status.to_string(),
                })
                .await
            {
                warn!(error = %e, order_id = %order_id, "Failed to send order status changed event");
            }

            let lifecycle_event = match new_status {
                OrderStatus::Cancelled => Some(Event::OrderCancelled(order_id)),
                OrderStatus::Completed => Some(Event::OrderCompleted(order_id)),
                _ => None,
            };
            if let Some(event) = lifecycle_event {
                if let Err(e) = event_sender.send(event).await {
                    warn!(error = %e, order_id = %order_id, "Failed to send order lifecycle event");
                }
            }
        }

        self.assemble_response(db, updated).await
    }

    async fn assemble_response<C: ConnectionTrait>(
        &self,
        db: &C,
        order: OrderModel,
    ) -> Result<OrderResponse, ServiceError> {
        let items = OrderItemEntity::find()
            .filter(order_item::Column::OrderId.eq(order.id))
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(OrderResponse {
            id: order.id,
            restaurant_id: order.restaurant_id,
            items: items.into_iter().map(Into::into).collect(),
            total_price: order.total_price,
            status: order.status,
            table_number: order.table_number,
            customer_note: order.customer_note,
            discount_applied: order.discount_applied,
            created_at: order.created_at,
            updated_at: order.updated_at,
        })
    }
}
