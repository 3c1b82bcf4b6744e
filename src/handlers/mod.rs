pub mod auth;
pub mod menu;
pub mod orders;
pub mod restaurants;
pub mod reviews;

use crate::db::DbPool;
use crate::events::EventSender;
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub restaurants: Arc<crate::services::restaurants::RestaurantService>,
    pub menu: Arc<crate::services::menu::MenuService>,
    pub orders: Arc<crate::services::orders::OrderService>,
    pub reviews: Arc<crate::services::reviews::ReviewService>,
}

impl AppServices {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            restaurants: Arc::new(crate::services::restaurants::RestaurantService::new(
                db_pool.clone(),
                Some(event_sender.clone()),
            )),
            menu: Arc::new(crate::services::menu::MenuService::new(
                db_pool.clone(),
                Some(event_sender.clone()),
            )),
            orders: Arc::new(crate::services::orders::OrderService::new(
                db_pool.clone(),
                Some(event_sender.clone()),
            )),
            reviews: Arc::new(crate::services::reviews::ReviewService::new(
                db_pool,
                Some(event_sender),
            )),
        }
    }
}
