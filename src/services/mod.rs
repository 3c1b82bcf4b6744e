pub mod menu;
pub mod orders;
pub mod restaurants;
pub mod reviews;

pub use menu::MenuService;
pub use orders::OrderService;
pub use restaurants::RestaurantService;
pub use reviews::ReviewService;
