pub mod admin;
pub mod auth_service;
pub mod cart_service;
pub mod category_service;
pub mod checkout_service;
pub mod favorite_service;
pub mod order_service;
pub mod order_status_service;
pub mod product_service;
pub mod rating_service;
pub mod store_service;
pub mod user_service;
pub mod webhook_service;
