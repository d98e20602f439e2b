use axum::Router;

use crate::state::AppState;

pub mod banners;
pub mod categories;
pub mod dashboard;
pub mod favorites;
pub mod orders;
pub mod products;
pub mod ratings;
pub mod store;
pub mod users;

/// Back-office routes; each handler rejects non-admin callers.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/dashboard", dashboard::router())
        .nest("/products", products::router())
        .nest("/banners", banners::router())
        .nest("/users", users::router())
        .nest("/orders", orders::router())
        .nest("/ratings", ratings::router())
        .nest("/favorites", favorites::router())
        .nest("/store", store::router())
        .merge(categories::router())
}
