use std::sync::Arc;

use crate::{
    config::AppConfig,
    db::{DbPool, OrmConn, orm_from_pool},
    payments::{PaymentError, StripeClient},
};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
    pub config: Arc<AppConfig>,
    pub payments: StripeClient,
}

impl AppState {
    pub fn new(pool: DbPool, config: AppConfig) -> Result<Self, PaymentError> {
        let payments = StripeClient::new(&config.stripe, &config.frontend_url)?;
        Ok(Self {
            orm: orm_from_pool(&pool),
            pool,
            config: Arc::new(config),
            payments,
        })
    }
}
