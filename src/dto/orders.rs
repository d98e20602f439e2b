use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::OrderSummary;

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderList {
    pub items: Vec<OrderSummary>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderIdResponse {
    pub order_id: Uuid,
}
