use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::ProductSummary;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CartMountRequest {
    pub ids: Vec<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartMountResponse {
    pub products: Vec<ProductSummary>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ShippingQuote {
    pub zipcode: String,
    pub cost: i64,
    pub days: i32,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, ToSchema, PartialEq, Eq)]
pub struct CartLine {
    pub product_id: Uuid,
    pub quantity: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct FinishCartRequest {
    pub cart: Vec<CartLine>,
    pub address_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FinishCartResponse {
    pub order_id: Uuid,
    pub url: String,
}
