use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use uuid::Uuid;

use crate::{
    dto::cart::{CartMountRequest, CartMountResponse, ShippingQuote},
    entity::products::{Column as ProdCol, Entity as Products},
    error::{AppError, AppResult},
    response::{ApiResponse, Meta},
    routes::params::ShippingQuery,
    services::product_service::summaries,
    state::AppState,
    validation,
};

/// Resolve product cards for the ids held in a client-side cart.
pub async fn mount(
    state: &AppState,
    payload: CartMountRequest,
) -> AppResult<ApiResponse<CartMountResponse>> {
    if payload.ids.is_empty() {
        return Err(AppError::BadRequest("Cart must not be empty".into()));
    }

    let mut products = Products::find()
        .filter(ProdCol::Id.is_in(payload.ids.iter().copied()))
        .all(&state.orm)
        .await?;
    let position = |id: &Uuid| payload.ids.iter().position(|x| x == id);
    products.sort_by_key(|p| position(&p.id));

    let products = summaries(state, products).await?;
    Ok(ApiResponse::success(
        "OK",
        CartMountResponse { products },
        Some(Meta::empty()),
    ))
}

/// Flat shipping quote; the zipcode is only validated.
pub fn shipping(state: &AppState, query: ShippingQuery) -> AppResult<ApiResponse<ShippingQuote>> {
    let zipcode = query.zipcode.trim().to_string();
    validation::exact_len("Zipcode", &zipcode, 8)?;

    Ok(ApiResponse::success(
        "OK",
        ShippingQuote {
            zipcode,
            cost: state.config.shipping.cost,
            days: state.config.shipping.days,
        },
        Some(Meta::empty()),
    ))
}
