use std::collections::HashMap;

use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::cart::{CartLine, FinishCartRequest, FinishCartResponse},
    entity::{
        order_items::ActiveModel as OrderItemActive,
        order_status_history::ActiveModel as HistoryActive,
        orders::{ActiveModel as OrderActive, Entity as Orders},
        products::{Column as ProdCol, Entity as Products},
        sea_orm_active_enums::OrderStatus,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    payments::{CheckoutLine, PaymentError},
    response::{ApiResponse, Meta},
    services::user_service::find_owned_address,
    state::AppState,
};

/// A cart line with the unit price captured at checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedLine {
    pub product_id: Uuid,
    pub label: String,
    pub unit_price: i64,
    pub quantity: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedCart {
    pub lines: Vec<PricedLine>,
    pub subtotal: i64,
    pub total: i64,
}

/// Validate a cart and merge repeated product ids, keeping first-seen order.
pub fn merge_cart_lines(lines: &[CartLine]) -> AppResult<Vec<CartLine>> {
    if lines.is_empty() {
        return Err(AppError::BadRequest("Cart must not be empty".into()));
    }

    let mut merged: Vec<CartLine> = Vec::with_capacity(lines.len());
    for line in lines {
        if line.quantity < 1 {
            return Err(AppError::BadRequest("Quantity must be at least 1".into()));
        }
        match merged.iter_mut().find(|m| m.product_id == line.product_id) {
            Some(existing) => {
                existing.quantity = existing
                    .quantity
                    .checked_add(line.quantity)
                    .ok_or_else(|| AppError::BadRequest("Quantity is too large".into()))?;
            }
            None => merged.push(*line),
        }
    }
    Ok(merged)
}

/// Price merged cart lines against current catalog prices.
///
/// `catalog` maps product id to (label, unit price).
pub fn price_cart(
    lines: &[CartLine],
    catalog: &HashMap<Uuid, (String, i64)>,
    shipping_cost: i64,
) -> AppResult<PricedCart> {
    let too_large = || AppError::BadRequest("Order total is too large".into());

    let mut priced = Vec::with_capacity(lines.len());
    let mut subtotal: i64 = 0;
    for line in lines {
        let (label, unit_price) = catalog
            .get(&line.product_id)
            .ok_or_else(|| AppError::BadRequest("Some products were not found".into()))?;
        let quantity = i32::try_from(line.quantity)
            .map_err(|_| AppError::BadRequest("Quantity is too large".into()))?;
        let line_total = unit_price.checked_mul(line.quantity).ok_or_else(too_large)?;
        subtotal = subtotal.checked_add(line_total).ok_or_else(too_large)?;
        priced.push(PricedLine {
            product_id: line.product_id,
            label: label.clone(),
            unit_price: *unit_price,
            quantity,
        });
    }
    let total = subtotal.checked_add(shipping_cost).ok_or_else(too_large)?;

    Ok(PricedCart {
        lines: priced,
        subtotal,
        total,
    })
}

pub async fn finish(
    state: &AppState,
    user: &AuthUser,
    payload: FinishCartRequest,
) -> AppResult<ApiResponse<FinishCartResponse>> {
    let lines = merge_cart_lines(&payload.cart)?;
    let address = find_owned_address(state, user.user_id, payload.address_id).await?;

    let ids: Vec<Uuid> = lines.iter().map(|l| l.product_id).collect();
    let products = Products::find()
        .filter(ProdCol::Id.is_in(ids.iter().copied()))
        .all(&state.orm)
        .await?;
    if products.len() != ids.len() {
        return Err(AppError::BadRequest("Some products were not found".into()));
    }
    let catalog: HashMap<Uuid, (String, i64)> = products
        .into_iter()
        .map(|p| (p.id, (p.label, p.price)))
        .collect();

    let shipping = state.config.shipping;
    let cart = price_cart(&lines, &catalog, shipping.cost)?;

    let order_id = Uuid::new_v4();
    let txn = state.orm.begin().await?;

    OrderActive {
        id: Set(order_id),
        user_id: Set(user.user_id),
        status: Set(OrderStatus::Pending),
        total: Set(cart.total),
        shipping_cost: Set(shipping.cost),
        shipping_days: Set(shipping.days),
        shipping_zipcode: Set(address.zipcode),
        shipping_street: Set(address.street),
        shipping_number: Set(address.number),
        shipping_city: Set(address.city),
        shipping_state: Set(address.state),
        shipping_country: Set(address.country),
        shipping_complement: Set(address.complement),
        stripe_session_id: Set(None),
        stripe_payment_id: Set(None),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await?;

    for line in &cart.lines {
        OrderItemActive {
            id: Set(Uuid::new_v4()),
            order_id: Set(order_id),
            product_id: Set(line.product_id),
            quantity: Set(line.quantity),
            price: Set(line.unit_price),
            created_at: NotSet,
        }
        .insert(&txn)
        .await?;
    }

    HistoryActive {
        id: Set(Uuid::new_v4()),
        order_id: Set(order_id),
        status: Set(OrderStatus::Pending),
        created_at: NotSet,
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    tracing::info!(%order_id, user_id = %user.user_id, total = cart.total, "order created");

    let checkout_lines: Vec<CheckoutLine> = cart
        .lines
        .iter()
        .map(|l| CheckoutLine {
            name: l.label.clone(),
            unit_amount: l.unit_price,
            quantity: i64::from(l.quantity),
        })
        .collect();

    let session = match state
        .payments
        .create_checkout_session(&checkout_lines, shipping.cost, order_id)
        .await
    {
        Ok(session) => session,
        Err(err) => {
            tracing::error!(%order_id, error = %err, "checkout session creation failed; order left pending");
            return Err(err.into());
        }
    };

    let url = session
        .url
        .clone()
        .ok_or_else(|| PaymentError::Parse("checkout session has no url".into()))?;

    Orders::update(OrderActive {
        id: Set(order_id),
        stripe_session_id: Set(Some(session.id.clone())),
        ..Default::default()
    })
    .exec(&state.orm)
    .await?;

    audit::record(
        &state.orm,
        user.user_id,
        "checkout",
        "orders",
        serde_json::json!({ "order_id": order_id, "session_id": session.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Checkout started",
        FinishCartResponse { order_id, url },
        Some(Meta::empty()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(product_id: Uuid, quantity: i64) -> CartLine {
        CartLine {
            product_id,
            quantity,
        }
    }

    #[test]
    fn empty_cart_is_rejected() {
        assert!(matches!(merge_cart_lines(&[]), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let a = Uuid::new_v4();
        assert!(merge_cart_lines(&[line(a, 0)]).is_err());
        assert!(merge_cart_lines(&[line(a, -2)]).is_err());
    }

    #[test]
    fn duplicate_ids_are_merged() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let merged = merge_cart_lines(&[line(a, 1), line(b, 2), line(a, 3)]).unwrap();
        assert_eq!(merged, vec![line(a, 4), line(b, 2)]);
    }

    #[test]
    fn total_is_sum_of_lines_plus_shipping() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let catalog = HashMap::from([
            (a, ("Shirt".to_string(), 4990)),
            (b, ("Mug".to_string(), 1500)),
        ]);
        let cart = price_cart(&[line(a, 2), line(b, 1)], &catalog, 1000).unwrap();
        assert_eq!(cart.subtotal, 2 * 4990 + 1500);
        assert_eq!(cart.total, 2 * 4990 + 1500 + 1000);
        assert_eq!(cart.lines[0].unit_price, 4990);
        assert_eq!(cart.lines[0].quantity, 2);
        assert_eq!(cart.lines[1].label, "Mug");
    }

    #[test]
    fn unknown_product_fails_pricing() {
        let catalog = HashMap::new();
        let err = price_cart(&[line(Uuid::new_v4(), 1)], &catalog, 0).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(msg) if msg == "Some products were not found"));
    }

    #[test]
    fn overflow_is_rejected() {
        let a = Uuid::new_v4();
        let catalog = HashMap::from([(a, ("Gold".to_string(), i64::MAX / 2))]);
        assert!(price_cart(&[line(a, 3)], &catalog, 0).is_err());
        assert!(price_cart(&[line(a, i64::from(i32::MAX) + 1)], &catalog, 0).is_err());
    }
}
