use chrono::Utc;
use sea_orm::{ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use crate::{
    dto::orders::{OrderIdResponse, OrderList},
    entity::{
        order_items::{self, Column as OrderItemCol, Entity as OrderItems},
        orders::{self, Column as OrderCol, Entity as Orders},
        products::Entity as Products,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{OrderDetail, OrderItem, OrderSummary, ShippingAddress},
    response::{ApiResponse, Meta},
    services::product_service::first_images,
    state::AppState,
};

pub async fn list_orders(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<OrderList>> {
    let items = Orders::find()
        .filter(OrderCol::UserId.eq(user.user_id))
        .order_by_desc(OrderCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_summary)
        .collect();

    Ok(ApiResponse::success("OK", OrderList { items }, Some(Meta::empty())))
}

pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderDetail>> {
    let order = Orders::find()
        .filter(
            Condition::all()
                .add(OrderCol::UserId.eq(user.user_id))
                .add(OrderCol::Id.eq(id)),
        )
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let items = order_items_with_products(state, order.id).await?;
    Ok(ApiResponse::success(
        "OK",
        order_detail(order, items),
        Some(Meta::empty()),
    ))
}

/// Resolve the order behind a checkout session id.
///
/// The stored session id is tried first, then the processor's session metadata.
pub async fn order_by_session(
    state: &AppState,
    user: &AuthUser,
    session_id: &str,
) -> AppResult<ApiResponse<OrderIdResponse>> {
    let invalid = || AppError::BadRequest("Invalid session ID".into());
    let session_id = session_id.trim();
    if session_id.is_empty() {
        return Err(invalid());
    }

    let stored = Orders::find()
        .filter(OrderCol::StripeSessionId.eq(session_id))
        .filter(OrderCol::UserId.eq(user.user_id))
        .one(&state.orm)
        .await?;
    if let Some(order) = stored {
        return Ok(ApiResponse::success(
            "OK",
            OrderIdResponse { order_id: order.id },
            Some(Meta::empty()),
        ));
    }

    let session = match state.payments.retrieve_checkout_session(session_id).await {
        Ok(session) => session,
        Err(err) => {
            tracing::warn!(session_id, error = %err, "checkout session lookup failed");
            return Err(invalid());
        }
    };
    let order_id = session
        .order_id()
        .and_then(|id| Uuid::parse_str(id).ok())
        .ok_or_else(invalid)?;

    let owned = Orders::find()
        .filter(OrderCol::Id.eq(order_id))
        .filter(OrderCol::UserId.eq(user.user_id))
        .one(&state.orm)
        .await?
        .ok_or_else(invalid)?;

    Ok(ApiResponse::success(
        "OK",
        OrderIdResponse { order_id: owned.id },
        Some(Meta::empty()),
    ))
}

/// Items of an order joined with product label and first image.
pub async fn order_items_with_products(
    state: &AppState,
    order_id: Uuid,
) -> AppResult<Vec<OrderItem>> {
    let rows: Vec<(order_items::Model, Option<crate::entity::products::Model>)> =
        OrderItems::find()
            .filter(OrderItemCol::OrderId.eq(order_id))
            .order_by_asc(OrderItemCol::CreatedAt)
            .order_by_asc(OrderItemCol::Id)
            .find_also_related(Products)
            .all(&state.orm)
            .await?;

    let ids: Vec<Uuid> = rows.iter().map(|(item, _)| item.product_id).collect();
    let images = first_images(state, &ids).await?;

    Ok(rows
        .into_iter()
        .map(|(item, product)| OrderItem {
            id: item.id,
            product_id: item.product_id,
            label: product.map(|p| p.label).unwrap_or_default(),
            image: images.get(&item.product_id).cloned(),
            quantity: item.quantity,
            price: item.price,
        })
        .collect())
}

pub fn order_summary(model: orders::Model) -> OrderSummary {
    OrderSummary {
        id: model.id,
        status: model.status,
        total: model.total,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

pub fn shipping_snapshot(model: &orders::Model) -> ShippingAddress {
    ShippingAddress {
        zipcode: model.shipping_zipcode.clone(),
        street: model.shipping_street.clone(),
        number: model.shipping_number.clone(),
        city: model.shipping_city.clone(),
        state: model.shipping_state.clone(),
        country: model.shipping_country.clone(),
        complement: model.shipping_complement.clone(),
    }
}

pub fn order_detail(model: orders::Model, items: Vec<OrderItem>) -> OrderDetail {
    OrderDetail {
        shipping: shipping_snapshot(&model),
        id: model.id,
        status: model.status,
        total: model.total,
        shipping_cost: model.shipping_cost,
        shipping_days: model.shipping_days,
        items,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
