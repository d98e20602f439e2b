use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, DatabaseTransaction, EntityTrait,
    PaginatorTrait, QueryFilter, QuerySelect, Set, TransactionTrait,
    sea_query::{Expr, LockType},
};
use uuid::Uuid;

use crate::{
    entity::{
        order_items::{Column as OrderItemCol, Entity as OrderItems},
        order_status_history::{
            ActiveModel as HistoryActive, Column as HistoryCol, Entity as OrderStatusHistory,
        },
        orders::{ActiveModel as OrderActive, Entity as Orders},
        products::{Column as ProdCol, Entity as Products},
        sea_orm_active_enums::OrderStatus,
    },
    error::{AppError, AppResult},
    state::AppState,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusChange {
    Unchanged,
    Updated { from: OrderStatus, to: OrderStatus },
}

/// Move an order to `status`, writing history and sales counters only on change.
pub async fn apply_status(
    state: &AppState,
    order_id: Uuid,
    status: OrderStatus,
    payment_id: Option<String>,
) -> AppResult<StatusChange> {
    let txn = state.orm.begin().await?;

    let order = Orders::find_by_id(order_id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    if order.status == status {
        txn.commit().await?;
        return Ok(StatusChange::Unchanged);
    }
    let previous = order.status;
    let first_payment = status == OrderStatus::Paid && !has_been_paid(&txn, order_id).await?;

    let mut active: OrderActive = order.into();
    active.status = Set(status);
    if payment_id.is_some() {
        active.stripe_payment_id = Set(payment_id);
    }
    active.updated_at = Set(Utc::now().into());
    active.update(&txn).await?;

    record_history(&txn, order_id, status).await?;

    if first_payment {
        add_sales(&txn, order_id).await?;
    }

    txn.commit().await?;
    Ok(StatusChange::Updated { from: previous, to: status })
}

pub async fn record_history(
    txn: &DatabaseTransaction,
    order_id: Uuid,
    status: OrderStatus,
) -> AppResult<()> {
    HistoryActive {
        id: Set(Uuid::new_v4()),
        order_id: Set(order_id),
        status: Set(status),
        created_at: NotSet,
    }
    .insert(txn)
    .await?;
    Ok(())
}

async fn has_been_paid(txn: &DatabaseTransaction, order_id: Uuid) -> AppResult<bool> {
    let count = OrderStatusHistory::find()
        .filter(HistoryCol::OrderId.eq(order_id))
        .filter(HistoryCol::Status.eq(OrderStatus::Paid))
        .count(txn)
        .await?;
    Ok(count > 0)
}

async fn add_sales(txn: &DatabaseTransaction, order_id: Uuid) -> AppResult<()> {
    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order_id))
        .all(txn)
        .await?;
    for item in items {
        Products::update_many()
            .col_expr(
                ProdCol::SalesCount,
                Expr::col(ProdCol::SalesCount).add(i64::from(item.quantity)),
            )
            .filter(ProdCol::Id.eq(item.product_id))
            .exec(txn)
            .await?;
    }
    Ok(())
}
