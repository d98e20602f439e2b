use std::collections::{HashMap, HashSet};

use chrono::{Days, NaiveTime, Utc};
use sea_orm::{
    ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::admin::{
        AdminOrderDetail, AdminOrderList, AdminOrderRow, OrderStats, StatusCounts,
        StatusHistoryEntry, UpdateOrderStatusRequest,
    },
    entity::{
        order_status_history::{Column as HistoryCol, Entity as OrderStatusHistory},
        orders::{self, Column as OrderCol, Entity as Orders},
        sea_orm_active_enums::OrderStatus,
        users::{Column as UserCol, Entity as Users},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::UserRef,
    response::{ApiResponse, Meta},
    routes::params::{AdminOrderQuery, DEFAULT_PER_PAGE, normalize},
    services::{
        order_service::{order_items_with_products, shipping_snapshot},
        order_status_service::{StatusChange, apply_status},
    },
    state::AppState,
};

#[derive(sqlx::FromRow)]
struct ItemCountRow {
    order_id: Uuid,
    count: i64,
}

/// List rows for `orders` with buyer and item count, keeping their order.
pub(crate) async fn order_rows(
    state: &AppState,
    orders: Vec<orders::Model>,
) -> AppResult<Vec<AdminOrderRow>> {
    if orders.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();
    let user_ids: HashSet<Uuid> = orders.iter().map(|o| o.user_id).collect();

    let users: HashMap<Uuid, UserRef> = Users::find()
        .filter(UserCol::Id.is_in(user_ids))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|u| (u.id, UserRef::from(u)))
        .collect();

    let counts: HashMap<Uuid, i64> = sqlx::query_as::<_, ItemCountRow>(
        r#"
        SELECT order_id, COUNT(*) AS count
        FROM order_items
        WHERE order_id = ANY($1)
        GROUP BY order_id
        "#,
    )
    .bind(ids)
    .fetch_all(&state.pool)
    .await?
    .into_iter()
    .map(|r| (r.order_id, r.count))
    .collect();

    Ok(orders
        .into_iter()
        .map(|o| AdminOrderRow {
            user: users.get(&o.user_id).cloned(),
            items_count: counts.get(&o.id).copied().unwrap_or(0),
            id: o.id,
            status: o.status,
            total: o.total,
            created_at: o.created_at.with_timezone(&Utc),
        })
        .collect())
}

#[derive(sqlx::FromRow)]
struct StatusRow {
    status: String,
    count: i64,
    total: i64,
}

/// Order counts per status plus revenue over the revenue statuses.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct StatusBreakdown {
    pub total: i64,
    pub by_status: StatusCounts,
    pub revenue: i64,
    pub revenue_orders: i64,
}

impl StatusBreakdown {
    pub fn add(&mut self, status: OrderStatus, count: i64, total: i64) {
        self.total += count;
        self.by_status.add(status, count);
        if OrderStatus::REVENUE.contains(&status) {
            self.revenue += total;
            self.revenue_orders += count;
        }
    }

    pub fn average_ticket(&self) -> i64 {
        if self.revenue_orders == 0 {
            0
        } else {
            self.revenue / self.revenue_orders
        }
    }
}

pub(crate) async fn status_breakdown(state: &AppState) -> AppResult<StatusBreakdown> {
    let rows = sqlx::query_as::<_, StatusRow>(
        r#"
        SELECT status, COUNT(*) AS count, COALESCE(SUM(total), 0)::bigint AS total
        FROM orders
        GROUP BY status
        "#,
    )
    .fetch_all(&state.pool)
    .await?;

    let mut breakdown = StatusBreakdown::default();
    for row in rows {
        match row.status.parse::<OrderStatus>() {
            Ok(status) => breakdown.add(status, row.count, row.total),
            Err(err) => tracing::warn!(error = %err, "skipping unknown order status"),
        }
    }
    Ok(breakdown)
}

fn order_filter(query: &AdminOrderQuery) -> AppResult<Condition> {
    let mut condition = Condition::all();
    if let Some(status) = query.status {
        condition = condition.add(OrderCol::Status.eq(status));
    }
    if let Some(user_id) = query.user_id {
        condition = condition.add(OrderCol::UserId.eq(user_id));
    }
    if let Some(start) = query.start_date {
        condition = condition.add(OrderCol::CreatedAt.gte(start.and_time(NaiveTime::MIN).and_utc()));
    }
    if let Some(end) = query.end_date {
        let next_day = end
            .checked_add_days(Days::new(1))
            .ok_or_else(|| AppError::BadRequest("Invalid end date".into()))?;
        condition = condition.add(OrderCol::CreatedAt.lt(next_day.and_time(NaiveTime::MIN).and_utc()));
    }
    if let Some(min) = query.min_total {
        condition = condition.add(OrderCol::Total.gte(min));
    }
    if let Some(max) = query.max_total {
        condition = condition.add(OrderCol::Total.lte(max));
    }
    Ok(condition)
}

pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    query: AdminOrderQuery,
) -> AppResult<ApiResponse<AdminOrderList>> {
    ensure_admin(user)?;
    let page = normalize(query.page, query.limit, DEFAULT_PER_PAGE);

    let finder = Orders::find().filter(order_filter(&query)?);
    let total = finder.clone().count(&state.orm).await? as i64;
    let orders = finder
        .order_by_desc(OrderCol::CreatedAt)
        .order_by_asc(OrderCol::Id)
        .limit(page.per_page as u64)
        .offset(page.offset as u64)
        .all(&state.orm)
        .await?;

    let items = order_rows(state, orders).await?;
    Ok(ApiResponse::success(
        "Orders",
        AdminOrderList { items },
        Some(Meta::new(page.page, page.per_page, total)),
    ))
}

async fn order_detail(state: &AppState, order: orders::Model) -> AppResult<AdminOrderDetail> {
    let items = order_items_with_products(state, order.id).await?;
    let user = Users::find_by_id(order.user_id)
        .one(&state.orm)
        .await?
        .map(UserRef::from);
    let history = OrderStatusHistory::find()
        .filter(HistoryCol::OrderId.eq(order.id))
        .order_by_desc(HistoryCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|h| StatusHistoryEntry {
            id: h.id,
            status: h.status,
            created_at: h.created_at.with_timezone(&Utc),
        })
        .collect();

    Ok(AdminOrderDetail {
        shipping: shipping_snapshot(&order),
        id: order.id,
        status: order.status,
        total: order.total,
        shipping_cost: order.shipping_cost,
        shipping_days: order.shipping_days,
        stripe_session_id: order.stripe_session_id,
        stripe_payment_id: order.stripe_payment_id,
        user,
        items,
        history,
        created_at: order.created_at.with_timezone(&Utc),
        updated_at: order.updated_at.with_timezone(&Utc),
    })
}

pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<AdminOrderDetail>> {
    ensure_admin(user)?;
    let order = Orders::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success(
        "Order",
        order_detail(state, order).await?,
        Some(Meta::empty()),
    ))
}

pub async fn update_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateOrderStatusRequest,
) -> AppResult<ApiResponse<AdminOrderDetail>> {
    ensure_admin(user)?;
    let change = apply_status(state, id, payload.status, None).await?;

    if let StatusChange::Updated { from, to } = change {
        audit::record(
            &state.orm,
            user.user_id,
            "order_status_update",
            "orders",
            serde_json::json!({ "order_id": id, "from": from, "to": to }),
        )
        .await;
    }

    let order = Orders::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success(
        "Order updated",
        order_detail(state, order).await?,
        Some(Meta::empty()),
    ))
}

pub async fn stats(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<OrderStats>> {
    ensure_admin(user)?;
    let breakdown = status_breakdown(state).await?;
    Ok(ApiResponse::success(
        "Order stats",
        OrderStats {
            total: breakdown.total,
            by_status: breakdown.by_status,
            revenue: breakdown.revenue,
            average_ticket: breakdown.average_ticket(),
        },
        Some(Meta::empty()),
    ))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn breakdown_counts_revenue_only_for_revenue_statuses() {
        let mut breakdown = StatusBreakdown::default();
        breakdown.add(OrderStatus::Pending, 2, 5_000);
        breakdown.add(OrderStatus::Paid, 3, 9_000);
        breakdown.add(OrderStatus::Delivered, 1, 3_000);
        breakdown.add(OrderStatus::Cancelled, 4, 1_000);

        assert_eq!(breakdown.total, 10);
        assert_eq!(breakdown.revenue, 12_000);
        assert_eq!(breakdown.revenue_orders, 4);
        assert_eq!(breakdown.average_ticket(), 3_000);
        assert_eq!(breakdown.by_status.cancelled, 4);
    }

    #[test]
    fn average_ticket_without_revenue_is_zero() {
        assert_eq!(StatusBreakdown::default().average_ticket(), 0);
    }

    #[test]
    fn date_filters_build_without_error() {
        let query = AdminOrderQuery {
            start_date: NaiveDate::from_ymd_opt(2026, 1, 1),
            end_date: NaiveDate::from_ymd_opt(2026, 1, 31),
            ..Default::default()
        };
        assert!(order_filter(&query).is_ok());
    }
}
