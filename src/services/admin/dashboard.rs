use std::collections::HashMap;

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect};
use uuid::Uuid;

use crate::{
    dto::admin::{
        Chart, ChartPoint, DashboardMetrics, OrderMetrics, ProductMetrics, TopProduct,
        TopProductList, UserMetrics,
    },
    entity::{
        orders::{Column as OrderCol, Entity as Orders},
        products::{Column as ProdCol, Entity as Products},
        users::{Column as UserCol, Entity as Users},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::User,
    response::{ApiResponse, Meta},
    routes::params::{ChartPeriod, ChartQuery, TopProductsPeriod, TopProductsQuery},
    services::{
        admin::{
            month_start,
            orders::{order_rows, status_breakdown},
            products::{most_favorited, most_sold, most_viewed, products_in_order},
            revenue_statuses,
        },
        product_service::summaries,
    },
    state::AppState,
};

const RANKING_LIMIT: u64 = 5;
const RECENT_LIMIT: u64 = 10;
const DEFAULT_TOP_LIMIT: u64 = 10;

/// Time buckets of a chart: where they start and their labels, oldest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Buckets {
    pub since: DateTime<Utc>,
    pub keys: Vec<String>,
    /// `to_char` pattern producing the same labels in SQL.
    pub sql_format: &'static str,
}

fn days_back(today: NaiveDate, days: i64) -> Buckets {
    let first = today - Duration::days(days - 1);
    Buckets {
        since: first.and_time(NaiveTime::MIN).and_utc(),
        keys: (0..days)
            .map(|i| (first + Duration::days(i)).format("%Y-%m-%d").to_string())
            .collect(),
        sql_format: "YYYY-MM-DD",
    }
}

/// `(year, month)` shifted `back` months into the past.
fn shift_month(year: i32, month: u32, back: u32) -> (i32, u32) {
    let index = year * 12 + month as i32 - 1 - back as i32;
    (index.div_euclid(12), index.rem_euclid(12) as u32 + 1)
}

fn months_back(now: DateTime<Utc>, months: u32) -> AppResult<Buckets> {
    let current = month_start(now)?;
    let (year, month) = (current.year(), current.month());
    let (first_year, first_month) = shift_month(year, month, months - 1);
    let since = NaiveDate::from_ymd_opt(first_year, first_month, 1)
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("invalid chart start")))?
        .and_time(NaiveTime::MIN)
        .and_utc();

    let keys = (0..months)
        .rev()
        .map(|back| {
            let (y, m) = shift_month(year, month, back);
            format!("{y:04}-{m:02}")
        })
        .collect();

    Ok(Buckets {
        since,
        keys,
        sql_format: "YYYY-MM",
    })
}

pub fn chart_buckets(period: ChartPeriod, now: DateTime<Utc>) -> AppResult<Buckets> {
    match period {
        ChartPeriod::Week => Ok(days_back(now.date_naive(), 7)),
        ChartPeriod::Month => Ok(days_back(now.date_naive(), 30)),
        ChartPeriod::Year => months_back(now, 12),
    }
}

/// One point per bucket; buckets with no rows are zero.
pub fn fill_buckets(keys: &[String], rows: Vec<(String, i64)>) -> Vec<ChartPoint> {
    let values: HashMap<String, i64> = rows.into_iter().collect();
    keys.iter()
        .map(|key| ChartPoint {
            value: values.get(key).copied().unwrap_or(0),
            date: key.clone(),
        })
        .collect()
}

#[derive(sqlx::FromRow)]
struct BucketRow {
    bucket: String,
    value: i64,
}

async fn revenue_rows(state: &AppState, buckets: &Buckets) -> AppResult<Vec<(String, i64)>> {
    let rows = sqlx::query_as::<_, BucketRow>(
        r#"
        SELECT to_char(created_at AT TIME ZONE 'UTC', $1) AS bucket,
               COALESCE(SUM(total), 0)::bigint AS value
        FROM orders
        WHERE created_at >= $2 AND status = ANY($3)
        GROUP BY bucket
        "#,
    )
    .bind(buckets.sql_format)
    .bind(buckets.since)
    .bind(revenue_statuses())
    .fetch_all(&state.pool)
    .await?;
    Ok(rows.into_iter().map(|r| (r.bucket, r.value)).collect())
}

async fn order_count_rows(state: &AppState, buckets: &Buckets) -> AppResult<Vec<(String, i64)>> {
    let rows = sqlx::query_as::<_, BucketRow>(
        r#"
        SELECT to_char(created_at AT TIME ZONE 'UTC', $1) AS bucket,
               COUNT(*) AS value
        FROM orders
        WHERE created_at >= $2
        GROUP BY bucket
        "#,
    )
    .bind(buckets.sql_format)
    .bind(buckets.since)
    .fetch_all(&state.pool)
    .await?;
    Ok(rows.into_iter().map(|r| (r.bucket, r.value)).collect())
}

pub async fn metrics(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<DashboardMetrics>> {
    ensure_admin(user)?;
    let month = month_start(Utc::now())?;

    let users_total = Users::find().count(&state.orm).await? as i64;
    let users_new = Users::find()
        .filter(UserCol::CreatedAt.gte(month))
        .count(&state.orm)
        .await? as i64;
    let users_active: i64 = sqlx::query_scalar("SELECT COUNT(DISTINCT user_id) FROM orders")
        .fetch_one(&state.pool)
        .await?;

    let breakdown = status_breakdown(state).await?;
    let revenue_this_month: i64 = sqlx::query_scalar(
        r#"
        SELECT COALESCE(SUM(total), 0)::bigint
        FROM orders
        WHERE created_at >= $1 AND status = ANY($2)
        "#,
    )
    .bind(month)
    .bind(revenue_statuses())
    .fetch_one(&state.pool)
    .await?;

    let products_total = Products::find().count(&state.orm).await? as i64;

    let recent = Orders::find()
        .order_by_desc(OrderCol::CreatedAt)
        .limit(RECENT_LIMIT)
        .all(&state.orm)
        .await?;
    let recent_orders = order_rows(state, recent).await?;
    let recent_users = Users::find()
        .order_by_desc(UserCol::CreatedAt)
        .limit(RECENT_LIMIT)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(User::from)
        .collect();

    let metrics = DashboardMetrics {
        users: UserMetrics {
            total: users_total,
            new_this_month: users_new,
            active: users_active,
        },
        orders: OrderMetrics {
            total: breakdown.total,
            by_status: breakdown.by_status,
            revenue: breakdown.revenue,
            revenue_this_month,
            average_ticket: breakdown.average_ticket(),
        },
        products: ProductMetrics {
            total: products_total,
            most_viewed: most_viewed(state, RANKING_LIMIT).await?,
            most_sold: most_sold(state, RANKING_LIMIT).await?,
            most_favorited: most_favorited(state, RANKING_LIMIT).await?,
        },
        recent_orders,
        recent_users,
    };

    Ok(ApiResponse::success("Dashboard metrics", metrics, Some(Meta::empty())))
}

pub async fn revenue_chart(
    state: &AppState,
    user: &AuthUser,
    query: ChartQuery,
) -> AppResult<ApiResponse<Chart>> {
    ensure_admin(user)?;
    let period = query.period.unwrap_or_default();
    let buckets = chart_buckets(period, Utc::now())?;
    let rows = revenue_rows(state, &buckets).await?;

    Ok(ApiResponse::success(
        "Revenue",
        Chart {
            period,
            points: fill_buckets(&buckets.keys, rows),
        },
        Some(Meta::empty()),
    ))
}

pub async fn orders_chart(
    state: &AppState,
    user: &AuthUser,
    query: ChartQuery,
) -> AppResult<ApiResponse<Chart>> {
    ensure_admin(user)?;
    let period = query.period.unwrap_or_default();
    let buckets = chart_buckets(period, Utc::now())?;
    let rows = order_count_rows(state, &buckets).await?;

    Ok(ApiResponse::success(
        "Orders",
        Chart {
            period,
            points: fill_buckets(&buckets.keys, rows),
        },
        Some(Meta::empty()),
    ))
}

#[derive(sqlx::FromRow)]
struct PeriodSalesRow {
    product_id: Uuid,
    sold: i64,
}

pub async fn top_products(
    state: &AppState,
    user: &AuthUser,
    query: TopProductsQuery,
) -> AppResult<ApiResponse<TopProductList>> {
    ensure_admin(user)?;
    let limit = query.limit.unwrap_or(DEFAULT_TOP_LIMIT).clamp(1, 100);
    let period = query.period.unwrap_or_default();

    let days = match period {
        TopProductsPeriod::Week => Some(7),
        TopProductsPeriod::Month => Some(30),
        TopProductsPeriod::All => None,
    };

    let items = match days {
        Some(days) => {
            let since = days_back(Utc::now().date_naive(), days).since;
            let rows = sqlx::query_as::<_, PeriodSalesRow>(
                r#"
                SELECT oi.product_id, SUM(oi.quantity)::bigint AS sold
                FROM order_items oi
                JOIN orders o ON o.id = oi.order_id
                WHERE o.status = ANY($1) AND o.created_at >= $2
                GROUP BY oi.product_id
                ORDER BY sold DESC, oi.product_id
                LIMIT $3
                "#,
            )
            .bind(revenue_statuses())
            .bind(since)
            .bind(limit as i64)
            .fetch_all(&state.pool)
            .await?;

            let sold: HashMap<Uuid, i64> = rows.iter().map(|r| (r.product_id, r.sold)).collect();
            let ids: Vec<Uuid> = rows.iter().map(|r| r.product_id).collect();
            let products = products_in_order(state, &ids).await?;
            let counters: Vec<i64> = products.iter().map(|p| p.sales_count).collect();

            summaries(state, products)
                .await?
                .into_iter()
                .zip(counters)
                .map(|(product, sales_count)| TopProduct {
                    period_sales: sold.get(&product.id).copied(),
                    sales_count,
                    product,
                })
                .collect()
        }
        None => {
            let products = Products::find()
                .filter(ProdCol::SalesCount.gt(0))
                .order_by_desc(ProdCol::SalesCount)
                .order_by_asc(ProdCol::Id)
                .limit(limit)
                .all(&state.orm)
                .await?;
            let counters: Vec<i64> = products.iter().map(|p| p.sales_count).collect();

            summaries(state, products)
                .await?
                .into_iter()
                .zip(counters)
                .map(|(product, sales_count)| TopProduct {
                    period_sales: None,
                    sales_count,
                    product,
                })
                .collect()
        }
    };

    Ok(ApiResponse::success(
        "Top products",
        TopProductList { period, items },
        Some(Meta::empty()),
    ))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 18, 30, 0).unwrap()
    }

    #[test]
    fn seven_day_buckets_end_today() {
        let buckets = chart_buckets(ChartPeriod::Week, now()).unwrap();
        assert_eq!(buckets.keys.len(), 7);
        assert_eq!(buckets.keys.first().unwrap(), "2026-02-24");
        assert_eq!(buckets.keys.last().unwrap(), "2026-03-02");
        assert_eq!(buckets.since, Utc.with_ymd_and_hms(2026, 2, 24, 0, 0, 0).unwrap());
        assert_eq!(buckets.sql_format, "YYYY-MM-DD");
    }

    #[test]
    fn thirty_day_buckets_are_contiguous() {
        let buckets = chart_buckets(ChartPeriod::Month, now()).unwrap();
        assert_eq!(buckets.keys.len(), 30);
        assert_eq!(buckets.keys.first().unwrap(), "2026-02-01");
        assert_eq!(buckets.keys.last().unwrap(), "2026-03-02");
    }

    #[test]
    fn twelve_month_buckets_cross_the_year() {
        let buckets = chart_buckets(ChartPeriod::Year, now()).unwrap();
        assert_eq!(buckets.keys.len(), 12);
        assert_eq!(buckets.keys.first().unwrap(), "2025-04");
        assert_eq!(buckets.keys.last().unwrap(), "2026-03");
        assert_eq!(buckets.since, Utc.with_ymd_and_hms(2025, 4, 1, 0, 0, 0).unwrap());
        assert_eq!(buckets.sql_format, "YYYY-MM");
    }

    #[test]
    fn shift_month_wraps_years() {
        assert_eq!(shift_month(2026, 1, 1), (2025, 12));
        assert_eq!(shift_month(2026, 3, 0), (2026, 3));
        assert_eq!(shift_month(2026, 12, 24), (2024, 12));
    }

    #[test]
    fn missing_buckets_are_zero() {
        let keys = vec!["2026-01".to_string(), "2026-02".to_string(), "2026-03".to_string()];
        let points = fill_buckets(
            &keys,
            vec![("2026-02".into(), 4_990), ("2025-12".into(), 100)],
        );
        assert_eq!(
            points,
            vec![
                ChartPoint { date: "2026-01".into(), value: 0 },
                ChartPoint { date: "2026-02".into(), value: 4_990 },
                ChartPoint { date: "2026-03".into(), value: 0 },
            ]
        );
    }
}
