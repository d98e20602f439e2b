use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};

use crate::{
    dto::admin::{Chart, DashboardMetrics, TopProductList},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    routes::params::{ChartQuery, TopProductsQuery},
    services::admin::dashboard,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/metrics", get(metrics))
        .route("/revenue", get(revenue_chart))
        .route("/orders", get(orders_chart))
        .route("/top-products", get(top_products))
}

#[utoipa::path(
    get,
    path = "/api/admin/dashboard/metrics",
    responses(
        (status = 200, description = "Store-wide metrics", body = ApiResponse<DashboardMetrics>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn metrics(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<DashboardMetrics>>> {
    let resp = dashboard::metrics(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/dashboard/revenue",
    params(ChartQuery),
    responses(
        (status = 200, description = "Revenue per day or month", body = ApiResponse<Chart>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn revenue_chart(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<ChartQuery>,
) -> AppResult<Json<ApiResponse<Chart>>> {
    let resp = dashboard::revenue_chart(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/dashboard/orders",
    params(ChartQuery),
    responses(
        (status = 200, description = "Orders per day or month", body = ApiResponse<Chart>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn orders_chart(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<ChartQuery>,
) -> AppResult<Json<ApiResponse<Chart>>> {
    let resp = dashboard::orders_chart(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/dashboard/top-products",
    params(TopProductsQuery),
    responses(
        (status = 200, description = "Best selling products", body = ApiResponse<TopProductList>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn top_products(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<TopProductsQuery>,
) -> AppResult<Json<ApiResponse<TopProductList>>> {
    let resp = dashboard::top_products(&state, &user, query).await?;
    Ok(Json(resp))
}
