use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
};

use crate::{
    dto::cart::{
        CartMountRequest, CartMountResponse, FinishCartRequest, FinishCartResponse, ShippingQuote,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    routes::params::ShippingQuery,
    services::{cart_service, checkout_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/mount", post(mount))
        .route("/shipping", get(shipping))
        .route("/finish", post(finish))
}

#[utoipa::path(
    post,
    path = "/api/cart/mount",
    request_body = CartMountRequest,
    responses(
        (status = 200, description = "Product cards for the cart", body = ApiResponse<CartMountResponse>),
        (status = 400, description = "Empty cart"),
    ),
    tag = "Cart"
)]
pub async fn mount(
    State(state): State<AppState>,
    Json(payload): Json<CartMountRequest>,
) -> AppResult<Json<ApiResponse<CartMountResponse>>> {
    let resp = cart_service::mount(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/cart/shipping",
    params(ShippingQuery),
    responses(
        (status = 200, description = "Shipping quote", body = ApiResponse<ShippingQuote>),
        (status = 400, description = "Invalid zipcode"),
    ),
    tag = "Cart"
)]
pub async fn shipping(
    State(state): State<AppState>,
    Query(query): Query<ShippingQuery>,
) -> AppResult<Json<ApiResponse<ShippingQuote>>> {
    let resp = cart_service::shipping(&state, query)?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/cart/finish",
    request_body = FinishCartRequest,
    responses(
        (status = 201, description = "Order created; redirect the buyer to the payment url", body = ApiResponse<FinishCartResponse>),
        (status = 400, description = "Invalid cart"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Address not found"),
        (status = 500, description = "Payment session could not be created"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn finish(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<FinishCartRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<FinishCartResponse>>)> {
    let resp = checkout_service::finish(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}
