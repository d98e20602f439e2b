use axum::{Json, Router, extract::State, routing::get};

use crate::{
    dto::store::BannerList,
    error::AppResult,
    models::Store,
    response::ApiResponse,
    services::store_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/banners", get(list_banners))
        .route("/store", get(get_store))
}

#[utoipa::path(
    get,
    path = "/api/banners",
    responses(
        (status = 200, description = "Home banners in display order", body = ApiResponse<BannerList>),
    ),
    tag = "Storefront"
)]
pub async fn list_banners(State(state): State<AppState>) -> AppResult<Json<ApiResponse<BannerList>>> {
    let resp = store_service::list_banners(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/store",
    responses(
        (status = 200, description = "Store info with benefits; data is null before setup", body = ApiResponse<Store>),
    ),
    tag = "Storefront"
)]
pub async fn get_store(State(state): State<AppState>) -> AppResult<Json<ApiResponse<Option<Store>>>> {
    let resp = store_service::get_store(&state).await?;
    Ok(Json(resp))
}
