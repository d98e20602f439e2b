use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};

use crate::{
    dto::products::{CategoryList, CategoryMetadataResponse},
    error::AppResult,
    response::ApiResponse,
    services::category_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_categories))
        .route("/{slug}/metadata", get(category_metadata))
}

#[utoipa::path(
    get,
    path = "/api/categories",
    responses(
        (status = 200, description = "Categories with product counts", body = ApiResponse<CategoryList>),
    ),
    tag = "Categories"
)]
pub async fn list_categories(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<CategoryList>>> {
    let resp = category_service::list_categories(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/categories/{slug}/metadata",
    params(("slug" = String, Path, description = "Category slug")),
    responses(
        (status = 200, description = "Category facets and their values", body = ApiResponse<CategoryMetadataResponse>),
        (status = 404, description = "Category not found"),
    ),
    tag = "Categories"
)]
pub async fn category_metadata(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<ApiResponse<CategoryMetadataResponse>>> {
    let resp = category_service::category_metadata(&state, &slug).await?;
    Ok(Json(resp))
}
