use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::products::{CreateRatingRequest, ProductList, ProductWithCategory, RatingList},
    error::AppResult,
    middleware::auth::{AuthUser, OptionalAuthUser},
    models::{Rating, RatingAverage},
    response::ApiResponse,
    routes::params::{LimitQuery, Pagination, ProductQuery},
    services::{product_service, rating_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products))
        .route("/{id}", get(get_product))
        .route("/{id}/related", get(related_products))
        .route("/{id}/ratings", get(list_ratings).post(create_rating))
        .route("/{id}/ratings/average", get(rating_average))
}

#[utoipa::path(
    get,
    path = "/api/products",
    params(ProductQuery),
    responses(
        (status = 200, description = "List products", body = ApiResponse<ProductList>),
        (status = 400, description = "Malformed metadata filter"),
    ),
    tag = "Products"
)]
pub async fn list_products(
    State(state): State<AppState>,
    user: OptionalAuthUser,
    Query(query): Query<ProductQuery>,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    let resp = product_service::list_products(&state, user.user_id(), query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/products/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Get product", body = ApiResponse<ProductWithCategory>),
        (status = 404, description = "Product not found"),
    ),
    tag = "Products"
)]
pub async fn get_product(
    State(state): State<AppState>,
    user: OptionalAuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<ProductWithCategory>>> {
    let resp = product_service::get_product(&state, user.user_id(), id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/products/{id}/related",
    params(("id" = Uuid, Path, description = "Product ID"), LimitQuery),
    responses(
        (status = 200, description = "Products of the same category", body = ApiResponse<ProductList>),
        (status = 404, description = "Product not found"),
    ),
    tag = "Products"
)]
pub async fn related_products(
    State(state): State<AppState>,
    user: OptionalAuthUser,
    Path(id): Path<Uuid>,
    Query(query): Query<LimitQuery>,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    let resp = product_service::related_products(&state, user.user_id(), id, query.limit).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/products/{id}/ratings",
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body = CreateRatingRequest,
    responses(
        (status = 201, description = "Rating submitted for approval", body = ApiResponse<Rating>),
        (status = 400, description = "Invalid rating or already rated"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Product not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Ratings"
)]
pub async fn create_rating(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateRatingRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Rating>>)> {
    let resp = rating_service::create_rating(&state, &user, id, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/products/{id}/ratings",
    params(("id" = Uuid, Path, description = "Product ID"), Pagination),
    responses(
        (status = 200, description = "Approved ratings, newest first", body = ApiResponse<RatingList>),
    ),
    tag = "Ratings"
)]
pub async fn list_ratings(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<RatingList>>> {
    let resp = rating_service::list_ratings(&state, id, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/products/{id}/ratings/average",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Average of approved ratings", body = ApiResponse<RatingAverage>),
    ),
    tag = "Ratings"
)]
pub async fn rating_average(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<RatingAverage>>> {
    let resp = rating_service::rating_average(&state, id).await?;
    Ok(Json(resp))
}
