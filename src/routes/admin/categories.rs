use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{post, put},
};
use uuid::Uuid;

use crate::{
    dto::admin::{
        CreateCategoryRequest, CreateFacetRequest, CreateFacetValueRequest, FacetSummary,
        FacetValue, UpdateCategoryRequest, UpdateFacetRequest, UpdateFacetValueRequest,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::Category,
    response::ApiResponse,
    services::admin::categories,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/categories", post(create_category))
        .route(
            "/categories/{id}",
            put(update_category).delete(delete_category),
        )
        .route("/categories/{id}/facets", post(create_facet))
        .route("/facets/{id}", put(update_facet).delete(delete_facet))
        .route("/facets/{id}/values", post(create_facet_value))
        .route(
            "/facet-values/{id}",
            put(update_facet_value).delete(delete_facet_value),
        )
}

#[utoipa::path(
    post,
    path = "/api/admin/categories",
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Category created", body = ApiResponse<Category>),
        (status = 400, description = "Invalid payload or slug already in use"),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn create_category(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateCategoryRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Category>>)> {
    let resp = categories::create_category(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/admin/categories/{id}",
    params(("id" = Uuid, Path, description = "Category ID")),
    request_body = UpdateCategoryRequest,
    responses(
        (status = 200, description = "Category updated", body = ApiResponse<Category>),
        (status = 400, description = "Invalid payload or slug already in use"),
        (status = 404, description = "Category not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_category(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCategoryRequest>,
) -> AppResult<Json<ApiResponse<Category>>> {
    let resp = categories::update_category(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/admin/categories/{id}",
    params(("id" = Uuid, Path, description = "Category ID")),
    responses(
        (status = 204, description = "Category deleted"),
        (status = 400, description = "Category still has products"),
        (status = 404, description = "Category not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn delete_category(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    categories::delete_category(&state, &user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/admin/categories/{id}/facets",
    params(("id" = Uuid, Path, description = "Category ID")),
    request_body = CreateFacetRequest,
    responses(
        (status = 201, description = "Facet created", body = ApiResponse<FacetSummary>),
        (status = 400, description = "Invalid facet key or already exists"),
        (status = 404, description = "Category not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn create_facet(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateFacetRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<FacetSummary>>)> {
    let resp = categories::create_facet(&state, &user, id, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/admin/facets/{id}",
    params(("id" = String, Path, description = "Facet key")),
    request_body = UpdateFacetRequest,
    responses(
        (status = 200, description = "Facet updated", body = ApiResponse<FacetSummary>),
        (status = 404, description = "Facet not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_facet(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(payload): Json<UpdateFacetRequest>,
) -> AppResult<Json<ApiResponse<FacetSummary>>> {
    let resp = categories::update_facet(&state, &user, &id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/admin/facets/{id}",
    params(("id" = String, Path, description = "Facet key")),
    responses(
        (status = 204, description = "Facet deleted"),
        (status = 404, description = "Facet not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn delete_facet(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    categories::delete_facet(&state, &user, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/admin/facets/{id}/values",
    params(("id" = String, Path, description = "Facet key")),
    request_body = CreateFacetValueRequest,
    responses(
        (status = 201, description = "Facet value created", body = ApiResponse<FacetValue>),
        (status = 400, description = "Invalid value key or already exists"),
        (status = 404, description = "Facet not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn create_facet_value(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(payload): Json<CreateFacetValueRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<FacetValue>>)> {
    let resp = categories::create_facet_value(&state, &user, &id, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/admin/facet-values/{id}",
    params(("id" = String, Path, description = "Facet value key")),
    request_body = UpdateFacetValueRequest,
    responses(
        (status = 200, description = "Facet value updated", body = ApiResponse<FacetValue>),
        (status = 404, description = "Facet value not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_facet_value(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(payload): Json<UpdateFacetValueRequest>,
) -> AppResult<Json<ApiResponse<FacetValue>>> {
    let resp = categories::update_facet_value(&state, &user, &id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/admin/facet-values/{id}",
    params(("id" = String, Path, description = "Facet value key")),
    responses(
        (status = 204, description = "Facet value deleted"),
        (status = 404, description = "Facet value not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn delete_facet_value(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    categories::delete_facet_value(&state, &user, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
