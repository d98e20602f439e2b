use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{post, put},
};
use uuid::Uuid;

use crate::{
    dto::admin::{CreateBenefitRequest, UpdateBenefitRequest, UpsertStoreRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::{Store, StoreBenefit},
    response::ApiResponse,
    services::admin::store,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", put(upsert_store))
        .route("/benefits", post(create_benefit))
        .route(
            "/benefits/{id}",
            put(update_benefit).delete(delete_benefit),
        )
}

#[utoipa::path(
    put,
    path = "/api/admin/store",
    request_body = UpsertStoreRequest,
    responses(
        (status = 200, description = "Store info saved", body = ApiResponse<Store>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn upsert_store(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<UpsertStoreRequest>,
) -> AppResult<Json<ApiResponse<Store>>> {
    let resp = store::upsert_store(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/store/benefits",
    request_body = CreateBenefitRequest,
    responses(
        (status = 201, description = "Benefit created", body = ApiResponse<StoreBenefit>),
        (status = 400, description = "Store info missing or invalid payload"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn create_benefit(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateBenefitRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<StoreBenefit>>)> {
    let resp = store::create_benefit(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/admin/store/benefits/{id}",
    params(("id" = Uuid, Path, description = "Benefit ID")),
    request_body = UpdateBenefitRequest,
    responses(
        (status = 200, description = "Benefit updated", body = ApiResponse<StoreBenefit>),
        (status = 404, description = "Benefit not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_benefit(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateBenefitRequest>,
) -> AppResult<Json<ApiResponse<StoreBenefit>>> {
    let resp = store::update_benefit(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/admin/store/benefits/{id}",
    params(("id" = Uuid, Path, description = "Benefit ID")),
    responses(
        (status = 204, description = "Benefit deleted"),
        (status = 404, description = "Benefit not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn delete_benefit(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    store::delete_benefit(&state, &user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
