use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch},
};
use uuid::Uuid;

use crate::{
    dto::admin::{AdminRating, AdminRatingList, ApproveRatingRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    routes::params::AdminRatingQuery,
    services::admin::ratings,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_ratings))
        .route("/{id}", get(get_rating).delete(delete_rating))
        .route("/{id}/approval", patch(set_approval))
}

#[utoipa::path(
    get,
    path = "/api/admin/ratings",
    params(AdminRatingQuery),
    responses(
        (status = 200, description = "Ratings, newest first", body = ApiResponse<AdminRatingList>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_ratings(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<AdminRatingQuery>,
) -> AppResult<Json<ApiResponse<AdminRatingList>>> {
    let resp = ratings::list_ratings(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/ratings/{id}",
    params(("id" = Uuid, Path, description = "Rating ID")),
    responses(
        (status = 200, description = "Rating with product and author", body = ApiResponse<AdminRating>),
        (status = 404, description = "Rating not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn get_rating(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<AdminRating>>> {
    let resp = ratings::get_rating(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/admin/ratings/{id}/approval",
    params(("id" = Uuid, Path, description = "Rating ID")),
    request_body = ApproveRatingRequest,
    responses(
        (status = 200, description = "Approval updated", body = ApiResponse<AdminRating>),
        (status = 404, description = "Rating not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn set_approval(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ApproveRatingRequest>,
) -> AppResult<Json<ApiResponse<AdminRating>>> {
    let resp = ratings::set_approval(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/admin/ratings/{id}",
    params(("id" = Uuid, Path, description = "Rating ID")),
    responses(
        (status = 204, description = "Rating deleted"),
        (status = 404, description = "Rating not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn delete_rating(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    ratings::delete_rating(&state, &user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
