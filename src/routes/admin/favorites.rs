use axum::{Json, Router, extract::State, routing::get};

use crate::{
    dto::admin::FavoriteGroupList,
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::admin::favorites,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(grouped_favorites))
}

#[utoipa::path(
    get,
    path = "/api/admin/favorites",
    responses(
        (status = 200, description = "Favorites grouped by product, most favorited first", body = ApiResponse<FavoriteGroupList>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn grouped_favorites(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<FavoriteGroupList>>> {
    let resp = favorites::grouped_favorites(&state, &user).await?;
    Ok(Json(resp))
}
