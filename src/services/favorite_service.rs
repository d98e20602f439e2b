use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, Condition, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::favorites::{AddFavoriteRequest, FavoriteList},
    entity::{
        favorites::{ActiveModel as FavoriteActive, Column as FavCol, Entity as Favorites},
        products::Entity as Products,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Favorite, FavoriteItem},
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    services::product_service::summaries,
    state::AppState,
};

pub async fn list_favorites(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<FavoriteList>> {
    let page = pagination.normalize();

    let finder = Favorites::find().filter(FavCol::UserId.eq(user.user_id));
    let total = finder.clone().count(&state.orm).await? as i64;

    let rows = finder
        .order_by_desc(FavCol::CreatedAt)
        .limit(page.per_page as u64)
        .offset(page.offset as u64)
        .find_also_related(Products)
        .all(&state.orm)
        .await?;

    let (favorites, products): (Vec<_>, Vec<_>) = rows
        .into_iter()
        .filter_map(|(fav, product)| product.map(|p| (fav, p)))
        .unzip();
    let cards = summaries(state, products).await?;

    let items = favorites
        .into_iter()
        .zip(cards)
        .map(|(fav, product)| FavoriteItem {
            id: fav.id,
            created_at: fav.created_at.with_timezone(&Utc),
            product,
        })
        .collect();

    Ok(ApiResponse::success(
        "OK",
        FavoriteList { items },
        Some(Meta::new(page.page, page.per_page, total)),
    ))
}

pub async fn add_favorite(
    state: &AppState,
    user: &AuthUser,
    payload: AddFavoriteRequest,
) -> AppResult<ApiResponse<Favorite>> {
    Products::find_by_id(payload.product_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let existing = Favorites::find()
        .filter(
            Condition::all()
                .add(FavCol::UserId.eq(user.user_id))
                .add(FavCol::ProductId.eq(payload.product_id)),
        )
        .one(&state.orm)
        .await?;

    let favorite = match existing {
        Some(fav) => fav,
        None => {
            FavoriteActive {
                id: Set(Uuid::new_v4()),
                user_id: Set(user.user_id),
                product_id: Set(payload.product_id),
                created_at: NotSet,
            }
            .insert(&state.orm)
            .await?
        }
    };

    audit::record(
        &state.orm,
        user.user_id,
        "favorite_add",
        "favorites",
        serde_json::json!({ "product_id": payload.product_id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Added to favorites",
        Favorite {
            id: favorite.id,
            product_id: favorite.product_id,
            created_at: favorite.created_at.with_timezone(&Utc),
        },
        Some(Meta::empty()),
    ))
}

pub async fn remove_favorite(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let result = Favorites::delete_many()
        .filter(
            Condition::all()
                .add(FavCol::UserId.eq(user.user_id))
                .add(FavCol::ProductId.eq(product_id)),
        )
        .exec(&state.orm)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.orm,
        user.user_id,
        "favorite_remove",
        "favorites",
        serde_json::json!({ "product_id": product_id }),
    )
    .await;

    Ok(ApiResponse::empty("Removed from favorites"))
}
