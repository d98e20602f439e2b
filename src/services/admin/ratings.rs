use std::collections::{HashMap, HashSet};

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::admin::{AdminRating, AdminRatingList, ApproveRatingRequest, RatedProduct},
    entity::{
        product_ratings::{self, ActiveModel as RatingActive, Column as RatingCol, Entity as ProductRatings},
        products::{Column as ProdCol, Entity as Products},
        users::{Column as UserCol, Entity as Users},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::UserRef,
    response::{ApiResponse, Meta},
    routes::params::{AdminRatingQuery, DEFAULT_PER_PAGE, RatingStatus, normalize},
    services::product_service::first_images,
    state::AppState,
};

fn rating_filter(query: &AdminRatingQuery) -> Condition {
    let mut condition = Condition::all();
    if let Some(status) = query.status {
        condition = condition.add(RatingCol::Approved.eq(status == RatingStatus::Approved));
    }
    if let Some(product_id) = query.product_id {
        condition = condition.add(RatingCol::ProductId.eq(product_id));
    }
    if let Some(user_id) = query.user_id {
        condition = condition.add(RatingCol::UserId.eq(user_id));
    }
    if let Some(min) = query.min_rating {
        condition = condition.add(RatingCol::Rating.gte(min));
    }
    if let Some(max) = query.max_rating {
        condition = condition.add(RatingCol::Rating.lte(max));
    }
    condition
}

/// Attach reviewer and product to each rating, keeping their order.
async fn admin_ratings(
    state: &AppState,
    ratings: Vec<product_ratings::Model>,
) -> AppResult<Vec<AdminRating>> {
    let user_ids: HashSet<Uuid> = ratings.iter().map(|r| r.user_id).collect();
    let product_ids: Vec<Uuid> = ratings
        .iter()
        .map(|r| r.product_id)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();

    let users: HashMap<Uuid, UserRef> = Users::find()
        .filter(UserCol::Id.is_in(user_ids))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|u| (u.id, UserRef::from(u)))
        .collect();
    let mut images = first_images(state, &product_ids).await?;
    let products: HashMap<Uuid, RatedProduct> = Products::find()
        .filter(ProdCol::Id.is_in(product_ids.iter().copied()))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|p| {
            (
                p.id,
                RatedProduct {
                    id: p.id,
                    label: p.label,
                    image: images.remove(&p.id),
                },
            )
        })
        .collect();

    Ok(ratings
        .into_iter()
        .map(|r| AdminRating {
            user: users.get(&r.user_id).cloned(),
            product: products.get(&r.product_id).cloned(),
            id: r.id,
            rating: r.rating,
            comment: r.comment,
            approved: r.approved,
            created_at: r.created_at.with_timezone(&Utc),
            updated_at: r.updated_at.with_timezone(&Utc),
        })
        .collect())
}

pub async fn list_ratings(
    state: &AppState,
    user: &AuthUser,
    query: AdminRatingQuery,
) -> AppResult<ApiResponse<AdminRatingList>> {
    ensure_admin(user)?;
    let page = normalize(query.page, query.limit, DEFAULT_PER_PAGE);

    let finder = ProductRatings::find().filter(rating_filter(&query));
    let total = finder.clone().count(&state.orm).await? as i64;
    let ratings = finder
        .order_by_desc(RatingCol::CreatedAt)
        .order_by_asc(RatingCol::Id)
        .limit(page.per_page as u64)
        .offset(page.offset as u64)
        .all(&state.orm)
        .await?;

    let items = admin_ratings(state, ratings).await?;
    Ok(ApiResponse::success(
        "Ratings",
        AdminRatingList { items },
        Some(Meta::new(page.page, page.per_page, total)),
    ))
}

async fn single(state: &AppState, rating: product_ratings::Model) -> AppResult<AdminRating> {
    admin_ratings(state, vec![rating])
        .await?
        .pop()
        .ok_or(AppError::NotFound)
}

pub async fn get_rating(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<AdminRating>> {
    ensure_admin(user)?;
    let rating = ProductRatings::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success(
        "Rating",
        single(state, rating).await?,
        Some(Meta::empty()),
    ))
}

pub async fn set_approval(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: ApproveRatingRequest,
) -> AppResult<ApiResponse<AdminRating>> {
    ensure_admin(user)?;
    let rating = ProductRatings::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut active: RatingActive = rating.into();
    active.approved = Set(payload.approved);
    active.updated_at = Set(Utc::now().into());
    let rating = active.update(&state.orm).await?;

    audit::record(
        &state.orm,
        user.user_id,
        if payload.approved { "rating_approve" } else { "rating_reject" },
        "product_ratings",
        serde_json::json!({ "rating_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Rating updated",
        single(state, rating).await?,
        Some(Meta::empty()),
    ))
}

pub async fn delete_rating(state: &AppState, user: &AuthUser, id: Uuid) -> AppResult<()> {
    ensure_admin(user)?;
    let result = ProductRatings::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.orm,
        user.user_id,
        "rating_delete",
        "product_ratings",
        serde_json::json!({ "rating_id": id }),
    )
    .await;
    Ok(())
}
