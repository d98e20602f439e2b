use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, Condition, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::products::{CreateRatingRequest, RatingList},
    entity::{
        product_ratings::{ActiveModel as RatingActive, Column as RatingCol, Entity as ProductRatings},
        products::Entity as Products,
        users::Entity as Users,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{PublicRating, Rating, RatingAverage, Reviewer},
    response::{ApiResponse, Meta},
    routes::params::{Pagination, normalize},
    services::product_service::rating_stats,
    state::AppState,
};

const DEFAULT_RATINGS_PER_PAGE: i64 = 10;

pub fn validate_rating(rating: i32) -> AppResult<()> {
    if !(1..=5).contains(&rating) {
        return Err(AppError::BadRequest("Rating must be between 1 and 5".into()));
    }
    Ok(())
}

pub async fn create_rating(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
    payload: CreateRatingRequest,
) -> AppResult<ApiResponse<Rating>> {
    validate_rating(payload.rating)?;

    Products::find_by_id(product_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let existing = ProductRatings::find()
        .filter(
            Condition::all()
                .add(RatingCol::ProductId.eq(product_id))
                .add(RatingCol::UserId.eq(user.user_id)),
        )
        .one(&state.orm)
        .await?;
    if existing.is_some() {
        return Err(AppError::BadRequest(
            "You have already rated this product".into(),
        ));
    }

    let rating = RatingActive {
        id: Set(Uuid::new_v4()),
        product_id: Set(product_id),
        user_id: Set(user.user_id),
        rating: Set(payload.rating),
        comment: Set(payload.comment.filter(|c| !c.trim().is_empty())),
        approved: Set(false),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.orm,
        user.user_id,
        "rating_create",
        "product_ratings",
        serde_json::json!({ "rating_id": rating.id, "product_id": product_id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Rating submitted for approval",
        rating_from_entity(rating),
        Some(Meta::empty()),
    ))
}

pub async fn list_ratings(
    state: &AppState,
    product_id: Uuid,
    pagination: Pagination,
) -> AppResult<ApiResponse<RatingList>> {
    let page = normalize(pagination.page, pagination.per_page, DEFAULT_RATINGS_PER_PAGE);

    let finder = ProductRatings::find()
        .filter(RatingCol::ProductId.eq(product_id))
        .filter(RatingCol::Approved.eq(true));
    let total = finder.clone().count(&state.orm).await? as i64;

    let rows = finder
        .order_by_desc(RatingCol::CreatedAt)
        .limit(page.per_page as u64)
        .offset(page.offset as u64)
        .find_also_related(Users)
        .all(&state.orm)
        .await?;

    let items = rows
        .into_iter()
        .map(|(rating, user)| PublicRating {
            id: rating.id,
            rating: rating.rating,
            comment: rating.comment,
            created_at: rating.created_at.with_timezone(&chrono::Utc),
            user: user
                .map(|u| Reviewer {
                    id: u.id,
                    name: u.name,
                })
                .unwrap_or(Reviewer {
                    id: rating.user_id,
                    name: String::new(),
                }),
        })
        .collect();

    Ok(ApiResponse::success(
        "OK",
        RatingList { items },
        Some(Meta::new(page.page, page.per_page, total)),
    ))
}

pub async fn rating_average(
    state: &AppState,
    product_id: Uuid,
) -> AppResult<ApiResponse<RatingAverage>> {
    let (average, count) = rating_stats(state, &[product_id])
        .await?
        .get(&product_id)
        .copied()
        .unwrap_or((0.0, 0));
    Ok(ApiResponse::success(
        "OK",
        RatingAverage { average, count },
        Some(Meta::empty()),
    ))
}

pub fn rating_from_entity(model: crate::entity::product_ratings::Model) -> Rating {
    Rating {
        id: model.id,
        rating: model.rating,
        comment: model.comment,
        approved: model.approved,
        created_at: model.created_at.with_timezone(&chrono::Utc),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_bounds() {
        assert!(validate_rating(0).is_err());
        assert!(validate_rating(6).is_err());
        for r in 1..=5 {
            assert!(validate_rating(r).is_ok());
        }
    }
}
