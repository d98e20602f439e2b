use std::collections::HashSet;

use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter,
    Set, TransactionTrait, sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::admin::{
        AdminBannerList, BannerPosition, CreateBannerRequest, ReorderBannersRequest,
        UpdateBannerRequest,
    },
    entity::banners::{ActiveModel as BannerActive, Column as BannerCol, Entity as Banners},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::Banner,
    response::{ApiResponse, Meta},
    services::store_service,
    state::AppState,
};

fn required(field: &str, value: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::BadRequest(format!("{field} is required")));
    }
    Ok(())
}

pub async fn list_banners(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<AdminBannerList>> {
    ensure_admin(user)?;
    let items = store_service::list_banners(state).await?.data.map(|list| list.items);
    Ok(ApiResponse::success(
        "Banners",
        AdminBannerList {
            items: items.unwrap_or_default(),
        },
        Some(Meta::empty()),
    ))
}

pub async fn get_banner(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Banner>> {
    ensure_admin(user)?;
    let banner = Banners::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("Banner", banner.into(), Some(Meta::empty())))
}

pub async fn create_banner(
    state: &AppState,
    user: &AuthUser,
    payload: CreateBannerRequest,
) -> AppResult<ApiResponse<Banner>> {
    ensure_admin(user)?;
    required("Image", &payload.img)?;
    required("Link", &payload.link)?;

    let banner = BannerActive {
        id: Set(Uuid::new_v4()),
        img: Set(payload.img.trim().to_string()),
        link: Set(payload.link.trim().to_string()),
        sort_order: Set(payload.order.unwrap_or(0)),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.orm,
        user.user_id,
        "banner_create",
        "banners",
        serde_json::json!({ "banner_id": banner.id }),
    )
    .await;

    Ok(ApiResponse::success("Banner created", banner.into(), Some(Meta::empty())))
}

pub async fn update_banner(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateBannerRequest,
) -> AppResult<ApiResponse<Banner>> {
    ensure_admin(user)?;
    let existing = Banners::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    let mut active: BannerActive = existing.into();

    if let Some(img) = payload.img {
        required("Image", &img)?;
        active.img = Set(img.trim().to_string());
    }
    if let Some(link) = payload.link {
        required("Link", &link)?;
        active.link = Set(link.trim().to_string());
    }
    if let Some(order) = payload.order {
        active.sort_order = Set(order);
    }
    let banner = active.update(&state.orm).await?;

    audit::record(
        &state.orm,
        user.user_id,
        "banner_update",
        "banners",
        serde_json::json!({ "banner_id": banner.id }),
    )
    .await;

    Ok(ApiResponse::success("Banner updated", banner.into(), Some(Meta::empty())))
}

pub async fn delete_banner(state: &AppState, user: &AuthUser, id: Uuid) -> AppResult<()> {
    ensure_admin(user)?;
    let result = Banners::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.orm,
        user.user_id,
        "banner_delete",
        "banners",
        serde_json::json!({ "banner_id": id }),
    )
    .await;
    Ok(())
}

fn validate_positions(positions: &[BannerPosition]) -> AppResult<()> {
    if positions.is_empty() {
        return Err(AppError::BadRequest("Banners list cannot be empty".into()));
    }
    let mut seen = HashSet::new();
    if !positions.iter().all(|p| seen.insert(p.id)) {
        return Err(AppError::BadRequest("Duplicate banner id".into()));
    }
    Ok(())
}

/// Apply every position in one transaction; nothing changes if any id is unknown.
pub async fn reorder_banners(
    state: &AppState,
    user: &AuthUser,
    payload: ReorderBannersRequest,
) -> AppResult<ApiResponse<AdminBannerList>> {
    ensure_admin(user)?;
    validate_positions(&payload.banners)?;

    let txn = state.orm.begin().await?;
    let known = Banners::find()
        .filter(BannerCol::Id.is_in(payload.banners.iter().map(|p| p.id)))
        .count(&txn)
        .await?;
    if known as usize != payload.banners.len() {
        return Err(AppError::NotFound);
    }

    for position in &payload.banners {
        Banners::update_many()
            .col_expr(BannerCol::SortOrder, Expr::value(position.order))
            .filter(BannerCol::Id.eq(position.id))
            .exec(&txn)
            .await?;
    }
    txn.commit().await?;

    audit::record(
        &state.orm,
        user.user_id,
        "banner_reorder",
        "banners",
        serde_json::json!({ "count": payload.banners.len() }),
    )
    .await;

    list_banners(state, user).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reorder_rejects_empty_and_duplicates() {
        assert!(validate_positions(&[]).is_err());
        let id = Uuid::new_v4();
        let dup = [
            BannerPosition { id, order: 0 },
            BannerPosition { id, order: 1 },
        ];
        assert!(validate_positions(&dup).is_err());
        let ok = [
            BannerPosition { id, order: 1 },
            BannerPosition { id: Uuid::new_v4(), order: 0 },
        ];
        assert!(validate_positions(&ok).is_ok());
    }
}
