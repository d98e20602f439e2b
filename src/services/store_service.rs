use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};

use crate::{
    db::OrmConn,
    dto::store::BannerList,
    entity::{
        banners::{Column as BannerCol, Entity as Banners},
        store_benefits::{Column as BenefitCol, Entity as StoreBenefits},
        stores::{self, Column as StoreCol, Entity as Stores},
    },
    error::AppResult,
    models::{Banner, Store, StoreBenefit},
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn list_banners(state: &AppState) -> AppResult<ApiResponse<BannerList>> {
    let items = Banners::find()
        .order_by_asc(BannerCol::SortOrder)
        .order_by_asc(BannerCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Banner::from)
        .collect();
    Ok(ApiResponse::success("OK", BannerList { items }, Some(Meta::empty())))
}

/// The single store row, oldest first if more than one exists.
pub async fn current_store(orm: &OrmConn) -> AppResult<Option<stores::Model>> {
    Ok(Stores::find()
        .order_by_asc(StoreCol::CreatedAt)
        .one(orm)
        .await?)
}

pub async fn store_with_benefits(orm: &OrmConn, store: stores::Model) -> AppResult<Store> {
    let benefits = StoreBenefits::find()
        .filter(BenefitCol::StoreId.eq(store.id))
        .order_by_asc(BenefitCol::SortOrder)
        .all(orm)
        .await?
        .into_iter()
        .map(StoreBenefit::from)
        .collect();
    Ok(Store::new(store, benefits))
}

pub async fn get_store(state: &AppState) -> AppResult<ApiResponse<Option<Store>>> {
    let store = match current_store(&state.orm).await? {
        Some(store) => Some(store_with_benefits(&state.orm, store).await?),
        None => None,
    };
    Ok(ApiResponse::success("OK", store, Some(Meta::empty())))
}
