use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue::NotSet, EntityTrait, Set};
use uuid::Uuid;

use crate::{
    audit,
    dto::admin::{CreateBenefitRequest, UpdateBenefitRequest, UpsertStoreRequest},
    entity::{
        store_benefits::{ActiveModel as BenefitActive, Entity as StoreBenefits},
        stores::ActiveModel as StoreActive,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Store, StoreBenefit},
    response::{ApiResponse, Meta},
    services::{
        admin::blank_to_none,
        store_service::{current_store, store_with_benefits},
    },
    state::AppState,
};

fn required(field: &str, value: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::BadRequest(format!("{field} is required")));
    }
    Ok(())
}

/// Update the store row, creating it when none exists yet.
pub async fn upsert_store(
    state: &AppState,
    user: &AuthUser,
    payload: UpsertStoreRequest,
) -> AppResult<ApiResponse<Store>> {
    ensure_admin(user)?;

    let store = match current_store(&state.orm).await? {
        Some(existing) => {
            let mut active: StoreActive = existing.into();
            if payload.topbar_text.is_some() {
                active.topbar_text = Set(blank_to_none(payload.topbar_text));
            }
            if payload.topbar_text_en.is_some() {
                active.topbar_text_en = Set(blank_to_none(payload.topbar_text_en));
            }
            if payload.instagram.is_some() {
                active.instagram = Set(blank_to_none(payload.instagram));
            }
            if payload.facebook.is_some() {
                active.facebook = Set(blank_to_none(payload.facebook));
            }
            if payload.email.is_some() {
                active.email = Set(blank_to_none(payload.email));
            }
            if payload.whatsapp.is_some() {
                active.whatsapp = Set(blank_to_none(payload.whatsapp));
            }
            if payload.copyright.is_some() {
                active.copyright = Set(blank_to_none(payload.copyright));
            }
            if payload.copyright_en.is_some() {
                active.copyright_en = Set(blank_to_none(payload.copyright_en));
            }
            active.updated_at = Set(Utc::now().into());
            active.update(&state.orm).await?
        }
        None => {
            StoreActive {
                id: Set(Uuid::new_v4()),
                topbar_text: Set(blank_to_none(payload.topbar_text)),
                topbar_text_en: Set(blank_to_none(payload.topbar_text_en)),
                instagram: Set(blank_to_none(payload.instagram)),
                facebook: Set(blank_to_none(payload.facebook)),
                email: Set(blank_to_none(payload.email)),
                whatsapp: Set(blank_to_none(payload.whatsapp)),
                copyright: Set(blank_to_none(payload.copyright)),
                copyright_en: Set(blank_to_none(payload.copyright_en)),
                created_at: NotSet,
                updated_at: NotSet,
            }
            .insert(&state.orm)
            .await?
        }
    };

    audit::record(
        &state.orm,
        user.user_id,
        "store_update",
        "stores",
        serde_json::json!({ "store_id": store.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Store updated",
        store_with_benefits(&state.orm, store).await?,
        Some(Meta::empty()),
    ))
}

pub async fn create_benefit(
    state: &AppState,
    user: &AuthUser,
    payload: CreateBenefitRequest,
) -> AppResult<ApiResponse<StoreBenefit>> {
    ensure_admin(user)?;
    required("Icon name", &payload.icon_name)?;
    required("Title", &payload.title)?;
    required("Description", &payload.description)?;

    let store = current_store(&state.orm).await?.ok_or_else(|| {
        AppError::BadRequest("Store not found. Please create store info first.".into())
    })?;

    let benefit = BenefitActive {
        id: Set(Uuid::new_v4()),
        store_id: Set(store.id),
        icon_name: Set(payload.icon_name.trim().to_string()),
        title: Set(payload.title.trim().to_string()),
        title_en: Set(blank_to_none(payload.title_en)),
        description: Set(payload.description.trim().to_string()),
        description_en: Set(blank_to_none(payload.description_en)),
        sort_order: Set(payload.order.unwrap_or(0)),
    }
    .insert(&state.orm)
    .await?;

    Ok(ApiResponse::success(
        "Benefit created",
        benefit.into(),
        Some(Meta::empty()),
    ))
}

pub async fn update_benefit(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateBenefitRequest,
) -> AppResult<ApiResponse<StoreBenefit>> {
    ensure_admin(user)?;
    let existing = StoreBenefits::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    let mut active: BenefitActive = existing.into();

    if let Some(icon_name) = payload.icon_name {
        required("Icon name", &icon_name)?;
        active.icon_name = Set(icon_name.trim().to_string());
    }
    if let Some(title) = payload.title {
        required("Title", &title)?;
        active.title = Set(title.trim().to_string());
    }
    if payload.title_en.is_some() {
        active.title_en = Set(blank_to_none(payload.title_en));
    }
    if let Some(description) = payload.description {
        required("Description", &description)?;
        active.description = Set(description.trim().to_string());
    }
    if payload.description_en.is_some() {
        active.description_en = Set(blank_to_none(payload.description_en));
    }
    if let Some(order) = payload.order {
        active.sort_order = Set(order);
    }
    let benefit = active.update(&state.orm).await?;

    Ok(ApiResponse::success(
        "Benefit updated",
        benefit.into(),
        Some(Meta::empty()),
    ))
}

pub async fn delete_benefit(state: &AppState, user: &AuthUser, id: Uuid) -> AppResult<()> {
    ensure_admin(user)?;
    let result = StoreBenefits::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }
    Ok(())
}
