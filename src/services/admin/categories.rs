use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter,
    Set,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::admin::{
        CreateCategoryRequest, CreateFacetRequest, CreateFacetValueRequest, FacetSummary,
        FacetValue, UpdateCategoryRequest, UpdateFacetRequest, UpdateFacetValueRequest,
    },
    entity::{
        categories::{ActiveModel as CategoryActive, Column as CategoryCol, Entity as Categories},
        category_metadata::{self, ActiveModel as FacetActive, Entity as CategoryMetadata},
        metadata_values::{self, ActiveModel as ValueActive, Entity as MetadataValues},
        products::{Column as ProdCol, Entity as Products},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Category, MetadataValue},
    response::{ApiResponse, Meta},
    services::admin::blank_to_none,
    state::AppState,
    validation,
};

/// Lowercase ASCII letters, digits, `-` and `_`.
pub fn validate_key(field: &str, value: &str) -> AppResult<()> {
    let valid = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_');
    if !valid {
        return Err(AppError::BadRequest(format!(
            "{field} may only contain lowercase letters, digits, '-' and '_'"
        )));
    }
    Ok(())
}

async fn ensure_slug_free(state: &AppState, slug: &str, except: Option<Uuid>) -> AppResult<()> {
    let mut finder = Categories::find().filter(CategoryCol::Slug.eq(slug));
    if let Some(id) = except {
        finder = finder.filter(CategoryCol::Id.ne(id));
    }
    if finder.count(&state.orm).await? > 0 {
        return Err(AppError::BadRequest("Slug already in use".into()));
    }
    Ok(())
}

pub async fn create_category(
    state: &AppState,
    user: &AuthUser,
    payload: CreateCategoryRequest,
) -> AppResult<ApiResponse<Category>> {
    ensure_admin(user)?;
    validation::min_len("Name", &payload.name, 2)?;
    let slug = payload.slug.trim();
    validate_key("Slug", slug)?;
    ensure_slug_free(state, slug, None).await?;

    let category = CategoryActive {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name.trim().to_string()),
        name_en: Set(blank_to_none(payload.name_en)),
        slug: Set(slug.to_string()),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.orm,
        user.user_id,
        "category_create",
        "categories",
        serde_json::json!({ "category_id": category.id, "slug": category.slug }),
    )
    .await;

    Ok(ApiResponse::success(
        "Category created",
        category.into(),
        Some(Meta::empty()),
    ))
}

pub async fn update_category(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateCategoryRequest,
) -> AppResult<ApiResponse<Category>> {
    ensure_admin(user)?;
    let existing = Categories::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    let mut active: CategoryActive = existing.into();

    if let Some(name) = payload.name {
        validation::min_len("Name", &name, 2)?;
        active.name = Set(name.trim().to_string());
    }
    if payload.name_en.is_some() {
        active.name_en = Set(blank_to_none(payload.name_en));
    }
    if let Some(slug) = payload.slug {
        let slug = slug.trim();
        validate_key("Slug", slug)?;
        ensure_slug_free(state, slug, Some(id)).await?;
        active.slug = Set(slug.to_string());
    }
    active.updated_at = Set(Utc::now().into());
    let category = active.update(&state.orm).await?;

    audit::record(
        &state.orm,
        user.user_id,
        "category_update",
        "categories",
        serde_json::json!({ "category_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Category updated",
        category.into(),
        Some(Meta::empty()),
    ))
}

pub async fn delete_category(state: &AppState, user: &AuthUser, id: Uuid) -> AppResult<()> {
    ensure_admin(user)?;
    Categories::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let products = Products::find()
        .filter(ProdCol::CategoryId.eq(id))
        .count(&state.orm)
        .await?;
    if products > 0 {
        return Err(AppError::BadRequest(
            "Category still has products".into(),
        ));
    }

    Categories::delete_by_id(id).exec(&state.orm).await?;

    audit::record(
        &state.orm,
        user.user_id,
        "category_delete",
        "categories",
        serde_json::json!({ "category_id": id }),
    )
    .await;
    Ok(())
}

fn facet_summary(model: category_metadata::Model) -> FacetSummary {
    FacetSummary {
        id: model.id,
        category_id: model.category_id,
        name: model.name,
        name_en: model.name_en,
    }
}

fn facet_value(model: metadata_values::Model) -> FacetValue {
    FacetValue {
        category_metadata_id: model.category_metadata_id.clone(),
        value: MetadataValue::from(model),
    }
}

pub async fn create_facet(
    state: &AppState,
    user: &AuthUser,
    category_id: Uuid,
    payload: CreateFacetRequest,
) -> AppResult<ApiResponse<FacetSummary>> {
    ensure_admin(user)?;
    let id = payload.id.trim();
    validate_key("Id", id)?;
    validation::min_len("Name", &payload.name, 1)?;

    Categories::find_by_id(category_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    if CategoryMetadata::find_by_id(id.to_string())
        .one(&state.orm)
        .await?
        .is_some()
    {
        return Err(AppError::BadRequest("Metadata id already in use".into()));
    }

    let facet = FacetActive {
        id: Set(id.to_string()),
        category_id: Set(category_id),
        name: Set(payload.name.trim().to_string()),
        name_en: Set(blank_to_none(payload.name_en)),
    }
    .insert(&state.orm)
    .await?;

    Ok(ApiResponse::success(
        "Metadata created",
        facet_summary(facet),
        Some(Meta::empty()),
    ))
}

pub async fn update_facet(
    state: &AppState,
    user: &AuthUser,
    id: &str,
    payload: UpdateFacetRequest,
) -> AppResult<ApiResponse<FacetSummary>> {
    ensure_admin(user)?;
    let existing = CategoryMetadata::find_by_id(id.to_string())
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    let mut active: FacetActive = existing.into();

    if let Some(name) = payload.name {
        validation::min_len("Name", &name, 1)?;
        active.name = Set(name.trim().to_string());
    }
    if payload.name_en.is_some() {
        active.name_en = Set(blank_to_none(payload.name_en));
    }
    let facet = active.update(&state.orm).await?;

    Ok(ApiResponse::success(
        "Metadata updated",
        facet_summary(facet),
        Some(Meta::empty()),
    ))
}

pub async fn delete_facet(state: &AppState, user: &AuthUser, id: &str) -> AppResult<()> {
    ensure_admin(user)?;
    let result = CategoryMetadata::delete_by_id(id.to_string())
        .exec(&state.orm)
        .await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.orm,
        user.user_id,
        "category_metadata_delete",
        "category_metadata",
        serde_json::json!({ "category_metadata_id": id }),
    )
    .await;
    Ok(())
}

pub async fn create_facet_value(
    state: &AppState,
    user: &AuthUser,
    facet_id: &str,
    payload: CreateFacetValueRequest,
) -> AppResult<ApiResponse<FacetValue>> {
    ensure_admin(user)?;
    let id = payload.id.trim();
    validate_key("Id", id)?;
    validation::min_len("Label", &payload.label, 1)?;

    CategoryMetadata::find_by_id(facet_id.to_string())
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    if MetadataValues::find_by_id(id.to_string())
        .one(&state.orm)
        .await?
        .is_some()
    {
        return Err(AppError::BadRequest("Metadata value id already in use".into()));
    }

    let value = ValueActive {
        id: Set(id.to_string()),
        category_metadata_id: Set(facet_id.to_string()),
        label: Set(payload.label.trim().to_string()),
        label_en: Set(blank_to_none(payload.label_en)),
    }
    .insert(&state.orm)
    .await?;

    Ok(ApiResponse::success(
        "Metadata value created",
        facet_value(value),
        Some(Meta::empty()),
    ))
}

pub async fn update_facet_value(
    state: &AppState,
    user: &AuthUser,
    id: &str,
    payload: UpdateFacetValueRequest,
) -> AppResult<ApiResponse<FacetValue>> {
    ensure_admin(user)?;
    let existing = MetadataValues::find_by_id(id.to_string())
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    let mut active: ValueActive = existing.into();

    if let Some(label) = payload.label {
        validation::min_len("Label", &label, 1)?;
        active.label = Set(label.trim().to_string());
    }
    if payload.label_en.is_some() {
        active.label_en = Set(blank_to_none(payload.label_en));
    }
    let value = active.update(&state.orm).await?;

    Ok(ApiResponse::success(
        "Metadata value updated",
        facet_value(value),
        Some(Meta::empty()),
    ))
}

pub async fn delete_facet_value(state: &AppState, user: &AuthUser, id: &str) -> AppResult<()> {
    ensure_admin(user)?;
    let result = MetadataValues::delete_by_id(id.to_string())
        .exec(&state.orm)
        .await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_lowercase_identifiers() {
        assert!(validate_key("Slug", "camisas").is_ok());
        assert!(validate_key("Slug", "t-shirts_2").is_ok());
        assert!(validate_key("Slug", "").is_err());
        assert!(validate_key("Slug", "Camisas").is_err());
        assert!(validate_key("Slug", "with space").is_err());
    }
}
