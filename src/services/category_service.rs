use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};

use crate::{
    dto::products::{CategoryList, CategoryMetadataResponse, CategoryWithCount},
    entity::{
        categories::{Column as CategoryCol, Entity as Categories},
        category_metadata::{Column as FacetCol, Entity as CategoryMetadata},
        metadata_values::{Column as ValueCol, Entity as MetadataValues},
    },
    error::{AppError, AppResult},
    models::{Category, Facet, MetadataValue},
    response::{ApiResponse, Meta},
    state::AppState,
};

#[derive(sqlx::FromRow)]
struct ProductCountRow {
    id: uuid::Uuid,
    product_count: i64,
}

pub async fn list_categories(state: &AppState) -> AppResult<ApiResponse<CategoryList>> {
    let categories = Categories::find()
        .order_by_desc(CategoryCol::CreatedAt)
        .all(&state.orm)
        .await?;

    let counts: std::collections::HashMap<uuid::Uuid, i64> =
        sqlx::query_as::<_, ProductCountRow>(
            r#"
            SELECT c.id, COUNT(p.id) AS product_count
            FROM categories c
            LEFT JOIN products p ON p.category_id = c.id
            GROUP BY c.id
            "#,
        )
        .fetch_all(&state.pool)
        .await?
        .into_iter()
        .map(|r| (r.id, r.product_count))
        .collect();

    let items = categories
        .into_iter()
        .map(|c| CategoryWithCount {
            product_count: counts.get(&c.id).copied().unwrap_or(0),
            category: c.into(),
        })
        .collect();

    Ok(ApiResponse::success("OK", CategoryList { items }, Some(Meta::empty())))
}

/// Facets of a category with their values, in id order.
pub async fn facets_for_category(
    state: &AppState,
    category_id: uuid::Uuid,
) -> AppResult<Vec<Facet>> {
    let facets = CategoryMetadata::find()
        .filter(FacetCol::CategoryId.eq(category_id))
        .order_by_asc(FacetCol::Id)
        .all(&state.orm)
        .await?;
    if facets.is_empty() {
        return Ok(Vec::new());
    }

    let values = MetadataValues::find()
        .filter(ValueCol::CategoryMetadataId.is_in(facets.iter().map(|f| f.id.clone())))
        .order_by_asc(ValueCol::Id)
        .all(&state.orm)
        .await?;

    Ok(facets
        .into_iter()
        .map(|facet| {
            let facet_values = values
                .iter()
                .filter(|v| v.category_metadata_id == facet.id)
                .cloned()
                .map(MetadataValue::from)
                .collect();
            Facet::new(facet, facet_values)
        })
        .collect())
}

pub async fn category_metadata(
    state: &AppState,
    slug: &str,
) -> AppResult<ApiResponse<CategoryMetadataResponse>> {
    let category = Categories::find()
        .filter(CategoryCol::Slug.eq(slug))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let metadata = facets_for_category(state, category.id).await?;

    Ok(ApiResponse::success(
        "OK",
        CategoryMetadataResponse {
            category: Category::from(category),
            metadata,
        },
        Some(Meta::empty()),
    ))
}
