use std::collections::{HashMap, HashSet};

use sea_orm::{
    ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
    sea_query::{Expr, Query},
};
use uuid::Uuid;

use crate::{
    dto::products::{ProductList, ProductWithCategory},
    entity::{
        categories::{Column as CategoryCol, Entity as Categories},
        favorites::{Column as FavCol, Entity as Favorites},
        product_images::{Column as ImageCol, Entity as ProductImages},
        product_metadata::{Column as PmCol, Entity as ProductMetadata},
        products::{self, Column as ProdCol, Entity as Products},
    },
    error::{AppError, AppResult},
    media::product_image_url,
    models::{Category, ProductDetail, ProductListItem, ProductSummary, round_rating},
    response::{ApiResponse, Meta},
    routes::params::{ProductOrder, ProductQuery},
    state::AppState,
};

pub const DEFAULT_RELATED_LIMIT: u64 = 4;

/// Parse the `metadata` query value: `{"<facet>": "v1|v2", ...}`.
///
/// Facets whose value is not a string, or lists no values, are dropped.
pub fn parse_metadata_filter(raw: &str) -> AppResult<Vec<(String, Vec<String>)>> {
    let parsed: HashMap<String, serde_json::Value> = serde_json::from_str(raw)
        .map_err(|_| AppError::BadRequest("Invalid metadata filter".into()))?;

    let mut filters: Vec<(String, Vec<String>)> = parsed
        .into_iter()
        .filter_map(|(facet, value)| {
            let value = value.as_str()?;
            let values: Vec<String> = value
                .split('|')
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .collect();
            (!values.is_empty()).then_some((facet, values))
        })
        .collect();
    filters.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(filters)
}

/// First image of each product, as absolute URLs.
pub async fn first_images(state: &AppState, ids: &[Uuid]) -> AppResult<HashMap<Uuid, String>> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let images = ProductImages::find()
        .filter(ImageCol::ProductId.is_in(ids.iter().copied()))
        .order_by_asc(ImageCol::CreatedAt)
        .order_by_asc(ImageCol::Id)
        .all(&state.orm)
        .await?;

    let mut map = HashMap::new();
    for image in images {
        map.entry(image.product_id)
            .or_insert_with(|| product_image_url(&state.config.base_url, &image.url));
    }
    Ok(map)
}

pub async fn liked_products(
    state: &AppState,
    user_id: Option<Uuid>,
    ids: &[Uuid],
) -> AppResult<HashSet<Uuid>> {
    let Some(user_id) = user_id else {
        return Ok(HashSet::new());
    };
    if ids.is_empty() {
        return Ok(HashSet::new());
    }
    let rows = Favorites::find()
        .filter(FavCol::UserId.eq(user_id))
        .filter(FavCol::ProductId.is_in(ids.iter().copied()))
        .all(&state.orm)
        .await?;
    Ok(rows.into_iter().map(|f| f.product_id).collect())
}

#[derive(sqlx::FromRow)]
struct RatingStatsRow {
    product_id: Uuid,
    average: Option<f64>,
    count: i64,
}

/// Average (one decimal) and count of approved ratings per product.
pub async fn rating_stats(state: &AppState, ids: &[Uuid]) -> AppResult<HashMap<Uuid, (f64, i64)>> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows = sqlx::query_as::<_, RatingStatsRow>(
        r#"
        SELECT product_id, AVG(rating)::float8 AS average, COUNT(*) AS count
        FROM product_ratings
        WHERE approved = TRUE AND product_id = ANY($1)
        GROUP BY product_id
        "#,
    )
    .bind(ids.to_vec())
    .fetch_all(&state.pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|r| {
            (
                r.product_id,
                (round_rating(r.average.unwrap_or(0.0)), r.count),
            )
        })
        .collect())
}

/// Build catalog cards for `products`, preserving their order.
pub async fn summaries(
    state: &AppState,
    products: Vec<products::Model>,
) -> AppResult<Vec<ProductSummary>> {
    let ids: Vec<Uuid> = products.iter().map(|p| p.id).collect();
    let mut images = first_images(state, &ids).await?;
    Ok(products
        .into_iter()
        .map(|p| ProductSummary {
            image: images.remove(&p.id),
            id: p.id,
            label: p.label,
            label_en: p.label_en,
            price: p.price,
        })
        .collect())
}

async fn list_items(
    state: &AppState,
    user_id: Option<Uuid>,
    products: Vec<products::Model>,
) -> AppResult<Vec<ProductListItem>> {
    let ids: Vec<Uuid> = products.iter().map(|p| p.id).collect();
    let liked = liked_products(state, user_id, &ids).await?;
    let ratings = rating_stats(state, &ids).await?;

    Ok(summaries(state, products)
        .await?
        .into_iter()
        .map(|product| {
            let (rating_average, rating_count) =
                ratings.get(&product.id).copied().unwrap_or((0.0, 0));
            ProductListItem {
                liked: liked.contains(&product.id),
                rating_average,
                rating_count,
                product,
            }
        })
        .collect())
}

pub async fn list_products(
    state: &AppState,
    user_id: Option<Uuid>,
    query: ProductQuery,
) -> AppResult<ApiResponse<ProductList>> {
    let mut condition = Condition::all();

    if let Some(raw) = query.metadata.as_deref().filter(|s| !s.trim().is_empty()) {
        for (facet, values) in parse_metadata_filter(raw)? {
            let matching = Query::select()
                .column(PmCol::ProductId)
                .from(ProductMetadata)
                .and_where(PmCol::CategoryMetadataId.eq(facet))
                .and_where(PmCol::MetadataValueId.is_in(values))
                .to_owned();
            condition = condition.add(ProdCol::Id.in_subquery(matching));
        }
    }

    if let Some(slug) = query.category.as_deref().filter(|s| !s.is_empty()) {
        let category = Query::select()
            .column(CategoryCol::Id)
            .from(Categories)
            .and_where(CategoryCol::Slug.eq(slug))
            .to_owned();
        condition = condition.add(ProdCol::CategoryId.in_subquery(category));
    }

    let mut finder = Products::find().filter(condition);
    finder = match query.order_by.unwrap_or_default() {
        ProductOrder::Views => finder.order_by_desc(ProdCol::ViewsCount),
        ProductOrder::Selling => finder.order_by_desc(ProdCol::SalesCount),
        ProductOrder::Price => finder.order_by_asc(ProdCol::Price),
    };
    finder = finder.order_by_asc(ProdCol::Id);
    if let Some(limit) = query.limit {
        finder = finder.limit(limit);
    }

    let products = finder.all(&state.orm).await?;
    let items = list_items(state, user_id, products).await?;

    Ok(ApiResponse::success("OK", ProductList { items }, Some(Meta::empty())))
}

pub async fn get_product(
    state: &AppState,
    user_id: Option<Uuid>,
    id: Uuid,
) -> AppResult<ApiResponse<ProductWithCategory>> {
    let product = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let images = ProductImages::find()
        .filter(ImageCol::ProductId.eq(id))
        .order_by_asc(ImageCol::CreatedAt)
        .order_by_asc(ImageCol::Id)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|image| product_image_url(&state.config.base_url, &image.url))
        .collect();

    let liked = liked_products(state, user_id, &[id]).await?.contains(&id);
    let (rating_average, rating_count) = rating_stats(state, &[id])
        .await?
        .get(&id)
        .copied()
        .unwrap_or((0.0, 0));

    let category = Categories::find_by_id(product.category_id)
        .one(&state.orm)
        .await?
        .map(Category::from);

    Products::update_many()
        .col_expr(ProdCol::ViewsCount, Expr::col(ProdCol::ViewsCount).add(1))
        .filter(ProdCol::Id.eq(id))
        .exec(&state.orm)
        .await?;

    let detail = ProductDetail {
        id: product.id,
        label: product.label,
        label_en: product.label_en,
        price: product.price,
        description: product.description,
        description_en: product.description_en,
        category_id: product.category_id,
        images,
        liked,
        rating_average,
        rating_count,
    };

    Ok(ApiResponse::success(
        "OK",
        ProductWithCategory {
            product: detail,
            category,
        },
        Some(Meta::empty()),
    ))
}

pub async fn related_products(
    state: &AppState,
    user_id: Option<Uuid>,
    id: Uuid,
    limit: Option<u64>,
) -> AppResult<ApiResponse<ProductList>> {
    let product = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let products = Products::find()
        .filter(ProdCol::CategoryId.eq(product.category_id))
        .filter(ProdCol::Id.ne(id))
        .order_by_desc(ProdCol::ViewsCount)
        .order_by_asc(ProdCol::Id)
        .limit(limit.unwrap_or(DEFAULT_RELATED_LIMIT))
        .all(&state.orm)
        .await?;
    let items = list_items(state, user_id, products).await?;

    Ok(ApiResponse::success("OK", ProductList { items }, Some(Meta::empty())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_filter_splits_values() {
        let filters = parse_metadata_filter(r#"{"tech":"react|node","size":" m | "}"#).unwrap();
        assert_eq!(
            filters,
            vec![
                ("size".to_string(), vec!["m".to_string()]),
                (
                    "tech".to_string(),
                    vec!["react".to_string(), "node".to_string()]
                ),
            ]
        );
    }

    #[test]
    fn metadata_filter_drops_empty_and_non_string_values() {
        let filters = parse_metadata_filter(r#"{"tech":"","color":3,"size":"|"}"#).unwrap();
        assert!(filters.is_empty());
    }

    #[test]
    fn malformed_metadata_is_bad_request() {
        assert!(matches!(
            parse_metadata_filter("{not json"),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            parse_metadata_filter(r#"["tech"]"#),
            Err(AppError::BadRequest(_))
        ));
    }
}
