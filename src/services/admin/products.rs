use std::collections::{HashMap, HashSet};

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, Condition, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
    sea_query::{Expr, Func},
};
use uuid::Uuid;

use crate::{
    audit,
    dto::admin::{
        AddImageRequest, AddVariantRequest, AdminProduct, AdminProductDetail, AdminProductList,
        AdminProductRow, CreateProductRequest, MetadataAssignment, ProductImage, ProductStat,
        ProductStats, SetMetadataRequest, UpdateProductRequest, UpdateVariantRequest,
    },
    entity::{
        categories::{Column as CategoryCol, Entity as Categories},
        category_metadata::{Column as FacetCol, Entity as CategoryMetadata},
        favorites::{Column as FavCol, Entity as Favorites},
        metadata_values::{Column as ValueCol, Entity as MetadataValues},
        order_items::{Column as OrderItemCol, Entity as OrderItems},
        product_images::{ActiveModel as ImageActive, Column as ImageCol, Entity as ProductImages},
        product_metadata::{
            ActiveModel as ProductMetadataActive, Column as PmCol, Entity as ProductMetadata,
        },
        product_variants::{
            ActiveModel as VariantActive, Column as VariantCol, Entity as ProductVariants,
        },
        products::{self, ActiveModel as ProductActive, Column as ProdCol, Entity as Products},
    },
    error::{AppError, AppResult},
    media::product_image_url,
    middleware::auth::{AuthUser, ensure_admin},
    models::{Category, ProductSummary, Variant},
    response::{ApiResponse, Meta},
    routes::params::{AdminProductQuery, DEFAULT_PER_PAGE, normalize},
    services::{
        admin::{blank_to_none, contains_pattern},
        product_service::{first_images, summaries},
    },
    state::AppState,
};

const STATS_LIMIT: u64 = 10;

#[derive(sqlx::FromRow)]
struct CountRow {
    product_id: Uuid,
    count: i64,
}

pub(crate) async fn favorite_counts(
    state: &AppState,
    ids: &[Uuid],
) -> AppResult<HashMap<Uuid, i64>> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows = sqlx::query_as::<_, CountRow>(
        r#"
        SELECT product_id, COUNT(*) AS count
        FROM favorites
        WHERE product_id = ANY($1)
        GROUP BY product_id
        "#,
    )
    .bind(ids.to_vec())
    .fetch_all(&state.pool)
    .await?;
    Ok(rows.into_iter().map(|r| (r.product_id, r.count)).collect())
}

/// Load products by id, keeping the order of `ids`.
pub(crate) async fn products_in_order(
    state: &AppState,
    ids: &[Uuid],
) -> AppResult<Vec<products::Model>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let mut by_id: HashMap<Uuid, products::Model> = Products::find()
        .filter(ProdCol::Id.is_in(ids.iter().copied()))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();
    Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
}

pub(crate) async fn product_stats(
    state: &AppState,
    products: Vec<products::Model>,
) -> AppResult<Vec<ProductStat>> {
    let ids: Vec<Uuid> = products.iter().map(|p| p.id).collect();
    let favorites = favorite_counts(state, &ids).await?;
    let counters: Vec<(i64, i64)> = products
        .iter()
        .map(|p| (p.views_count, p.sales_count))
        .collect();

    Ok(summaries(state, products)
        .await?
        .into_iter()
        .zip(counters)
        .map(|(product, (views_count, sales_count))| ProductStat {
            favorites_count: favorites.get(&product.id).copied().unwrap_or(0),
            views_count,
            sales_count,
            product,
        })
        .collect())
}

pub(crate) async fn most_viewed(state: &AppState, limit: u64) -> AppResult<Vec<ProductStat>> {
    let products = Products::find()
        .order_by_desc(ProdCol::ViewsCount)
        .order_by_asc(ProdCol::Id)
        .limit(limit)
        .all(&state.orm)
        .await?;
    product_stats(state, products).await
}

pub(crate) async fn most_sold(state: &AppState, limit: u64) -> AppResult<Vec<ProductStat>> {
    let products = Products::find()
        .order_by_desc(ProdCol::SalesCount)
        .order_by_asc(ProdCol::Id)
        .limit(limit)
        .all(&state.orm)
        .await?;
    product_stats(state, products).await
}

pub(crate) async fn most_favorited(state: &AppState, limit: u64) -> AppResult<Vec<ProductStat>> {
    let ids: Vec<Uuid> = sqlx::query_scalar(
        r#"
        SELECT product_id
        FROM favorites
        GROUP BY product_id
        ORDER BY COUNT(*) DESC, product_id
        LIMIT $1
        "#,
    )
    .bind(limit as i64)
    .fetch_all(&state.pool)
    .await?;

    let products = products_in_order(state, &ids).await?;
    product_stats(state, products).await
}

fn admin_product(model: products::Model) -> AdminProduct {
    AdminProduct {
        id: model.id,
        label: model.label,
        label_en: model.label_en,
        price: model.price,
        description: model.description,
        description_en: model.description_en,
        category_id: model.category_id,
        views_count: model.views_count,
        sales_count: model.sales_count,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

fn validate_price(price: i64) -> AppResult<()> {
    if price <= 0 {
        return Err(AppError::BadRequest("Price must be positive".into()));
    }
    Ok(())
}

fn validate_stock(stock: i32) -> AppResult<()> {
    if stock < 0 {
        return Err(AppError::BadRequest("Stock must be non-negative".into()));
    }
    Ok(())
}

async fn ensure_category(state: &AppState, category_id: Uuid) -> AppResult<()> {
    Categories::find_by_id(category_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::BadRequest("Category not found".into()))?;
    Ok(())
}

async fn find_product(state: &AppState, id: Uuid) -> AppResult<products::Model> {
    Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)
}

fn search_condition(search: &str) -> Condition {
    [
        ProdCol::Label,
        ProdCol::LabelEn,
        ProdCol::Description,
        ProdCol::DescriptionEn,
    ]
    .into_iter()
    .fold(Condition::any(), |cond, col| {
        cond.add(Expr::expr(Func::lower(Expr::col(col))).like(contains_pattern(search)))
    })
}

pub async fn list_products(
    state: &AppState,
    user: &AuthUser,
    query: AdminProductQuery,
) -> AppResult<ApiResponse<AdminProductList>> {
    ensure_admin(user)?;
    let page = normalize(query.page, query.limit, DEFAULT_PER_PAGE);

    let mut condition = Condition::all();
    if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        condition = condition.add(search_condition(search));
    }
    if let Some(category_id) = query.category_id {
        condition = condition.add(ProdCol::CategoryId.eq(category_id));
    }
    if let Some(min) = query.min_price {
        condition = condition.add(ProdCol::Price.gte(min));
    }
    if let Some(max) = query.max_price {
        condition = condition.add(ProdCol::Price.lte(max));
    }

    let finder = Products::find().filter(condition);
    let total = finder.clone().count(&state.orm).await? as i64;
    let products = finder
        .order_by_desc(ProdCol::CreatedAt)
        .order_by_asc(ProdCol::Id)
        .limit(page.per_page as u64)
        .offset(page.offset as u64)
        .all(&state.orm)
        .await?;

    let ids: Vec<Uuid> = products.iter().map(|p| p.id).collect();
    let category_ids: HashSet<Uuid> = products.iter().map(|p| p.category_id).collect();
    let categories: HashMap<Uuid, Category> = Categories::find()
        .filter(CategoryCol::Id.is_in(category_ids))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|c| (c.id, Category::from(c)))
        .collect();
    let mut images = first_images(state, &ids).await?;
    let favorites = favorite_counts(state, &ids).await?;

    let items = products
        .into_iter()
        .map(|p| AdminProductRow {
            category: categories.get(&p.category_id).cloned(),
            image: images.remove(&p.id),
            favorites_count: favorites.get(&p.id).copied().unwrap_or(0),
            id: p.id,
            label: p.label,
            label_en: p.label_en,
            price: p.price,
            views_count: p.views_count,
            sales_count: p.sales_count,
            created_at: p.created_at.with_timezone(&Utc),
        })
        .collect();

    Ok(ApiResponse::success(
        "Products",
        AdminProductList { items },
        Some(Meta::new(page.page, page.per_page, total)),
    ))
}

pub async fn get_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<AdminProductDetail>> {
    ensure_admin(user)?;
    let product = find_product(state, id).await?;

    let category = Categories::find_by_id(product.category_id)
        .one(&state.orm)
        .await?
        .map(Category::from);

    let images = ProductImages::find()
        .filter(ImageCol::ProductId.eq(id))
        .order_by_asc(ImageCol::CreatedAt)
        .order_by_asc(ImageCol::Id)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|image| ProductImage {
            id: image.id,
            url: product_image_url(&state.config.base_url, &image.url),
        })
        .collect();

    let variants = ProductVariants::find()
        .filter(VariantCol::ProductId.eq(id))
        .order_by_asc(VariantCol::Size)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Variant::from)
        .collect();

    let metadata = ProductMetadata::find()
        .filter(PmCol::ProductId.eq(id))
        .order_by_asc(PmCol::CategoryMetadataId)
        .order_by_asc(PmCol::MetadataValueId)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|m| MetadataAssignment {
            category_metadata_id: m.category_metadata_id,
            metadata_value_id: m.metadata_value_id,
        })
        .collect();

    let favorites_count = Favorites::find()
        .filter(FavCol::ProductId.eq(id))
        .count(&state.orm)
        .await? as i64;
    let orders_count: i64 = sqlx::query_scalar(
        "SELECT COUNT(DISTINCT order_id) FROM order_items WHERE product_id = $1",
    )
    .bind(id)
    .fetch_one(&state.pool)
    .await?;

    Ok(ApiResponse::success(
        "Product",
        AdminProductDetail {
            product: admin_product(product),
            category,
            images,
            variants,
            metadata,
            favorites_count,
            orders_count,
        },
        Some(Meta::empty()),
    ))
}

pub async fn create_product(
    state: &AppState,
    user: &AuthUser,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<AdminProduct>> {
    ensure_admin(user)?;
    if payload.label.trim().is_empty() {
        return Err(AppError::BadRequest("Label is required".into()));
    }
    validate_price(payload.price)?;
    ensure_category(state, payload.category_id).await?;

    let product = ProductActive {
        id: Set(Uuid::new_v4()),
        category_id: Set(payload.category_id),
        label: Set(payload.label.trim().to_string()),
        label_en: Set(blank_to_none(payload.label_en)),
        price: Set(payload.price),
        description: Set(blank_to_none(payload.description)),
        description_en: Set(blank_to_none(payload.description_en)),
        views_count: Set(0),
        sales_count: Set(0),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.orm,
        user.user_id,
        "product_create",
        "products",
        serde_json::json!({ "product_id": product.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Product created",
        admin_product(product),
        Some(Meta::empty()),
    ))
}

pub async fn update_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<AdminProduct>> {
    ensure_admin(user)?;
    let existing = find_product(state, id).await?;
    let previous_category = existing.category_id;
    let mut active: ProductActive = existing.into();

    if let Some(label) = payload.label {
        if label.trim().is_empty() {
            return Err(AppError::BadRequest("Label is required".into()));
        }
        active.label = Set(label.trim().to_string());
    }
    if payload.label_en.is_some() {
        active.label_en = Set(blank_to_none(payload.label_en));
    }
    if let Some(price) = payload.price {
        validate_price(price)?;
        active.price = Set(price);
    }
    if payload.description.is_some() {
        active.description = Set(blank_to_none(payload.description));
    }
    if payload.description_en.is_some() {
        active.description_en = Set(blank_to_none(payload.description_en));
    }
    if let Some(category_id) = payload.category_id {
        ensure_category(state, category_id).await?;
        active.category_id = Set(category_id);
    }
    active.updated_at = Set(Utc::now().into());

    // Facet values belong to a category; a move drops the old assignment
    let category_changed = payload
        .category_id
        .is_some_and(|category_id| category_id != previous_category);
    let txn = state.orm.begin().await?;
    let product = active.update(&txn).await?;
    if category_changed {
        ProductMetadata::delete_many()
            .filter(PmCol::ProductId.eq(id))
            .exec(&txn)
            .await?;
    }
    txn.commit().await?;

    audit::record(
        &state.orm,
        user.user_id,
        "product_update",
        "products",
        serde_json::json!({ "product_id": id, "metadata_cleared": category_changed }),
    )
    .await;

    Ok(ApiResponse::success(
        "Product updated",
        admin_product(product),
        Some(Meta::empty()),
    ))
}

pub async fn delete_product(state: &AppState, user: &AuthUser, id: Uuid) -> AppResult<()> {
    ensure_admin(user)?;
    find_product(state, id).await?;

    let ordered = OrderItems::find()
        .filter(OrderItemCol::ProductId.eq(id))
        .count(&state.orm)
        .await?;
    if ordered > 0 {
        return Err(AppError::BadRequest(
            "Product has orders and cannot be deleted".into(),
        ));
    }

    Products::delete_by_id(id).exec(&state.orm).await?;

    audit::record(
        &state.orm,
        user.user_id,
        "product_delete",
        "products",
        serde_json::json!({ "product_id": id }),
    )
    .await;
    Ok(())
}

pub async fn add_image(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
    payload: AddImageRequest,
) -> AppResult<ApiResponse<ProductImage>> {
    ensure_admin(user)?;
    let url = payload.url.trim();
    if url.is_empty() {
        return Err(AppError::BadRequest("Image URL is required".into()));
    }
    find_product(state, product_id).await?;

    let image = ImageActive {
        id: Set(Uuid::new_v4()),
        product_id: Set(product_id),
        url: Set(url.to_string()),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(ApiResponse::success(
        "Image added",
        ProductImage {
            id: image.id,
            url: product_image_url(&state.config.base_url, &image.url),
        },
        Some(Meta::empty()),
    ))
}

pub async fn delete_image(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
    image_id: Uuid,
) -> AppResult<()> {
    ensure_admin(user)?;
    let result = ProductImages::delete_many()
        .filter(ImageCol::Id.eq(image_id))
        .filter(ImageCol::ProductId.eq(product_id))
        .exec(&state.orm)
        .await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }
    Ok(())
}

pub async fn add_variant(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
    payload: AddVariantRequest,
) -> AppResult<ApiResponse<Variant>> {
    ensure_admin(user)?;
    let size = payload.size.trim();
    if size.is_empty() {
        return Err(AppError::BadRequest("Size is required".into()));
    }
    validate_stock(payload.stock)?;
    find_product(state, product_id).await?;

    let taken = ProductVariants::find()
        .filter(VariantCol::ProductId.eq(product_id))
        .filter(VariantCol::Size.eq(size))
        .count(&state.orm)
        .await?;
    if taken > 0 {
        return Err(AppError::BadRequest(
            "Variant with this size already exists".into(),
        ));
    }

    let variant = VariantActive {
        id: Set(Uuid::new_v4()),
        product_id: Set(product_id),
        size: Set(size.to_string()),
        stock: Set(payload.stock),
    }
    .insert(&state.orm)
    .await?;

    Ok(ApiResponse::success(
        "Variant added",
        variant.into(),
        Some(Meta::empty()),
    ))
}

pub async fn update_variant(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
    variant_id: Uuid,
    payload: UpdateVariantRequest,
) -> AppResult<ApiResponse<Variant>> {
    ensure_admin(user)?;
    validate_stock(payload.stock)?;

    let variant = ProductVariants::find_by_id(variant_id)
        .filter(VariantCol::ProductId.eq(product_id))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut active: VariantActive = variant.into();
    active.stock = Set(payload.stock);
    let variant = active.update(&state.orm).await?;

    Ok(ApiResponse::success(
        "Variant updated",
        variant.into(),
        Some(Meta::empty()),
    ))
}

pub async fn delete_variant(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
    variant_id: Uuid,
) -> AppResult<()> {
    ensure_admin(user)?;
    let result = ProductVariants::delete_many()
        .filter(VariantCol::Id.eq(variant_id))
        .filter(VariantCol::ProductId.eq(product_id))
        .exec(&state.orm)
        .await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }
    Ok(())
}

/// Dedupe assignments, keeping first-seen order.
fn unique_assignments(values: Vec<MetadataAssignment>) -> Vec<MetadataAssignment> {
    let mut seen = HashSet::new();
    values
        .into_iter()
        .filter(|v| seen.insert((v.category_metadata_id.clone(), v.metadata_value_id.clone())))
        .collect()
}

pub async fn set_metadata(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
    payload: SetMetadataRequest,
) -> AppResult<ApiResponse<Vec<MetadataAssignment>>> {
    ensure_admin(user)?;
    let product = find_product(state, product_id).await?;
    let values = unique_assignments(payload.values);

    let facets: HashSet<String> = CategoryMetadata::find()
        .filter(FacetCol::CategoryId.eq(product.category_id))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|f| f.id)
        .collect();
    let known_values: HashMap<String, String> = MetadataValues::find()
        .filter(ValueCol::Id.is_in(values.iter().map(|v| v.metadata_value_id.clone())))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|v| (v.id, v.category_metadata_id))
        .collect();

    for value in &values {
        let valid = facets.contains(&value.category_metadata_id)
            && known_values.get(&value.metadata_value_id) == Some(&value.category_metadata_id);
        if !valid {
            return Err(AppError::BadRequest(format!(
                "Invalid metadata value {} for {}",
                value.metadata_value_id, value.category_metadata_id
            )));
        }
    }

    let txn = state.orm.begin().await?;
    ProductMetadata::delete_many()
        .filter(PmCol::ProductId.eq(product_id))
        .exec(&txn)
        .await?;
    if !values.is_empty() {
        let rows = values.iter().map(|v| ProductMetadataActive {
            id: Set(Uuid::new_v4()),
            product_id: Set(product_id),
            category_metadata_id: Set(v.category_metadata_id.clone()),
            metadata_value_id: Set(v.metadata_value_id.clone()),
        });
        ProductMetadata::insert_many(rows).exec(&txn).await?;
    }
    txn.commit().await?;

    audit::record(
        &state.orm,
        user.user_id,
        "product_metadata_set",
        "products",
        serde_json::json!({ "product_id": product_id, "values": values.len() }),
    )
    .await;

    Ok(ApiResponse::success(
        "Metadata updated",
        values,
        Some(Meta::empty()),
    ))
}

pub async fn stats(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<ProductStats>> {
    ensure_admin(user)?;
    let total = Products::find().count(&state.orm).await? as i64;

    let out_of_stock_ids: Vec<Uuid> = sqlx::query_scalar(
        r#"
        SELECT p.id
        FROM products p
        WHERE NOT EXISTS (
            SELECT 1 FROM product_variants v WHERE v.product_id = p.id AND v.stock > 0
        )
        ORDER BY p.created_at DESC, p.id
        "#,
    )
    .fetch_all(&state.pool)
    .await?;
    let out_of_stock: Vec<ProductSummary> =
        summaries(state, products_in_order(state, &out_of_stock_ids).await?).await?;

    Ok(ApiResponse::success(
        "Product stats",
        ProductStats {
            total,
            top_selling: most_sold(state, STATS_LIMIT).await?,
            most_viewed: most_viewed(state, STATS_LIMIT).await?,
            most_favorited: most_favorited(state, STATS_LIMIT).await?,
            out_of_stock,
        },
        Some(Meta::empty()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assignment(facet: &str, value: &str) -> MetadataAssignment {
        MetadataAssignment {
            category_metadata_id: facet.into(),
            metadata_value_id: value.into(),
        }
    }

    #[test]
    fn duplicate_assignments_collapse() {
        let values = unique_assignments(vec![
            assignment("tech", "react"),
            assignment("tech", "node"),
            assignment("tech", "react"),
        ]);
        assert_eq!(
            values,
            vec![assignment("tech", "react"), assignment("tech", "node")]
        );
    }

    #[test]
    fn price_and_stock_bounds() {
        assert!(validate_price(1).is_ok());
        assert!(matches!(validate_price(0), Err(AppError::BadRequest(_))));
        assert!(validate_stock(0).is_ok());
        assert!(matches!(validate_stock(-1), Err(AppError::BadRequest(_))));
    }
}
