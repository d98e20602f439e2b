use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{
    Category, Facet, ProductDetail, ProductListItem, PublicRating,
};

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductList {
    pub items: Vec<ProductListItem>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductWithCategory {
    pub product: ProductDetail,
    pub category: Option<Category>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryWithCount {
    #[serde(flatten)]
    pub category: Category,
    pub product_count: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryList {
    pub items: Vec<CategoryWithCount>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryMetadataResponse {
    pub category: Category,
    pub metadata: Vec<Facet>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateRatingRequest {
    pub rating: i32,
    pub comment: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RatingList {
    pub items: Vec<PublicRating>,
}
