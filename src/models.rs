use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity::{
    banners, categories, category_metadata, metadata_values, product_variants, store_benefits,
    stores, user_addresses, users,
    sea_orm_active_enums::{OrderStatus, UserRole},
};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
            role: model.role,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

/// Reviewer / buyer reference embedded in other resources.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserRef {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

impl From<users::Model> for UserRef {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Address {
    pub id: Uuid,
    pub zipcode: String,
    pub street: String,
    pub number: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub complement: String,
}

impl From<user_addresses::Model> for Address {
    fn from(model: user_addresses::Model) -> Self {
        Self {
            id: model.id,
            zipcode: model.zipcode,
            street: model.street,
            number: model.number,
            city: model.city,
            state: model.state,
            country: model.country,
            complement: model.complement,
        }
    }
}

/// Catalog card: what listings, carts and favorites show for a product.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductSummary {
    pub id: Uuid,
    pub label: String,
    pub label_en: Option<String>,
    pub price: i64,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductListItem {
    #[serde(flatten)]
    pub product: ProductSummary,
    pub liked: bool,
    pub rating_average: f64,
    pub rating_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductDetail {
    pub id: Uuid,
    pub label: String,
    pub label_en: Option<String>,
    pub price: i64,
    pub description: Option<String>,
    pub description_en: Option<String>,
    pub category_id: Uuid,
    pub images: Vec<String>,
    pub liked: bool,
    pub rating_average: f64,
    pub rating_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub name_en: Option<String>,
    pub slug: String,
}

impl From<categories::Model> for Category {
    fn from(model: categories::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            name_en: model.name_en,
            slug: model.slug,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MetadataValue {
    pub id: String,
    pub label: String,
    pub label_en: Option<String>,
}

impl From<metadata_values::Model> for MetadataValue {
    fn from(model: metadata_values::Model) -> Self {
        Self {
            id: model.id,
            label: model.label,
            label_en: model.label_en,
        }
    }
}

/// A category facet with its selectable values.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Facet {
    pub id: String,
    pub name: String,
    pub name_en: Option<String>,
    pub values: Vec<MetadataValue>,
}

impl Facet {
    pub fn new(model: category_metadata::Model, values: Vec<MetadataValue>) -> Self {
        Self {
            id: model.id,
            name: model.name,
            name_en: model.name_en,
            values,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Variant {
    pub id: Uuid,
    pub size: String,
    pub stock: i32,
}

impl From<product_variants::Model> for Variant {
    fn from(model: product_variants::Model) -> Self {
        Self {
            id: model.id,
            size: model.size,
            stock: model.stock,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ShippingAddress {
    pub zipcode: String,
    pub street: String,
    pub number: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub complement: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderSummary {
    pub id: Uuid,
    pub status: OrderStatus,
    pub total: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderItem {
    pub id: Uuid,
    pub product_id: Uuid,
    pub label: String,
    pub image: Option<String>,
    pub quantity: i32,
    pub price: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderDetail {
    pub id: Uuid,
    pub status: OrderStatus,
    pub total: i64,
    pub shipping_cost: i64,
    pub shipping_days: i32,
    pub shipping: ShippingAddress,
    pub items: Vec<OrderItem>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Rating {
    pub id: Uuid,
    pub rating: i32,
    pub comment: Option<String>,
    pub approved: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Reviewer {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PublicRating {
    pub id: Uuid,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub user: Reviewer,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RatingAverage {
    pub average: f64,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Favorite {
    pub id: Uuid,
    pub product_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FavoriteItem {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub product: ProductSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Banner {
    pub id: Uuid,
    pub img: String,
    pub link: String,
    pub order: i32,
    pub created_at: DateTime<Utc>,
}

impl From<banners::Model> for Banner {
    fn from(model: banners::Model) -> Self {
        Self {
            id: model.id,
            img: model.img,
            link: model.link,
            order: model.sort_order,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StoreBenefit {
    pub id: Uuid,
    pub icon_name: String,
    pub title: String,
    pub title_en: Option<String>,
    pub description: String,
    pub description_en: Option<String>,
    pub order: i32,
}

impl From<store_benefits::Model> for StoreBenefit {
    fn from(model: store_benefits::Model) -> Self {
        Self {
            id: model.id,
            icon_name: model.icon_name,
            title: model.title,
            title_en: model.title_en,
            description: model.description,
            description_en: model.description_en,
            order: model.sort_order,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Store {
    pub id: Uuid,
    pub topbar_text: Option<String>,
    pub topbar_text_en: Option<String>,
    pub instagram: Option<String>,
    pub facebook: Option<String>,
    pub email: Option<String>,
    pub whatsapp: Option<String>,
    pub copyright: Option<String>,
    pub copyright_en: Option<String>,
    pub benefits: Vec<StoreBenefit>,
}

impl Store {
    pub fn new(model: stores::Model, benefits: Vec<StoreBenefit>) -> Self {
        Self {
            id: model.id,
            topbar_text: model.topbar_text,
            topbar_text_en: model.topbar_text_en,
            instagram: model.instagram,
            facebook: model.facebook,
            email: model.email,
            whatsapp: model.whatsapp,
            copyright: model.copyright,
            copyright_en: model.copyright_en,
            benefits,
        }
    }
}

/// Round to one decimal place, as ratings are displayed.
pub fn round_rating(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratings_round_to_one_decimal() {
        assert_eq!(round_rating(4.0), 4.0);
        assert_eq!(round_rating(4.333_333), 4.3);
        assert_eq!(round_rating(4.25), 4.3);
        assert_eq!(round_rating(0.0), 0.0);
    }

    #[test]
    fn list_item_flattens_summary() {
        let item = ProductListItem {
            product: ProductSummary {
                id: Uuid::nil(),
                label: "Shirt".into(),
                label_en: None,
                price: 4990,
                image: None,
            },
            liked: true,
            rating_average: 4.5,
            rating_count: 2,
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["label"], "Shirt");
        assert_eq!(json["liked"], true);
        assert!(json.get("product").is_none());
    }
}
