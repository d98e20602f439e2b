use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    entity::sea_orm_active_enums::{OrderStatus, UserRole},
    models::{
        Address, Banner, Category, MetadataValue, OrderItem, ProductSummary, ShippingAddress,
        User, UserRef, Variant,
    },
    routes::params::{ChartPeriod, TopProductsPeriod},
};

// Dashboard

#[derive(Debug, Default, Clone, Copy, Serialize, ToSchema, PartialEq, Eq)]
pub struct StatusCounts {
    pub pending: i64,
    pub paid: i64,
    pub cancelled: i64,
    pub shipped: i64,
    pub delivered: i64,
}

impl StatusCounts {
    pub fn add(&mut self, status: OrderStatus, count: i64) {
        let slot = match status {
            OrderStatus::Pending => &mut self.pending,
            OrderStatus::Paid => &mut self.paid,
            OrderStatus::Cancelled => &mut self.cancelled,
            OrderStatus::Shipped => &mut self.shipped,
            OrderStatus::Delivered => &mut self.delivered,
        };
        *slot += count;
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserMetrics {
    pub total: i64,
    pub new_this_month: i64,
    /// Users with at least one order.
    pub active: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderMetrics {
    pub total: i64,
    pub by_status: StatusCounts,
    pub revenue: i64,
    pub revenue_this_month: i64,
    pub average_ticket: i64,
}

/// Product card with its counters, used by rankings.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProductStat {
    #[serde(flatten)]
    pub product: ProductSummary,
    pub views_count: i64,
    pub sales_count: i64,
    pub favorites_count: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductMetrics {
    pub total: i64,
    pub most_viewed: Vec<ProductStat>,
    pub most_sold: Vec<ProductStat>,
    pub most_favorited: Vec<ProductStat>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardMetrics {
    pub users: UserMetrics,
    pub orders: OrderMetrics,
    pub products: ProductMetrics,
    pub recent_orders: Vec<AdminOrderRow>,
    pub recent_users: Vec<User>,
}

#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
pub struct ChartPoint {
    /// `YYYY-MM-DD` for daily buckets, `YYYY-MM` for monthly ones.
    pub date: String,
    pub value: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Chart {
    pub period: ChartPeriod,
    pub points: Vec<ChartPoint>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TopProduct {
    #[serde(flatten)]
    pub product: ProductSummary,
    pub sales_count: i64,
    /// Units sold inside the requested window; absent for `all`.
    pub period_sales: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TopProductList {
    pub period: TopProductsPeriod,
    pub items: Vec<TopProduct>,
}

// Products

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminProductRow {
    pub id: Uuid,
    pub label: String,
    pub label_en: Option<String>,
    pub price: i64,
    pub category: Option<Category>,
    pub image: Option<String>,
    pub views_count: i64,
    pub sales_count: i64,
    pub favorites_count: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminProductList {
    pub items: Vec<AdminProductRow>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductImage {
    pub id: Uuid,
    pub url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema, PartialEq, Eq)]
pub struct MetadataAssignment {
    pub category_metadata_id: String,
    pub metadata_value_id: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminProduct {
    pub id: Uuid,
    pub label: String,
    pub label_en: Option<String>,
    pub price: i64,
    pub description: Option<String>,
    pub description_en: Option<String>,
    pub category_id: Uuid,
    pub views_count: i64,
    pub sales_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminProductDetail {
    #[serde(flatten)]
    pub product: AdminProduct,
    pub category: Option<Category>,
    pub images: Vec<ProductImage>,
    pub variants: Vec<Variant>,
    pub metadata: Vec<MetadataAssignment>,
    pub favorites_count: i64,
    pub orders_count: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    pub label: String,
    pub label_en: Option<String>,
    pub price: i64,
    pub description: Option<String>,
    pub description_en: Option<String>,
    pub category_id: Uuid,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateProductRequest {
    pub label: Option<String>,
    pub label_en: Option<String>,
    pub price: Option<i64>,
    pub description: Option<String>,
    pub description_en: Option<String>,
    pub category_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddImageRequest {
    pub url: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddVariantRequest {
    pub size: String,
    pub stock: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateVariantRequest {
    pub stock: i32,
}

/// Replaces every facet value assigned to a product.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SetMetadataRequest {
    pub values: Vec<MetadataAssignment>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductStats {
    pub total: i64,
    pub top_selling: Vec<ProductStat>,
    pub most_viewed: Vec<ProductStat>,
    pub most_favorited: Vec<ProductStat>,
    /// Products whose variants are all out of stock.
    pub out_of_stock: Vec<ProductSummary>,
}

// Categories

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCategoryRequest {
    pub name: String,
    pub name_en: Option<String>,
    pub slug: String,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    pub name_en: Option<String>,
    pub slug: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateFacetRequest {
    /// Stable identifier used in catalog filters, e.g. `tech`.
    pub id: String,
    pub name: String,
    pub name_en: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateFacetRequest {
    pub name: Option<String>,
    pub name_en: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateFacetValueRequest {
    pub id: String,
    pub label: String,
    pub label_en: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateFacetValueRequest {
    pub label: Option<String>,
    pub label_en: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FacetSummary {
    pub id: String,
    pub category_id: Uuid,
    pub name: String,
    pub name_en: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FacetValue {
    pub category_metadata_id: String,
    #[serde(flatten)]
    pub value: MetadataValue,
}

// Banners

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateBannerRequest {
    pub img: String,
    pub link: String,
    pub order: Option<i32>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateBannerRequest {
    pub img: Option<String>,
    pub link: Option<String>,
    pub order: Option<i32>,
}

#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
pub struct BannerPosition {
    pub id: Uuid,
    pub order: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ReorderBannersRequest {
    pub banners: Vec<BannerPosition>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminBannerList {
    pub items: Vec<Banner>,
}

// Users

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Option<UserRole>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub confirm_password: Option<String>,
    pub role: Option<UserRole>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminUserRow {
    #[serde(flatten)]
    pub user: User,
    pub orders_count: i64,
    pub addresses_count: i64,
    pub favorites_count: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminUserList {
    pub items: Vec<AdminUserRow>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CustomerStats {
    pub total_orders: i64,
    /// Sum of totals of paid orders.
    pub total_spent: i64,
    pub last_order_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserFavorite {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub product: ProductSummary,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminUserDetail {
    #[serde(flatten)]
    pub user: User,
    pub addresses: Vec<Address>,
    pub orders: Vec<AdminOrderRow>,
    pub favorites: Vec<UserFavorite>,
    pub stats: CustomerStats,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserStats {
    pub total: i64,
    pub new_this_month: i64,
    pub active_users: i64,
}

// Orders

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AdminOrderRow {
    pub id: Uuid,
    pub status: OrderStatus,
    pub total: i64,
    pub user: Option<UserRef>,
    pub items_count: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminOrderList {
    pub items: Vec<AdminOrderRow>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatusHistoryEntry {
    pub id: Uuid,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminOrderDetail {
    pub id: Uuid,
    pub status: OrderStatus,
    pub total: i64,
    pub shipping_cost: i64,
    pub shipping_days: i32,
    pub shipping: ShippingAddress,
    pub stripe_session_id: Option<String>,
    pub stripe_payment_id: Option<String>,
    pub user: Option<UserRef>,
    pub items: Vec<OrderItem>,
    pub history: Vec<StatusHistoryEntry>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderStats {
    pub total: i64,
    pub by_status: StatusCounts,
    pub revenue: i64,
    pub average_ticket: i64,
}

// Ratings

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RatedProduct {
    pub id: Uuid,
    pub label: String,
    pub image: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminRating {
    pub id: Uuid,
    pub rating: i32,
    pub comment: Option<String>,
    pub approved: bool,
    pub user: Option<UserRef>,
    pub product: Option<RatedProduct>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminRatingList {
    pub items: Vec<AdminRating>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ApproveRatingRequest {
    pub approved: bool,
}

// Favorites

#[derive(Debug, Serialize, ToSchema)]
pub struct FavoriteGroup {
    pub product: ProductSummary,
    pub count: i64,
    pub users: Vec<UserRef>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FavoriteGroupList {
    pub items: Vec<FavoriteGroup>,
}

// Store

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpsertStoreRequest {
    pub topbar_text: Option<String>,
    pub topbar_text_en: Option<String>,
    pub instagram: Option<String>,
    pub facebook: Option<String>,
    pub email: Option<String>,
    pub whatsapp: Option<String>,
    pub copyright: Option<String>,
    pub copyright_en: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateBenefitRequest {
    pub icon_name: String,
    pub title: String,
    pub title_en: Option<String>,
    pub description: String,
    pub description_en: Option<String>,
    pub order: Option<i32>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateBenefitRequest {
    pub icon_name: Option<String>,
    pub title: Option<String>,
    pub title_en: Option<String>,
    pub description: Option<String>,
    pub description_en: Option<String>,
    pub order: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_counts_accumulate_per_status() {
        let mut counts = StatusCounts::default();
        counts.add(OrderStatus::Paid, 3);
        counts.add(OrderStatus::Paid, 2);
        counts.add(OrderStatus::Cancelled, 1);
        assert_eq!(counts.paid, 5);
        assert_eq!(counts.cancelled, 1);
        assert_eq!(counts.pending, 0);
    }

    #[test]
    fn role_is_optional_on_create() {
        let req: CreateUserRequest = serde_json::from_str(
            r#"{"name":"Ana Maria","email":"ana@devstore.com","password":"secret123"}"#,
        )
        .unwrap();
        assert!(req.role.is_none());
    }
}
