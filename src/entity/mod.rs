pub mod audit_logs;
pub mod banners;
pub mod categories;
pub mod category_metadata;
pub mod favorites;
pub mod metadata_values;
pub mod order_items;
pub mod order_status_history;
pub mod orders;
pub mod product_images;
pub mod product_metadata;
pub mod product_ratings;
pub mod product_variants;
pub mod products;
pub mod sea_orm_active_enums;
pub mod store_benefits;
pub mod stores;
pub mod user_addresses;
pub mod users;

pub use audit_logs::Entity as AuditLogs;
pub use banners::Entity as Banners;
pub use categories::Entity as Categories;
pub use category_metadata::Entity as CategoryMetadata;
pub use favorites::Entity as Favorites;
pub use metadata_values::Entity as MetadataValues;
pub use order_items::Entity as OrderItems;
pub use order_status_history::Entity as OrderStatusHistory;
pub use orders::Entity as Orders;
pub use product_images::Entity as ProductImages;
pub use product_metadata::Entity as ProductMetadata;
pub use product_ratings::Entity as ProductRatings;
pub use product_variants::Entity as ProductVariants;
pub use products::Entity as Products;
pub use store_benefits::Entity as StoreBenefits;
pub use stores::Entity as Stores;
pub use user_addresses::Entity as UserAddresses;
pub use users::Entity as Users;
