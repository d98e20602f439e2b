use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{admin as admin_dto, auth as auth_dto, cart as cart_dto, products as product_dto},
    entity::sea_orm_active_enums::{OrderStatus, UserRole},
    models::{Address, Banner, Category, OrderDetail, ProductSummary, Store, StoreBenefit, User, Variant},
    response::Meta,
    routes::{
        admin, auth, cart, categories, favorites, health, orders, params, products, storefront,
        users, webhook,
    },
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::login,
        users::get_profile,
        users::update_profile,
        users::list_addresses,
        users::create_address,
        users::update_address,
        users::delete_address,
        products::list_products,
        products::get_product,
        products::related_products,
        products::create_rating,
        products::list_ratings,
        products::rating_average,
        categories::list_categories,
        categories::category_metadata,
        storefront::list_banners,
        storefront::get_store,
        cart::mount,
        cart::shipping,
        cart::finish,
        orders::list_orders,
        orders::order_by_session,
        orders::get_order,
        favorites::list_favorites,
        favorites::add_favorite,
        favorites::remove_favorite,
        webhook::stripe_webhook,
        admin::dashboard::metrics,
        admin::dashboard::revenue_chart,
        admin::dashboard::orders_chart,
        admin::dashboard::top_products,
        admin::products::list_products,
        admin::products::product_stats,
        admin::products::get_product,
        admin::products::create_product,
        admin::products::update_product,
        admin::products::delete_product,
        admin::products::add_image,
        admin::products::delete_image,
        admin::products::add_variant,
        admin::products::update_variant,
        admin::products::delete_variant,
        admin::products::set_metadata,
        admin::categories::create_category,
        admin::categories::update_category,
        admin::categories::delete_category,
        admin::categories::create_facet,
        admin::categories::update_facet,
        admin::categories::delete_facet,
        admin::categories::create_facet_value,
        admin::categories::update_facet_value,
        admin::categories::delete_facet_value,
        admin::banners::list_banners,
        admin::banners::get_banner,
        admin::banners::create_banner,
        admin::banners::update_banner,
        admin::banners::delete_banner,
        admin::banners::reorder_banners,
        admin::users::list_users,
        admin::users::user_stats,
        admin::users::get_user,
        admin::users::create_user,
        admin::users::update_user,
        admin::users::delete_user,
        admin::orders::list_orders,
        admin::orders::order_stats,
        admin::orders::get_order,
        admin::orders::update_order_status,
        admin::ratings::list_ratings,
        admin::ratings::get_rating,
        admin::ratings::set_approval,
        admin::ratings::delete_rating,
        admin::favorites::grouped_favorites,
        admin::store::upsert_store,
        admin::store::create_benefit,
        admin::store::update_benefit,
        admin::store::delete_benefit
    ),
    components(
        schemas(
            User,
            Address,
            Category,
            Variant,
            ProductSummary,
            OrderDetail,
            Banner,
            Store,
            StoreBenefit,
            UserRole,
            OrderStatus,
            Meta,
            auth_dto::LoginResponse,
            cart_dto::CartLine,
            product_dto::ProductList,
            params::ProductOrder,
            params::ChartPeriod,
            params::TopProductsPeriod,
            params::RatingStatus,
            admin_dto::DashboardMetrics,
            admin_dto::AdminProductDetail,
            admin_dto::AdminOrderDetail,
            admin_dto::AdminUserDetail,
            webhook::WebhookAck
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Authentication endpoints"),
        (name = "User", description = "Profile and address endpoints"),
        (name = "Products", description = "Catalog endpoints"),
        (name = "Categories", description = "Category and facet endpoints"),
        (name = "Ratings", description = "Product rating endpoints"),
        (name = "Storefront", description = "Banners and store info"),
        (name = "Cart", description = "Cart and checkout endpoints"),
        (name = "Orders", description = "Order endpoints"),
        (name = "Favorites", description = "Favorite endpoints"),
        (name = "Webhook", description = "Payment processor callbacks"),
        (name = "Admin", description = "Back-office endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_public_and_admin_paths() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;
        assert!(paths.contains_key("/api/cart/finish"));
        assert!(paths.contains_key("/webhook/stripe"));
        assert!(paths.contains_key("/api/admin/banners/reorder"));
        assert!(paths.contains_key("/api/admin/dashboard/top-products"));
    }

    #[test]
    fn bearer_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
