use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::entity::sea_orm_active_enums::{OrderStatus, UserRole};

pub const DEFAULT_PER_PAGE: i64 = 20;
pub const MAX_PER_PAGE: i64 = 100;

/// Page window resolved from optional `page` / `limit` query values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: i64,
    pub per_page: i64,
    pub offset: i64,
}

pub fn normalize(page: Option<i64>, per_page: Option<i64>, default_per_page: i64) -> Page {
    let page = page.unwrap_or(1).max(1);
    let per_page = per_page.unwrap_or(default_per_page).clamp(1, MAX_PER_PAGE);
    Page {
        page,
        per_page,
        offset: (page - 1).saturating_mul(per_page),
    }
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct Pagination {
    pub page: Option<i64>,
    #[serde(alias = "limit")]
    pub per_page: Option<i64>,
}

impl Pagination {
    pub fn normalize(&self) -> Page {
        normalize(self.page, self.per_page, DEFAULT_PER_PAGE)
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProductOrder {
    #[default]
    Views,
    Selling,
    Price,
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProductQuery {
    /// JSON object mapping facet ids to `|`-separated value ids.
    pub metadata: Option<String>,
    pub order_by: Option<ProductOrder>,
    pub limit: Option<u64>,
    /// Category slug.
    pub category: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LimitQuery {
    pub limit: Option<u64>,
}

#[derive(Debug, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ShippingQuery {
    pub zipcode: String,
}

#[derive(Debug, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SessionQuery {
    pub session_id: String,
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AdminProductQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub category_id: Option<Uuid>,
    /// Matched against labels and descriptions, case-insensitive.
    pub search: Option<String>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AdminUserQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
    pub role: Option<UserRole>,
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AdminOrderQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub status: Option<OrderStatus>,
    pub user_id: Option<Uuid>,
    /// `YYYY-MM-DD`, inclusive.
    pub start_date: Option<NaiveDate>,
    /// `YYYY-MM-DD`, inclusive.
    pub end_date: Option<NaiveDate>,
    pub min_total: Option<i64>,
    pub max_total: Option<i64>,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RatingStatus {
    Pending,
    Approved,
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AdminRatingQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub status: Option<RatingStatus>,
    pub product_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub min_rating: Option<i32>,
    pub max_rating: Option<i32>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, ToSchema, PartialEq, Eq)]
pub enum ChartPeriod {
    #[serde(rename = "7days")]
    Week,
    #[default]
    #[serde(rename = "30days")]
    Month,
    #[serde(rename = "12months")]
    Year,
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ChartQuery {
    pub period: Option<ChartPeriod>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, ToSchema, PartialEq, Eq)]
pub enum TopProductsPeriod {
    #[serde(rename = "7days")]
    Week,
    #[serde(rename = "30days")]
    Month,
    #[default]
    #[serde(rename = "all")]
    All,
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TopProductsQuery {
    pub limit: Option<u64>,
    pub period: Option<TopProductsPeriod>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_applies_defaults_and_bounds() {
        assert_eq!(
            normalize(None, None, 20),
            Page { page: 1, per_page: 20, offset: 0 }
        );
        assert_eq!(
            normalize(Some(3), Some(10), 20),
            Page { page: 3, per_page: 10, offset: 20 }
        );
        assert_eq!(normalize(Some(0), Some(500), 20).per_page, MAX_PER_PAGE);
        assert_eq!(normalize(Some(-4), Some(0), 20).page, 1);
        assert_eq!(normalize(Some(-4), Some(0), 20).per_page, 1);
    }

    #[test]
    fn huge_page_saturates_offset() {
        let page = normalize(Some(i64::MAX), Some(100), 20);
        assert_eq!(page.page, i64::MAX);
        assert_eq!(page.offset, i64::MAX);
        assert_eq!(normalize(Some(i64::MAX), None, 20).offset, i64::MAX);
    }

    #[test]
    fn limit_is_accepted_as_per_page_alias() {
        let p: Pagination = serde_json::from_str(r#"{"page":2,"limit":5}"#).unwrap();
        assert_eq!(p.normalize(), Page { page: 2, per_page: 5, offset: 5 });
    }

    #[test]
    fn product_order_parses_snake_case() {
        let q: ProductQuery = serde_json::from_str(r#"{"order_by":"selling"}"#).unwrap();
        assert_eq!(q.order_by, Some(ProductOrder::Selling));
    }

    #[test]
    fn chart_periods_use_wire_names() {
        let q: ChartQuery = serde_json::from_str(r#"{"period":"12months"}"#).unwrap();
        assert_eq!(q.period, Some(ChartPeriod::Year));
        assert_eq!(ChartQuery::default().period.unwrap_or_default(), ChartPeriod::Month);
        let top: TopProductsQuery = serde_json::from_str(r#"{"period":"7days"}"#).unwrap();
        assert_eq!(top.period, Some(TopProductsPeriod::Week));
        assert!(serde_json::from_str::<ChartQuery>(r#"{"period":"all"}"#).is_err());
    }
}
