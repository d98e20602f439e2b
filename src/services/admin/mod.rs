//! Back-office services. Every entry point requires the `admin` role.

use chrono::{DateTime, Datelike, NaiveTime, Utc};
use sea_orm::sea_query::LikeExpr;

use crate::{
    entity::sea_orm_active_enums::OrderStatus,
    error::{AppError, AppResult},
};

pub mod banners;
pub mod categories;
pub mod dashboard;
pub mod favorites;
pub mod orders;
pub mod products;
pub mod ratings;
pub mod store;
pub mod users;

/// Revenue statuses as bind values for `status = ANY($n)`.
pub(crate) fn revenue_statuses() -> Vec<String> {
    OrderStatus::REVENUE
        .iter()
        .map(|s| s.as_str().to_string())
        .collect()
}

/// Midnight UTC on the first day of `now`'s month.
pub(crate) fn month_start(now: DateTime<Utc>) -> AppResult<DateTime<Utc>> {
    let first = now
        .date_naive()
        .with_day(1)
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("invalid month start")))?;
    Ok(first.and_time(NaiveTime::MIN).and_utc())
}

/// Empty optional text is stored as NULL.
pub(crate) fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Case-insensitive "contains" pattern with LIKE wildcards in `search` taken literally.
pub(crate) fn contains_pattern(search: &str) -> LikeExpr {
    let mut escaped = String::with_capacity(search.len() + 2);
    escaped.push('%');
    for c in search.to_lowercase().chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    LikeExpr::new(escaped).escape('\\')
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn month_start_is_first_day_at_midnight() {
        let now = Utc.with_ymd_and_hms(2026, 3, 17, 15, 42, 9).unwrap();
        let start = month_start(now).unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn revenue_statuses_are_wire_strings() {
        assert_eq!(revenue_statuses(), vec!["paid", "shipped", "delivered"]);
    }

    #[test]
    fn search_wildcards_are_escaped() {
        assert_eq!(escaped_text("React"), "%react%");
        assert_eq!(escaped_text("%"), "%\\%%");
        assert_eq!(escaped_text("a_b\\c"), "%a\\_b\\\\c%");
    }

    fn escaped_text(search: &str) -> String {
        use sea_orm::sea_query::{Alias, Expr, PostgresQueryBuilder, Query};
        let (sql, values) = Query::select()
            .expr(Expr::col(Alias::new("label")).like(contains_pattern(search)))
            .build(PostgresQueryBuilder);
        assert!(sql.contains("ESCAPE"));
        match values.0.into_iter().next() {
            Some(sea_orm::Value::String(Some(text))) => *text,
            other => panic!("unexpected bind value {other:?}"),
        }
    }

    #[test]
    fn blank_text_becomes_none() {
        assert_eq!(blank_to_none(Some("  ".into())), None);
        assert_eq!(blank_to_none(Some(" Shirt ".into())), Some("Shirt".into()));
        assert_eq!(blank_to_none(None), None);
    }
}
