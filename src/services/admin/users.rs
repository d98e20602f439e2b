use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, Condition, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
    sea_query::{Expr, Func},
};
use uuid::Uuid;

use crate::{
    audit,
    dto::admin::{
        AdminUserDetail, AdminUserList, AdminUserRow, CreateUserRequest, CustomerStats,
        UpdateUserRequest, UserFavorite, UserStats,
    },
    entity::{
        favorites::{Column as FavCol, Entity as Favorites},
        orders::{Column as OrderCol, Entity as Orders},
        products::Entity as Products,
        sea_orm_active_enums::{OrderStatus, UserRole},
        user_addresses::{Column as AddressCol, Entity as UserAddresses},
        users::{self, ActiveModel as UserActive, Column as UserCol, Entity as Users},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Address, User},
    response::{ApiResponse, Meta},
    routes::params::{AdminUserQuery, DEFAULT_PER_PAGE, normalize},
    services::{
        admin::{contains_pattern, month_start, orders::order_rows},
        auth_service::{find_user_by_email, hash_password},
        product_service::summaries,
    },
    state::AppState,
    validation,
};

#[derive(sqlx::FromRow)]
struct UserCountsRow {
    id: Uuid,
    orders_count: i64,
    addresses_count: i64,
    favorites_count: i64,
}

async fn user_counts(
    state: &AppState,
    ids: &[Uuid],
) -> AppResult<HashMap<Uuid, (i64, i64, i64)>> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows = sqlx::query_as::<_, UserCountsRow>(
        r#"
        SELECT u.id,
               (SELECT COUNT(*) FROM orders o WHERE o.user_id = u.id) AS orders_count,
               (SELECT COUNT(*) FROM user_addresses a WHERE a.user_id = u.id) AS addresses_count,
               (SELECT COUNT(*) FROM favorites f WHERE f.user_id = u.id) AS favorites_count
        FROM users u
        WHERE u.id = ANY($1)
        "#,
    )
    .bind(ids.to_vec())
    .fetch_all(&state.pool)
    .await?;
    Ok(rows
        .into_iter()
        .map(|r| (r.id, (r.orders_count, r.addresses_count, r.favorites_count)))
        .collect())
}

async fn find_user(state: &AppState, id: Uuid) -> AppResult<users::Model> {
    Users::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)
}

pub async fn list_users(
    state: &AppState,
    user: &AuthUser,
    query: AdminUserQuery,
) -> AppResult<ApiResponse<AdminUserList>> {
    ensure_admin(user)?;
    let page = normalize(query.page, query.limit, DEFAULT_PER_PAGE);

    let mut condition = Condition::all();
    if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let matches = |col: UserCol| {
            Expr::expr(Func::lower(Expr::col(col))).like(contains_pattern(search))
        };
        condition = condition.add(
            Condition::any()
                .add(matches(UserCol::Name))
                .add(matches(UserCol::Email)),
        );
    }
    if let Some(role) = query.role {
        condition = condition.add(UserCol::Role.eq(role));
    }

    let finder = Users::find().filter(condition);
    let total = finder.clone().count(&state.orm).await? as i64;
    let users = finder
        .order_by_desc(UserCol::CreatedAt)
        .order_by_asc(UserCol::Id)
        .limit(page.per_page as u64)
        .offset(page.offset as u64)
        .all(&state.orm)
        .await?;

    let ids: Vec<Uuid> = users.iter().map(|u| u.id).collect();
    let counts = user_counts(state, &ids).await?;
    let items = users
        .into_iter()
        .map(|u| {
            let (orders_count, addresses_count, favorites_count) =
                counts.get(&u.id).copied().unwrap_or_default();
            AdminUserRow {
                user: u.into(),
                orders_count,
                addresses_count,
                favorites_count,
            }
        })
        .collect();

    Ok(ApiResponse::success(
        "Users",
        AdminUserList { items },
        Some(Meta::new(page.page, page.per_page, total)),
    ))
}

#[derive(sqlx::FromRow)]
struct SpendingRow {
    total_orders: i64,
    total_spent: i64,
    last_order_date: Option<DateTime<Utc>>,
}

pub async fn get_user(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<AdminUserDetail>> {
    ensure_admin(user)?;
    let model = find_user(state, id).await?;

    let addresses = UserAddresses::find()
        .filter(AddressCol::UserId.eq(id))
        .order_by_desc(AddressCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Address::from)
        .collect();

    let orders = Orders::find()
        .filter(OrderCol::UserId.eq(id))
        .order_by_desc(OrderCol::CreatedAt)
        .all(&state.orm)
        .await?;
    let orders = order_rows(state, orders).await?;

    let (favorites, products): (Vec<_>, Vec<_>) = Favorites::find()
        .filter(FavCol::UserId.eq(id))
        .order_by_desc(FavCol::CreatedAt)
        .find_also_related(Products)
        .all(&state.orm)
        .await?
        .into_iter()
        .filter_map(|(fav, product)| product.map(|p| (fav, p)))
        .unzip();
    let favorites = favorites
        .into_iter()
        .zip(summaries(state, products).await?)
        .map(|(fav, product)| UserFavorite {
            id: fav.id,
            created_at: fav.created_at.with_timezone(&Utc),
            product,
        })
        .collect();

    let spending = sqlx::query_as::<_, SpendingRow>(
        r#"
        SELECT COUNT(*) AS total_orders,
               COALESCE(SUM(total) FILTER (WHERE status = $2), 0)::bigint AS total_spent,
               MAX(created_at) AS last_order_date
        FROM orders
        WHERE user_id = $1
        "#,
    )
    .bind(id)
    .bind(OrderStatus::Paid.as_str())
    .fetch_one(&state.pool)
    .await?;

    Ok(ApiResponse::success(
        "User",
        AdminUserDetail {
            user: model.into(),
            addresses,
            orders,
            favorites,
            stats: CustomerStats {
                total_orders: spending.total_orders,
                total_spent: spending.total_spent,
                last_order_date: spending.last_order_date,
            },
        },
        Some(Meta::empty()),
    ))
}

pub async fn create_user(
    state: &AppState,
    user: &AuthUser,
    payload: CreateUserRequest,
) -> AppResult<ApiResponse<User>> {
    ensure_admin(user)?;
    validation::name(&payload.name)?;
    validation::email(&payload.email)?;
    validation::password(&payload.password)?;
    let email = validation::normalize_email(&payload.email);

    if find_user_by_email(state, &email).await?.is_some() {
        return Err(AppError::BadRequest("User already exists".into()));
    }

    let created = UserActive {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name.trim().to_string()),
        email: Set(email),
        password_hash: Set(hash_password(&payload.password)?),
        role: Set(payload.role.unwrap_or(UserRole::Customer)),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.orm,
        user.user_id,
        "admin_user_create",
        "users",
        serde_json::json!({ "user_id": created.id, "role": created.role }),
    )
    .await;

    Ok(ApiResponse::success("User created", created.into(), Some(Meta::empty())))
}

/// Field rules for an admin edit, checked before touching the database.
pub fn validate_update(payload: &UpdateUserRequest) -> AppResult<()> {
    let any_field = payload.name.is_some()
        || payload.email.is_some()
        || payload.password.is_some()
        || payload.role.is_some();
    if !any_field {
        return Err(AppError::BadRequest(
            "At least one field (name, email, password, or role) must be provided".into(),
        ));
    }
    if payload.password != payload.confirm_password {
        return Err(AppError::BadRequest(
            "Password and confirmation must match".into(),
        ));
    }
    if let Some(name) = &payload.name {
        validation::name(name)?;
    }
    if let Some(email) = &payload.email {
        validation::email(email)?;
    }
    if let Some(password) = &payload.password {
        validation::password(password)?;
    }
    Ok(())
}

pub async fn update_user(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateUserRequest,
) -> AppResult<ApiResponse<User>> {
    ensure_admin(user)?;
    validate_update(&payload)?;
    let existing = find_user(state, id).await?;
    let mut active: UserActive = existing.into();

    if let Some(name) = payload.name {
        active.name = Set(name.trim().to_string());
    }
    if let Some(email) = payload.email {
        let email = validation::normalize_email(&email);
        let taken = find_user_by_email(state, &email)
            .await?
            .is_some_and(|other| other.id != id);
        if taken {
            return Err(AppError::BadRequest("Email already in use".into()));
        }
        active.email = Set(email);
    }
    if let Some(password) = payload.password {
        active.password_hash = Set(hash_password(&password)?);
    }
    if let Some(role) = payload.role {
        active.role = Set(role);
    }
    active.updated_at = Set(Utc::now().into());
    let updated = active.update(&state.orm).await?;

    audit::record(
        &state.orm,
        user.user_id,
        "admin_user_update",
        "users",
        serde_json::json!({ "user_id": id }),
    )
    .await;

    Ok(ApiResponse::success("User updated", updated.into(), Some(Meta::empty())))
}

pub async fn delete_user(state: &AppState, user: &AuthUser, id: Uuid) -> AppResult<()> {
    ensure_admin(user)?;
    if id == user.user_id {
        return Err(AppError::BadRequest("You cannot delete your own account".into()));
    }
    let result = Users::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.orm,
        user.user_id,
        "admin_user_delete",
        "users",
        serde_json::json!({ "user_id": id }),
    )
    .await;
    Ok(())
}

pub async fn stats(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<UserStats>> {
    ensure_admin(user)?;
    let total = Users::find().count(&state.orm).await? as i64;
    let new_this_month = Users::find()
        .filter(UserCol::CreatedAt.gte(month_start(Utc::now())?))
        .count(&state.orm)
        .await? as i64;
    let active_users: i64 = sqlx::query_scalar("SELECT COUNT(DISTINCT user_id) FROM orders")
        .fetch_one(&state.pool)
        .await?;

    Ok(ApiResponse::success(
        "User stats",
        UserStats {
            total,
            new_this_month,
            active_users,
        },
        Some(Meta::empty()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_update_is_rejected() {
        let err = validate_update(&UpdateUserRequest::default()).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn password_needs_matching_confirmation() {
        let missing = UpdateUserRequest {
            password: Some("new-password".into()),
            ..Default::default()
        };
        assert!(validate_update(&missing).is_err());

        let mismatch = UpdateUserRequest {
            password: Some("new-password".into()),
            confirm_password: Some("other-password".into()),
            ..Default::default()
        };
        assert!(validate_update(&mismatch).is_err());

        let orphan_confirmation = UpdateUserRequest {
            name: Some("Maria".into()),
            confirm_password: Some("new-password".into()),
            ..Default::default()
        };
        assert!(validate_update(&orphan_confirmation).is_err());

        let matching = UpdateUserRequest {
            password: Some("new-password".into()),
            confirm_password: Some("new-password".into()),
            ..Default::default()
        };
        assert!(validate_update(&matching).is_ok());
    }

    #[test]
    fn role_alone_is_a_valid_update() {
        let req = UpdateUserRequest {
            role: Some(UserRole::Admin),
            ..Default::default()
        };
        assert!(validate_update(&req).is_ok());
    }
}
