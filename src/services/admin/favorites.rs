use std::collections::HashMap;

use uuid::Uuid;

use crate::{
    dto::admin::{FavoriteGroup, FavoriteGroupList},
    error::AppResult,
    middleware::auth::{AuthUser, ensure_admin},
    models::UserRef,
    response::{ApiResponse, Meta},
    services::{admin::products::products_in_order, product_service::summaries},
    state::AppState,
};

#[derive(sqlx::FromRow)]
struct FavoriteUserRow {
    product_id: Uuid,
    user_id: Uuid,
    name: String,
    email: String,
}

/// Group `(product, user)` rows by product, most favorited first.
fn group_by_product(rows: Vec<FavoriteUserRow>) -> Vec<(Uuid, Vec<UserRef>)> {
    let mut groups: Vec<(Uuid, Vec<UserRef>)> = Vec::new();
    let mut index: HashMap<Uuid, usize> = HashMap::new();
    for row in rows {
        let user = UserRef {
            id: row.user_id,
            name: row.name,
            email: row.email,
        };
        match index.get(&row.product_id) {
            Some(&i) => groups[i].1.push(user),
            None => {
                index.insert(row.product_id, groups.len());
                groups.push((row.product_id, vec![user]));
            }
        }
    }
    groups.sort_by(|a, b| b.1.len().cmp(&a.1.len()).then(a.0.cmp(&b.0)));
    groups
}

pub async fn grouped_favorites(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<FavoriteGroupList>> {
    ensure_admin(user)?;
    let rows = sqlx::query_as::<_, FavoriteUserRow>(
        r#"
        SELECT f.product_id, u.id AS user_id, u.name, u.email
        FROM favorites f
        JOIN users u ON u.id = f.user_id
        ORDER BY f.created_at DESC
        "#,
    )
    .fetch_all(&state.pool)
    .await?;

    let groups = group_by_product(rows);
    let ids: Vec<Uuid> = groups.iter().map(|(id, _)| *id).collect();
    let mut cards: HashMap<Uuid, _> = summaries(state, products_in_order(state, &ids).await?)
        .await?
        .into_iter()
        .map(|card| (card.id, card))
        .collect();

    let items = groups
        .into_iter()
        .filter_map(|(product_id, users)| {
            cards.remove(&product_id).map(|product| FavoriteGroup {
                count: users.len() as i64,
                product,
                users,
            })
        })
        .collect();

    Ok(ApiResponse::success(
        "Favorites",
        FavoriteGroupList { items },
        Some(Meta::empty()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(product_id: Uuid, name: &str) -> FavoriteUserRow {
        FavoriteUserRow {
            product_id,
            user_id: Uuid::new_v4(),
            name: name.into(),
            email: format!("{name}@devstore.com"),
        }
    }

    #[test]
    fn groups_are_sorted_by_count() {
        let shirt = Uuid::new_v4();
        let mug = Uuid::new_v4();
        let groups = group_by_product(vec![
            row(mug, "ana"),
            row(shirt, "bia"),
            row(shirt, "caio"),
            row(shirt, "duda"),
        ]);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, shirt);
        assert_eq!(groups[0].1.len(), 3);
        assert_eq!(groups[0].1[0].name, "bia");
        assert_eq!(groups[1].0, mug);
    }
}
