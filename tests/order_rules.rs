mod common;

use devstore_api::{
    dto::{
        admin::{AddVariantRequest, MetadataAssignment, SetMetadataRequest, UpdateProductRequest},
        cart::{CartLine, FinishCartRequest},
        products::CreateRatingRequest,
    },
    entity::sea_orm_active_enums::{OrderStatus, UserRole},
    error::AppError,
    middleware::auth::AuthUser,
    services::{
        admin::products,
        checkout_service,
        order_status_service::StatusChange,
        rating_service,
        webhook_service::{WebhookOutcome, handle_stripe_event},
    },
    state::AppState,
};
use uuid::Uuid;

// These tests create their own rows with unique keys and leave existing data alone.

async fn db_state() -> anyhow::Result<Option<AppState>> {
    let Some(database_url) = common::database_url() else {
        eprintln!("Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests.");
        return Ok(None);
    };
    let stripe_base = common::spawn_fake_stripe().await?;
    Ok(Some(common::connect_state(&database_url, &stripe_base).await?))
}

async fn orders_of(state: &AppState, user: &AuthUser) -> anyhow::Result<i64> {
    Ok(sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE user_id = $1")
        .bind(user.user_id)
        .fetch_one(&state.pool)
        .await?)
}

async fn metadata_rows(state: &AppState, product_id: Uuid) -> anyhow::Result<i64> {
    Ok(sqlx::query_scalar("SELECT COUNT(*) FROM product_metadata WHERE product_id = $1")
        .bind(product_id)
        .fetch_one(&state.pool)
        .await?)
}

#[tokio::test]
async fn checkout_rejects_address_of_another_user() -> anyhow::Result<()> {
    let Some(state) = db_state().await? else {
        return Ok(());
    };
    let buyer = common::insert_user(&state.pool, UserRole::Customer).await?;
    let stranger = common::insert_user(&state.pool, UserRole::Customer).await?;
    let category_id = common::insert_category(&state.pool).await?;
    let product_id = common::insert_product(&state.pool, category_id, 5000).await?;
    let address_id = common::insert_address(&state.pool, stranger.user_id).await?;

    let result = checkout_service::finish(
        &state,
        &buyer,
        FinishCartRequest {
            cart: vec![CartLine { product_id, quantity: 1 }],
            address_id,
        },
    )
    .await;

    let Err(err) = result else {
        panic!("checkout with a foreign address must fail");
    };
    assert!(matches!(err, AppError::NotFound));
    assert_eq!(orders_of(&state, &buyer).await?, 0);
    Ok(())
}

#[tokio::test]
async fn checkout_with_unknown_product_writes_no_order() -> anyhow::Result<()> {
    let Some(state) = db_state().await? else {
        return Ok(());
    };
    let buyer = common::insert_user(&state.pool, UserRole::Customer).await?;
    let category_id = common::insert_category(&state.pool).await?;
    let product_id = common::insert_product(&state.pool, category_id, 5000).await?;
    let address_id = common::insert_address(&state.pool, buyer.user_id).await?;

    let result = checkout_service::finish(
        &state,
        &buyer,
        FinishCartRequest {
            cart: vec![
                CartLine { product_id, quantity: 1 },
                CartLine { product_id: Uuid::new_v4(), quantity: 1 },
            ],
            address_id,
        },
    )
    .await;

    let Err(err) = result else {
        panic!("checkout with an unknown product must fail");
    };
    assert!(matches!(err, AppError::BadRequest(ref msg) if msg == "Some products were not found"));
    assert_eq!(orders_of(&state, &buyer).await?, 0);
    Ok(())
}

#[tokio::test]
async fn order_keeps_checkout_prices_after_repricing() -> anyhow::Result<()> {
    let Some(state) = db_state().await? else {
        return Ok(());
    };
    let buyer = common::insert_user(&state.pool, UserRole::Customer).await?;
    let category_id = common::insert_category(&state.pool).await?;
    let shirt = common::insert_product(&state.pool, category_id, 4990).await?;
    let mug = common::insert_product(&state.pool, category_id, 2356).await?;
    let address_id = common::insert_address(&state.pool, buyer.user_id).await?;

    let started = checkout_service::finish(
        &state,
        &buyer,
        FinishCartRequest {
            cart: vec![
                CartLine { product_id: shirt, quantity: 2 },
                CartLine { product_id: mug, quantity: 1 },
            ],
            address_id,
        },
    )
    .await?
    .data
    .expect("checkout data");

    sqlx::query("UPDATE products SET price = price * 3 WHERE id = ANY($1)")
        .bind(vec![shirt, mug])
        .execute(&state.pool)
        .await?;

    let total: i64 = sqlx::query_scalar("SELECT total FROM orders WHERE id = $1")
        .bind(started.order_id)
        .fetch_one(&state.pool)
        .await?;
    // 2 x 4990 + 2356 plus the configured flat shipping
    assert_eq!(total, 13336);

    let mut prices: Vec<i64> =
        sqlx::query_scalar("SELECT price FROM order_items WHERE order_id = $1")
            .bind(started.order_id)
            .fetch_all(&state.pool)
            .await?;
    prices.sort_unstable();
    assert_eq!(prices, vec![2356, 4990]);
    Ok(())
}

#[tokio::test]
async fn failed_payment_intent_cancels_pending_order() -> anyhow::Result<()> {
    let Some(state) = db_state().await? else {
        return Ok(());
    };
    let buyer = common::insert_user(&state.pool, UserRole::Customer).await?;
    let category_id = common::insert_category(&state.pool).await?;
    let product_id = common::insert_product(&state.pool, category_id, 5000).await?;
    let address_id = common::insert_address(&state.pool, buyer.user_id).await?;

    let started = checkout_service::finish(
        &state,
        &buyer,
        FinishCartRequest {
            cart: vec![CartLine { product_id, quantity: 1 }],
            address_id,
        },
    )
    .await?
    .data
    .expect("checkout data");

    // A PaymentIntent carries the order id in its own metadata
    let event = serde_json::json!({
        "id": "evt_pi_failed",
        "type": "payment_intent.payment_failed",
        "data": { "object": {
            "id": "pi_failed",
            "metadata": { "orderId": started.order_id.to_string() }
        }}
    })
    .to_string();
    let header = common::sign(event.as_bytes());

    let outcome = handle_stripe_event(&state, Some(&header), event.as_bytes()).await?;
    assert!(matches!(
        outcome,
        WebhookOutcome::Applied(StatusChange::Updated {
            from: OrderStatus::Pending,
            to: OrderStatus::Cancelled
        })
    ));

    let (status, sales): (String, i64) = sqlx::query_as(
        "SELECT o.status, p.sales_count FROM orders o, products p WHERE o.id = $1 AND p.id = $2",
    )
    .bind(started.order_id)
    .bind(product_id)
    .fetch_one(&state.pool)
    .await?;
    assert_eq!(status, "cancelled");
    assert_eq!(sales, 0);
    Ok(())
}

#[tokio::test]
async fn second_rating_for_same_product_is_rejected() -> anyhow::Result<()> {
    let Some(state) = db_state().await? else {
        return Ok(());
    };
    let buyer = common::insert_user(&state.pool, UserRole::Customer).await?;
    let category_id = common::insert_category(&state.pool).await?;
    let product_id = common::insert_product(&state.pool, category_id, 5000).await?;

    rating_service::create_rating(
        &state,
        &buyer,
        product_id,
        CreateRatingRequest {
            rating: 5,
            comment: Some("Great fit".into()),
        },
    )
    .await?;

    let second = rating_service::create_rating(
        &state,
        &buyer,
        product_id,
        CreateRatingRequest {
            rating: 1,
            comment: None,
        },
    )
    .await;

    let Err(err) = second else {
        panic!("a second rating must be rejected");
    };
    assert!(
        matches!(err, AppError::BadRequest(ref msg) if msg == "You have already rated this product")
    );

    let stored: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM product_ratings WHERE product_id = $1 AND user_id = $2",
    )
    .bind(product_id)
    .bind(buyer.user_id)
    .fetch_one(&state.pool)
    .await?;
    assert_eq!(stored, 1);
    Ok(())
}

#[tokio::test]
async fn duplicate_variant_size_is_rejected() -> anyhow::Result<()> {
    let Some(state) = db_state().await? else {
        return Ok(());
    };
    let admin = common::insert_user(&state.pool, UserRole::Admin).await?;
    let category_id = common::insert_category(&state.pool).await?;
    let product_id = common::insert_product(&state.pool, category_id, 5000).await?;

    products::add_variant(
        &state,
        &admin,
        product_id,
        AddVariantRequest {
            size: "M".into(),
            stock: 10,
        },
    )
    .await?;

    let duplicate = products::add_variant(
        &state,
        &admin,
        product_id,
        AddVariantRequest {
            size: " M ".into(),
            stock: 3,
        },
    )
    .await;

    let Err(err) = duplicate else {
        panic!("a second variant with the same size must be rejected");
    };
    assert!(matches!(err, AppError::BadRequest(_)));

    let stock: i32 =
        sqlx::query_scalar("SELECT stock FROM product_variants WHERE product_id = $1 AND size = 'M'")
            .bind(product_id)
            .fetch_one(&state.pool)
            .await?;
    assert_eq!(stock, 10);
    Ok(())
}

#[tokio::test]
async fn moving_product_to_another_category_clears_its_metadata() -> anyhow::Result<()> {
    let Some(state) = db_state().await? else {
        return Ok(());
    };
    let admin = common::insert_user(&state.pool, UserRole::Admin).await?;
    let shirts = common::insert_category(&state.pool).await?;
    let mugs = common::insert_category(&state.pool).await?;
    let product_id = common::insert_product(&state.pool, shirts, 5000).await?;
    let (facet_id, value_id) = common::insert_facet(&state.pool, shirts).await?;

    products::set_metadata(
        &state,
        &admin,
        product_id,
        SetMetadataRequest {
            values: vec![MetadataAssignment {
                category_metadata_id: facet_id,
                metadata_value_id: value_id,
            }],
        },
    )
    .await?;

    // Same category: assignment stays
    products::update_product(
        &state,
        &admin,
        product_id,
        UpdateProductRequest {
            category_id: Some(shirts),
            ..Default::default()
        },
    )
    .await?;
    assert_eq!(metadata_rows(&state, product_id).await?, 1);

    products::update_product(
        &state,
        &admin,
        product_id,
        UpdateProductRequest {
            category_id: Some(mugs),
            ..Default::default()
        },
    )
    .await?;
    assert_eq!(metadata_rows(&state, product_id).await?, 0);

    let category: Uuid = sqlx::query_scalar("SELECT category_id FROM products WHERE id = $1")
        .bind(product_id)
        .fetch_one(&state.pool)
        .await?;
    assert_eq!(category, mugs);
    Ok(())
}
