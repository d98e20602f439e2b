mod common;

use devstore_api::{
    dto::cart::{CartLine, FinishCartRequest},
    entity::sea_orm_active_enums::{OrderStatus, UserRole},
    services::{
        checkout_service, order_service,
        order_status_service::StatusChange,
        webhook_service::{WebhookOutcome, handle_stripe_event},
    },
    state::AppState,
};

// Integration flow: checkout creates a pending order, the signed webhook pays it once.
#[tokio::test]
async fn checkout_then_webhook_marks_order_paid_once() -> anyhow::Result<()> {
    let Some(database_url) = common::database_url() else {
        eprintln!("Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests.");
        return Ok(());
    };

    let stripe_base = common::spawn_fake_stripe().await?;
    let state = setup_state(&database_url, &stripe_base).await?;

    let buyer = common::insert_user(&state.pool, UserRole::Customer).await?;
    let category_id = common::insert_category(&state.pool).await?;
    let product_id = common::insert_product(&state.pool, category_id, 5000).await?;
    let address_id = common::insert_address(&state.pool, buyer.user_id).await?;

    let started = checkout_service::finish(
        &state,
        &buyer,
        FinishCartRequest {
            cart: vec![
                CartLine { product_id, quantity: 2 },
                CartLine { product_id, quantity: 1 },
            ],
            address_id,
        },
    )
    .await?;
    let started = started.data.expect("checkout data");

    let (status, total, session): (String, i64, Option<String>) =
        sqlx::query_as("SELECT status, total, stripe_session_id FROM orders WHERE id = $1")
            .bind(started.order_id)
            .fetch_one(&state.pool)
            .await?;
    let session = session.expect("stored session id");
    assert_eq!(status, "pending");
    // 3 x 5000 plus the configured flat shipping
    assert_eq!(total, 16000);
    assert!(session.starts_with("cs_test_"));
    assert!(started.url.ends_with(&session));

    let resolved = order_service::order_by_session(&state, &buyer, &session).await?;
    assert_eq!(resolved.data.expect("order id").order_id, started.order_id);

    let event = serde_json::json!({
        "id": "evt_flow",
        "type": "checkout.session.completed",
        "data": { "object": {
            "id": session,
            "metadata": { "orderId": started.order_id.to_string() },
            "payment_intent": "pi_flow"
        }}
    })
    .to_string();
    let header = common::sign(event.as_bytes());

    let first = handle_stripe_event(&state, Some(&header), event.as_bytes()).await?;
    assert!(matches!(
        first,
        WebhookOutcome::Applied(StatusChange::Updated {
            from: OrderStatus::Pending,
            to: OrderStatus::Paid
        })
    ));

    let replay = handle_stripe_event(&state, Some(&header), event.as_bytes()).await?;
    assert!(matches!(
        replay,
        WebhookOutcome::Applied(StatusChange::Unchanged)
    ));

    let sales: i64 = sqlx::query_scalar("SELECT sales_count FROM products WHERE id = $1")
        .bind(product_id)
        .fetch_one(&state.pool)
        .await?;
    assert_eq!(sales, 3);

    let (status, payment): (String, Option<String>) =
        sqlx::query_as("SELECT status, stripe_payment_id FROM orders WHERE id = $1")
            .bind(started.order_id)
            .fetch_one(&state.pool)
            .await?;
    assert_eq!(status, "paid");
    assert_eq!(payment.as_deref(), Some("pi_flow"));

    let history: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM order_status_history WHERE order_id = $1")
            .bind(started.order_id)
            .fetch_one(&state.pool)
            .await?;
    assert_eq!(history, 2);

    Ok(())
}

async fn setup_state(database_url: &str, stripe_base: &str) -> anyhow::Result<AppState> {
    let state = common::connect_state(database_url, stripe_base).await?;

    // Clean tables between runs
    sqlx::query(
        "TRUNCATE TABLE order_status_history, order_items, orders, favorites, product_ratings, product_metadata, product_variants, product_images, products, metadata_values, category_metadata, categories, user_addresses, audit_logs, users RESTART IDENTITY CASCADE",
    )
    .execute(&state.pool)
    .await?;

    Ok(state)
}
