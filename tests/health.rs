mod common;

use axum::extract::State;
use devstore_api::routes::health::health_check;

#[tokio::test]
async fn health_check_returns_ok_without_database() {
    let response = health_check(State(common::offline_state())).await;
    assert_eq!(response.0.message, "Health check");

    let value = serde_json::to_value(response.0.data.expect("health data")).expect("json");
    assert_eq!(value["status"], "ok");
    assert_eq!(value["database"], "unavailable");
}
