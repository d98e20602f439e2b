mod common;

use axum::{
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use devstore_api::{
    entity::sea_orm_active_enums::UserRole, middleware::auth::issue_token, routes::build_app,
};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

async fn send(request: Request<Body>) -> (StatusCode, Value, Option<String>) {
    let app = build_app(common::offline_state());
    let response = app.oneshot(request).await.expect("response");
    let status = response.status();
    let request_id = response
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body, request_id)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).expect("request")
}

#[tokio::test]
async fn unknown_path_falls_back_to_not_found() {
    let (status, body, _) = send(get("/api/nope")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Not Found");
    assert_eq!(body["data"]["path"], "/api/nope");
}

#[tokio::test]
async fn responses_carry_a_request_id() {
    let (_, _, request_id) = send(get("/api/nope")).await;
    assert!(request_id.is_some_and(|id| !id.is_empty()));
}

#[tokio::test]
async fn profile_requires_a_bearer_token() {
    let (status, _, _) = send(get("/api/user/profile")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn garbage_token_is_rejected() {
    let request = Request::builder()
        .uri("/api/orders")
        .header("authorization", "Bearer not-a-jwt")
        .body(Body::empty())
        .expect("request");
    let (status, _, _) = send(request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn customers_cannot_reach_admin_routes() {
    let state = common::offline_state();
    let token = issue_token(&state.config, Uuid::new_v4(), UserRole::Customer).expect("token");

    for uri in [
        "/api/admin/dashboard/metrics",
        "/api/admin/products",
        "/api/admin/orders/stats",
        "/api/admin/favorites",
    ] {
        let request = Request::builder()
            .uri(uri)
            .header("authorization", format!("Bearer {token}"))
            .body(Body::empty())
            .expect("request");
        let (status, _, _) = send(request).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{uri}");
    }
}

#[tokio::test]
async fn shipping_quote_validates_zipcode() {
    let (status, body, _) = send(get("/api/cart/shipping?zipcode=123")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());

    let (status, body, _) = send(get("/api/cart/shipping?zipcode=01310100")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["cost"], 1000);
    assert_eq!(body["data"]["days"], 3);
}

#[tokio::test]
async fn webhook_without_signature_is_rejected() {
    let request = Request::builder()
        .method("POST")
        .uri("/webhook/stripe")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"type":"checkout.session.completed"}"#))
        .expect("request");
    let (status, _, _) = send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn webhook_with_bad_signature_is_rejected() {
    let request = Request::builder()
        .method("POST")
        .uri("/webhook/stripe")
        .header("stripe-signature", "t=1,v1=deadbeef")
        .body(Body::from(r#"{"type":"checkout.session.completed"}"#))
        .expect("request");
    let (status, _, _) = send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn oversized_bodies_are_refused() {
    let payload = vec![b'a'; 2 * 1024 * 1024];
    let request = Request::builder()
        .method("POST")
        .uri("/api/cart/mount")
        .header("content-type", "application/json")
        .header("content-length", payload.len())
        .body(Body::from(payload))
        .expect("request");
    let (status, _, _) = send(request).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
}
