use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::HeaderMap,
    routing::post,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    response::{ApiResponse, Meta},
    services::{
        order_status_service::StatusChange,
        webhook_service::{WebhookOutcome, handle_stripe_event},
    },
    state::AppState,
};

const SIGNATURE_HEADER: &str = "stripe-signature";

pub fn router() -> Router<AppState> {
    Router::new().route("/stripe", post(stripe_webhook))
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WebhookAck {
    pub received: bool,
    pub applied: bool,
}

#[utoipa::path(
    post,
    path = "/webhook/stripe",
    request_body(content = String, description = "Raw Stripe event payload", content_type = "application/json"),
    params(("Stripe-Signature" = String, Header, description = "Stripe signature header")),
    responses(
        (status = 200, description = "Event acknowledged", body = ApiResponse<WebhookAck>),
        (status = 400, description = "Missing or invalid signature, or malformed event"),
        (status = 404, description = "Order not found"),
    ),
    tag = "Webhook"
)]
pub async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<ApiResponse<WebhookAck>>> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());

    let outcome = handle_stripe_event(&state, signature, &body).await?;
    let applied = matches!(
        outcome,
        WebhookOutcome::Applied(StatusChange::Updated { .. })
    );

    Ok(Json(ApiResponse::success(
        "Webhook received",
        WebhookAck {
            received: true,
            applied,
        },
        Some(Meta::empty()),
    )))
}
