use chrono::Utc;
use secrecy::ExposeSecret;
use uuid::Uuid;

use crate::{
    entity::sea_orm_active_enums::OrderStatus,
    error::{AppError, AppResult},
    payments::{StripeEvent, status_for_event, verify_webhook},
    services::order_status_service::{StatusChange, apply_status},
    state::AppState,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    Ignored,
    Applied(StatusChange),
}

pub async fn handle_stripe_event(
    state: &AppState,
    signature: Option<&str>,
    payload: &[u8],
) -> AppResult<WebhookOutcome> {
    let signature =
        signature.ok_or_else(|| AppError::BadRequest("Missing Stripe signature".into()))?;
    let secret = state
        .config
        .stripe
        .webhook_secret
        .as_ref()
        .ok_or_else(|| AppError::BadRequest("Missing Stripe webhook secret".into()))?;

    verify_webhook(
        payload,
        signature,
        secret.expose_secret(),
        Utc::now().timestamp(),
    )
    .map_err(|err| {
        tracing::warn!(error = %err, "rejected webhook");
        AppError::BadRequest("Invalid Stripe signature".into())
    })?;

    let event: StripeEvent = serde_json::from_slice(payload)
        .map_err(|_| AppError::BadRequest("Invalid event payload".into()))?;

    let Some(status) = status_for_event(&event.event_type) else {
        tracing::debug!(event_id = %event.id, event_type = %event.event_type, "ignoring webhook event");
        return Ok(WebhookOutcome::Ignored);
    };

    let order_id = event
        .order_id()
        .and_then(|id| Uuid::parse_str(id).ok())
        .ok_or_else(|| AppError::BadRequest("Invalid order ID".into()))?;

    let payment_id = match status {
        OrderStatus::Paid => event.data.object.payment_intent.clone(),
        _ => None,
    };

    let change = apply_status(state, order_id, status, payment_id).await?;
    tracing::info!(
        event_id = %event.id,
        event_type = %event.event_type,
        %order_id,
        ?change,
        "webhook applied"
    );
    Ok(WebhookOutcome::Applied(change))
}

