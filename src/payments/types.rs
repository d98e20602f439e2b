use std::collections::HashMap;

use serde::Deserialize;

/// One purchasable line of a hosted checkout session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutLine {
    pub name: String,
    /// Minor currency units.
    pub unit_amount: i64,
    pub quantity: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    pub url: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    pub payment_intent: Option<String>,
    pub payment_status: Option<String>,
}

impl CheckoutSession {
    pub fn order_id(&self) -> Option<&str> {
        self.metadata.get(ORDER_ID_KEY).map(String::as_str)
    }
}

/// Metadata key carrying our order id through the processor.
pub const ORDER_ID_KEY: &str = "orderId";

#[derive(Debug, Clone, Deserialize)]
pub struct StripeEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: EventData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventData {
    pub object: EventObject,
}

/// The subset of checkout-session / payment-intent fields the webhook reads.
#[derive(Debug, Clone, Deserialize)]
pub struct EventObject {
    pub id: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    pub payment_intent: Option<String>,
}

impl StripeEvent {
    pub fn order_id(&self) -> Option<&str> {
        self.data
            .object
            .metadata
            .get(ORDER_ID_KEY)
            .map(String::as_str)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorDetail {
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_exposes_order_id_from_metadata() {
        let raw = r#"{
            "id": "evt_1",
            "type": "checkout.session.completed",
            "data": { "object": {
                "id": "cs_test_1",
                "metadata": { "orderId": "4f2b0b8e-3c56-4a57-9d43-7f1b0f1a2c3d" },
                "payment_intent": "pi_123"
            } }
        }"#;
        let event: StripeEvent = serde_json::from_str(raw).unwrap();
        assert_eq!(event.event_type, "checkout.session.completed");
        assert_eq!(
            event.order_id(),
            Some("4f2b0b8e-3c56-4a57-9d43-7f1b0f1a2c3d")
        );
        assert_eq!(event.data.object.payment_intent.as_deref(), Some("pi_123"));
    }

    #[test]
    fn missing_metadata_yields_no_order_id() {
        let raw = r#"{"id":"evt_2","type":"checkout.session.expired","data":{"object":{}}}"#;
        let event: StripeEvent = serde_json::from_str(raw).unwrap();
        assert_eq!(event.order_id(), None);
    }
}
