use hmac::{Hmac, Mac};
use sha2::Sha256;

use super::PaymentError;
use crate::entity::sea_orm_active_enums::OrderStatus;

/// Maximum age of a signed webhook, in seconds.
pub const TOLERANCE_SECS: i64 = 300;

/// Verify a `Stripe-Signature` header (`t=<unix>,v1=<hex>[,v1=<hex>...]`)
/// against the raw request body.
pub fn verify_webhook(
    payload: &[u8],
    header: &str,
    secret: &str,
    now: i64,
) -> Result<(), PaymentError> {
    let mut timestamp: Option<&str> = None;
    let mut signatures: Vec<&str> = Vec::new();
    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => timestamp = Some(value),
            Some(("v1", value)) => signatures.push(value),
            _ => {}
        }
    }

    let timestamp =
        timestamp.ok_or_else(|| PaymentError::InvalidSignature("missing timestamp".into()))?;
    let ts: i64 = timestamp
        .parse()
        .map_err(|_| PaymentError::InvalidSignature("invalid timestamp".into()))?;
    if (now - ts).abs() > TOLERANCE_SECS {
        return Err(PaymentError::InvalidSignature(
            "timestamp outside tolerance".into(),
        ));
    }
    if signatures.is_empty() {
        return Err(PaymentError::InvalidSignature("missing v1 signature".into()));
    }

    for candidate in signatures {
        let Ok(expected) = hex::decode(candidate) else {
            continue;
        };
        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
            .map_err(|e| PaymentError::InvalidSignature(e.to_string()))?;
        mac.update(timestamp.as_bytes());
        mac.update(b".");
        mac.update(payload);
        // verify_slice compares in constant time
        if mac.verify_slice(&expected).is_ok() {
            return Ok(());
        }
    }

    Err(PaymentError::InvalidSignature("signature mismatch".into()))
}

/// Order status an event type drives the order to, if any.
pub fn status_for_event(event_type: &str) -> Option<OrderStatus> {
    match event_type {
        "checkout.session.completed" | "checkout.session.async_payment_succeeded" => {
            Some(OrderStatus::Paid)
        }
        "checkout.session.expired"
        | "checkout.session.async_payment_failed"
        | "payment_intent.payment_failed" => Some(OrderStatus::Cancelled),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_test_secret";

    fn sign(payload: &str, ts: i64) -> String {
        let mut mac = Hmac::<Sha256>::new_from_slice(SECRET.as_bytes()).unwrap();
        mac.update(format!("{ts}.{payload}").as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    #[test]
    fn accepts_valid_signature() {
        let payload = r#"{"id":"evt_1"}"#;
        let now = 1_700_000_000;
        let header = format!("t={now},v1={}", sign(payload, now));
        assert!(verify_webhook(payload.as_bytes(), &header, SECRET, now).is_ok());
    }

    #[test]
    fn accepts_any_matching_v1_entry() {
        let payload = "{}";
        let now = 1_700_000_000;
        let header = format!("t={now},v1=deadbeef,v1={},v0=ignored", sign(payload, now));
        assert!(verify_webhook(payload.as_bytes(), &header, SECRET, now).is_ok());
    }

    #[test]
    fn rejects_tampered_payload() {
        let now = 1_700_000_000;
        let header = format!("t={now},v1={}", sign(r#"{"amount":1}"#, now));
        let result = verify_webhook(br#"{"amount":2}"#, &header, SECRET, now);
        assert!(matches!(result, Err(PaymentError::InvalidSignature(_))));
    }

    #[test]
    fn rejects_wrong_secret() {
        let payload = "{}";
        let now = 1_700_000_000;
        let header = format!("t={now},v1={}", sign(payload, now));
        assert!(verify_webhook(payload.as_bytes(), &header, "whsec_other", now).is_err());
    }

    #[test]
    fn rejects_stale_timestamp() {
        let payload = "{}";
        let signed_at = 1_700_000_000;
        let header = format!("t={signed_at},v1={}", sign(payload, signed_at));
        let later = signed_at + TOLERANCE_SECS + 1;
        assert!(verify_webhook(payload.as_bytes(), &header, SECRET, later).is_err());
    }

    #[test]
    fn rejects_malformed_header() {
        assert!(verify_webhook(b"{}", "garbage", SECRET, 0).is_err());
        assert!(verify_webhook(b"{}", "t=abc,v1=00", SECRET, 0).is_err());
        assert!(verify_webhook(b"{}", "t=0", SECRET, 0).is_err());
    }

    #[test]
    fn maps_event_types_to_statuses() {
        assert_eq!(
            status_for_event("checkout.session.completed"),
            Some(OrderStatus::Paid)
        );
        assert_eq!(
            status_for_event("checkout.session.async_payment_succeeded"),
            Some(OrderStatus::Paid)
        );
        assert_eq!(
            status_for_event("checkout.session.expired"),
            Some(OrderStatus::Cancelled)
        );
        assert_eq!(
            status_for_event("payment_intent.payment_failed"),
            Some(OrderStatus::Cancelled)
        );
        assert_eq!(status_for_event("customer.created"), None);
    }
}
