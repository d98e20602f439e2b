//! Stripe client for hosted checkout sessions and webhook verification.
//!
//! Talks to the REST API directly with form-encoded requests:
//! - `POST /v1/checkout/sessions` creates a session
//! - `GET /v1/checkout/sessions/{id}` retrieves one

mod types;
pub mod webhook;

pub use types::*;
pub use webhook::{status_for_event, verify_webhook};

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use uuid::Uuid;

use crate::config::StripeConfig;

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    #[error("Payment processor is not configured: {0}")]
    MissingSecret(&'static str),
}

#[derive(Clone)]
pub struct StripeClient {
    inner: Arc<StripeClientInner>,
}

struct StripeClientInner {
    client: reqwest::Client,
    secret_key: SecretString,
    api_base: String,
    currency: String,
    frontend_url: String,
}

impl StripeClient {
    pub fn new(config: &StripeConfig, frontend_url: &str) -> Result<Self, PaymentError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self {
            inner: Arc::new(StripeClientInner {
                client,
                secret_key: config.secret_key.clone(),
                api_base: config.api_base.trim_end_matches('/').to_string(),
                currency: config.currency.to_lowercase(),
                frontend_url: frontend_url.trim_end_matches('/').to_string(),
            }),
        })
    }

    /// Create a hosted checkout session for an order.
    pub async fn create_checkout_session(
        &self,
        lines: &[CheckoutLine],
        shipping_cost: i64,
        order_id: Uuid,
    ) -> Result<CheckoutSession, PaymentError> {
        let key = self.secret_key()?;
        let form = session_form(
            lines,
            shipping_cost,
            order_id,
            &self.inner.currency,
            &self.inner.frontend_url,
        );
        let url = format!("{}/v1/checkout/sessions", self.inner.api_base);

        let response = self
            .inner
            .client
            .post(&url)
            .bearer_auth(key)
            .form(&form)
            .send()
            .await?;
        let session: CheckoutSession = self.handle_response(response).await?;

        tracing::info!(%order_id, session_id = %session.id, "checkout session created");
        Ok(session)
    }

    pub async fn retrieve_checkout_session(
        &self,
        session_id: &str,
    ) -> Result<CheckoutSession, PaymentError> {
        let key = self.secret_key()?;
        let url = format!("{}/v1/checkout/sessions/{session_id}", self.inner.api_base);
        let response = self.inner.client.get(&url).bearer_auth(key).send().await?;
        self.handle_response(response).await
    }

    fn secret_key(&self) -> Result<&str, PaymentError> {
        let key = self.inner.secret_key.expose_secret();
        if key.is_empty() {
            return Err(PaymentError::MissingSecret("STRIPE_SECRET_KEY"));
        }
        Ok(key)
    }

    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, PaymentError> {
        let status = response.status();

        if status.is_success() {
            return response
                .json()
                .await
                .map_err(|e| PaymentError::Parse(format!("Failed to parse response: {e}")));
        }

        Err(self.parse_error(response).await)
    }

    async fn parse_error(&self, response: reqwest::Response) -> PaymentError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<types::ApiErrorBody>(&body)
            .ok()
            .and_then(|b| b.error.message)
            .unwrap_or(body);
        PaymentError::Api { status, message }
    }
}

/// Build the form-encoded body of a checkout-session request.
fn session_form(
    lines: &[CheckoutLine],
    shipping_cost: i64,
    order_id: Uuid,
    currency: &str,
    frontend_url: &str,
) -> Vec<(String, String)> {
    let mut form: Vec<(String, String)> = vec![
        ("mode".into(), "payment".into()),
        (format!("metadata[{ORDER_ID_KEY}]"), order_id.to_string()),
        // PaymentIntent events only see the intent's own metadata
        (
            format!("payment_intent_data[metadata][{ORDER_ID_KEY}]"),
            order_id.to_string(),
        ),
        (
            "success_url".into(),
            format!("{frontend_url}/cart/success?session_id={{CHECKOUT_SESSION_ID}}"),
        ),
        ("cancel_url".into(), format!("{frontend_url}/my-orders")),
    ];

    let shipping = (shipping_cost > 0).then(|| CheckoutLine {
        name: "Shipping".into(),
        unit_amount: shipping_cost,
        quantity: 1,
    });

    for (i, line) in lines.iter().chain(shipping.iter()).enumerate() {
        let prefix = format!("line_items[{i}]");
        form.push((format!("{prefix}[price_data][currency]"), currency.into()));
        form.push((
            format!("{prefix}[price_data][unit_amount]"),
            line.unit_amount.to_string(),
        ));
        form.push((
            format!("{prefix}[price_data][product_data][name]"),
            line.name.clone(),
        ));
        form.push((format!("{prefix}[quantity]"), line.quantity.to_string()));
    }

    form
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value<'a>(form: &'a [(String, String)], key: &str) -> Option<&'a str> {
        form.iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn form_contains_lines_shipping_and_metadata() {
        let order_id = Uuid::new_v4();
        let lines = vec![CheckoutLine {
            name: "React T-shirt".into(),
            unit_amount: 4990,
            quantity: 2,
        }];
        let form = session_form(&lines, 1000, order_id, "brl", "http://shop.dev");

        assert_eq!(value(&form, "mode"), Some("payment"));
        assert_eq!(
            value(&form, "metadata[orderId]"),
            Some(order_id.to_string().as_str())
        );
        assert_eq!(
            value(&form, "payment_intent_data[metadata][orderId]"),
            Some(order_id.to_string().as_str())
        );
        assert_eq!(
            value(&form, "line_items[0][price_data][unit_amount]"),
            Some("4990")
        );
        assert_eq!(value(&form, "line_items[0][quantity]"), Some("2"));
        assert_eq!(
            value(&form, "line_items[1][price_data][product_data][name]"),
            Some("Shipping")
        );
        assert_eq!(
            value(&form, "line_items[1][price_data][unit_amount]"),
            Some("1000")
        );
        assert_eq!(
            value(&form, "success_url"),
            Some("http://shop.dev/cart/success?session_id={CHECKOUT_SESSION_ID}")
        );
        assert_eq!(value(&form, "cancel_url"), Some("http://shop.dev/my-orders"));
    }

    #[test]
    fn free_shipping_adds_no_line() {
        let lines = vec![CheckoutLine {
            name: "Mug".into(),
            unit_amount: 1500,
            quantity: 1,
        }];
        let form = session_form(&lines, 0, Uuid::new_v4(), "brl", "http://shop.dev");
        assert!(value(&form, "line_items[1][quantity]").is_none());
    }

    #[tokio::test]
    async fn missing_secret_key_fails_before_any_request() {
        let config = StripeConfig {
            secret_key: SecretString::from(""),
            webhook_secret: None,
            api_base: "http://127.0.0.1:9".into(),
            currency: "brl".into(),
        };
        let client = StripeClient::new(&config, "http://shop.dev").unwrap();
        let result = client.retrieve_checkout_session("cs_test").await;
        assert!(matches!(result, Err(PaymentError::MissingSecret(_))));
    }
}
