use std::{env, fmt};

use secrecy::SecretString;

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    /// Public origin of this API, used to build absolute media URLs.
    pub base_url: String,
    pub frontend_url: String,
    pub media_dir: String,
    pub jwt_secret: SecretString,
    pub jwt_ttl_hours: i64,
    pub stripe: StripeConfig,
    pub shipping: ShippingConfig,
}

#[derive(Clone)]
pub struct StripeConfig {
    pub secret_key: SecretString,
    pub webhook_secret: Option<SecretString>,
    pub api_base: String,
    pub currency: String,
}

/// Flat shipping quote applied to every order.
#[derive(Debug, Clone, Copy)]
pub struct ShippingConfig {
    pub cost: i64,
    pub days: i32,
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("base_url", &self.base_url)
            .field("frontend_url", &self.frontend_url)
            .field("media_dir", &self.media_dir)
            .field("jwt_secret", &"[REDACTED]")
            .field("jwt_ttl_hours", &self.jwt_ttl_hours)
            .field("stripe", &self.stripe)
            .field("shipping", &self.shipping)
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for StripeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StripeConfig")
            .field("secret_key", &"[REDACTED]")
            .field(
                "webhook_secret",
                &self.webhook_secret.as_ref().map(|_| "[REDACTED]"),
            )
            .field("api_base", &self.api_base)
            .field("currency", &self.currency)
            .finish()
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET must be set"))?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = parse_or("APP_PORT", 3333u16);
        let base_url = env::var("BASE_URL").unwrap_or_else(|_| format!("http://localhost:{port}"));
        let frontend_url =
            env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());
        let media_dir = env::var("MEDIA_DIR").unwrap_or_else(|_| "public/media".to_string());

        let stripe = StripeConfig {
            secret_key: SecretString::from(env::var("STRIPE_SECRET_KEY").unwrap_or_default()),
            webhook_secret: env::var("STRIPE_WEBHOOK_SECRET")
                .ok()
                .filter(|s| !s.is_empty())
                .map(SecretString::from),
            api_base: env::var("STRIPE_API_BASE")
                .unwrap_or_else(|_| "https://api.stripe.com".to_string()),
            currency: env::var("STRIPE_CURRENCY").unwrap_or_else(|_| "brl".to_string()),
        };

        let shipping = ShippingConfig {
            cost: parse_or("SHIPPING_COST", 1000i64),
            days: parse_or("SHIPPING_DAYS", 3i32),
        };

        Ok(Self {
            database_url,
            host,
            port,
            base_url: trim_slash(base_url),
            frontend_url: trim_slash(frontend_url),
            media_dir,
            jwt_secret: SecretString::from(jwt_secret),
            jwt_ttl_hours: parse_or("JWT_TTL_HOURS", 24i64),
            stripe,
            shipping,
        })
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

fn trim_slash(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_hides_secrets() {
        let config = StripeConfig {
            secret_key: SecretString::from("sk_test_123"),
            webhook_secret: Some(SecretString::from("whsec_abc")),
            api_base: "https://api.stripe.com".into(),
            currency: "brl".into(),
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk_test_123"));
        assert!(!debug.contains("whsec_abc"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn trailing_slash_is_removed() {
        assert_eq!(trim_slash("http://localhost:3333/".into()), "http://localhost:3333");
        assert_eq!(trim_slash("http://shop.dev".into()), "http://shop.dev");
    }
}
