use axum::{extract::FromRequestParts, http::header, http::request::Parts};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::ExposeSecret;
use uuid::Uuid;

use crate::{
    config::AppConfig,
    dto::auth::Claims,
    entity::sea_orm_active_enums::UserRole,
    error::AppError,
    state::AppState,
};

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub role: UserRole,
}

/// Authenticated caller when a valid bearer token is present, `None` otherwise.
#[derive(Debug, Clone)]
pub struct OptionalAuthUser(pub Option<AuthUser>);

impl OptionalAuthUser {
    pub fn user_id(&self) -> Option<Uuid> {
        self.0.as_ref().map(|u| u.user_id)
    }
}

pub fn ensure_admin(user: &AuthUser) -> Result<(), AppError> {
    if user.role != UserRole::Admin {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

pub fn issue_token(config: &AppConfig, user_id: Uuid, role: UserRole) -> Result<String, AppError> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(config.jwt_ttl_hours))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: user_id.to_string(),
        role,
        exp: expiration.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.expose_secret().as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

fn decode_token(config: &AppConfig, token: &str) -> Result<AuthUser, AppError> {
    let decoded = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.expose_secret().as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::Unauthorized)?;

    let user_id = Uuid::parse_str(&decoded.claims.sub).map_err(|_| AppError::Unauthorized)?;

    Ok(AuthUser {
        user_id,
        role: decoded.claims.role,
    })
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(AppError::Unauthorized)?;
        decode_token(&state.config, token)
    }
}

impl FromRequestParts<AppState> for OptionalAuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = bearer_token(parts).and_then(|token| decode_token(&state.config, token).ok());
        Ok(OptionalAuthUser(user))
    }
}

#[cfg(test)]
mod tests {
    use secrecy::SecretString;

    use super::*;
    use crate::config::{ShippingConfig, StripeConfig};

    fn config() -> AppConfig {
        AppConfig {
            database_url: "postgres://localhost/devstore".into(),
            host: "127.0.0.1".into(),
            port: 3333,
            base_url: "http://localhost:3333".into(),
            frontend_url: "http://localhost:3000".into(),
            media_dir: "public/media".into(),
            jwt_secret: SecretString::from("test-secret"),
            jwt_ttl_hours: 1,
            stripe: StripeConfig {
                secret_key: SecretString::from(""),
                webhook_secret: None,
                api_base: "https://api.stripe.com".into(),
                currency: "brl".into(),
            },
            shipping: ShippingConfig { cost: 1000, days: 3 },
        }
    }

    #[test]
    fn issued_token_decodes_to_same_user() {
        let config = config();
        let user_id = Uuid::new_v4();
        let token = issue_token(&config, user_id, UserRole::Admin).unwrap();
        let user = decode_token(&config, &token).unwrap();
        assert_eq!(user.user_id, user_id);
        assert_eq!(user.role, UserRole::Admin);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let mut other = config();
        other.jwt_secret = SecretString::from("another-secret");
        let token = issue_token(&other, Uuid::new_v4(), UserRole::Customer).unwrap();
        assert!(matches!(
            decode_token(&config(), &token),
            Err(AppError::Unauthorized)
        ));
    }

    #[test]
    fn ensure_admin_rejects_customers() {
        let customer = AuthUser {
            user_id: Uuid::new_v4(),
            role: UserRole::Customer,
        };
        assert!(matches!(ensure_admin(&customer), Err(AppError::Forbidden)));
        let admin = AuthUser {
            user_id: Uuid::new_v4(),
            role: UserRole::Admin,
        };
        assert!(ensure_admin(&admin).is_ok());
    }
}
