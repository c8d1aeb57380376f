//! HS256 bearer-token authentication.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use clipvote_models::User;

use crate::config::JwtConfig;
use crate::error::ApiError;
use crate::state::AppState;

/// Claims embedded in every access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user's id as a string
    pub sub: String,
    /// The user's internal id
    pub user_id: i64,
    /// The user's email
    pub email: String,
    /// Issuer
    pub iss: String,
    /// Expiration (UTC Unix timestamp)
    pub exp: i64,
    /// Issued-at (UTC Unix timestamp)
    pub iat: i64,
}

/// Mints and verifies HS256 tokens signed with a shared secret.
#[derive(Debug, Clone)]
pub struct TokenManager {
    secret: String,
    issuer: String,
    expiry_hours: i64,
}

impl TokenManager {
    pub fn new(config: JwtConfig) -> Self {
        Self {
            secret: config.secret,
            issuer: config.issuer,
            expiry_hours: config.expiry_hours,
        }
    }

    /// Mint a token for a user.
    pub fn create_token(&self, user: &User) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user.id.to_string(),
            user_id: user.id,
            email: user.email.clone(),
            iss: self.issuer.clone(),
            exp: now + self.expiry_hours * 3600,
            iat: now,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
    }

    /// Verify signature, expiry and issuer, returning the claims.
    pub fn verify_token(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.issuer]);

        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )?;
        Ok(data.claims)
    }
}

/// Authenticated caller extracted from the `Authorization` header.
///
/// Carries the raw token and its expiry so logout can push the exact token
/// onto the denylist.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i64,
    pub email: String,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized("missing or invalid authorization header"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::unauthorized("missing or invalid authorization header"))?;

        if state.sessions.is_revoked(token) {
            return Err(ApiError::unauthorized("token revoked"));
        }

        let claims = state
            .jwt
            .verify_token(token)
            .map_err(|_| ApiError::unauthorized("invalid token"))?;

        let expires_at = Utc
            .timestamp_opt(claims.exp, 0)
            .single()
            .unwrap_or_else(Utc::now);

        Ok(AuthUser {
            user_id: claims.user_id,
            email: claims.email,
            token: token.to_string(),
            expires_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager(issuer: &str) -> TokenManager {
        TokenManager::new(JwtConfig {
            secret: "test-secret".to_string(),
            issuer: issuer.to_string(),
            expiry_hours: 24,
        })
    }

    fn user() -> User {
        User {
            id: 42,
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            password_hash: String::new(),
            city: "London".to_string(),
            country: "UK".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_token_round_trip() {
        let manager = manager("clipvote");
        let token = manager.create_token(&user()).unwrap();

        let claims = manager.verify_token(&token).unwrap();
        assert_eq!(claims.user_id, 42);
        assert_eq!(claims.sub, "42");
        assert_eq!(claims.email, "ada@example.com");
        assert_eq!(claims.iss, "clipvote");
    }

    #[test]
    fn test_wrong_issuer_rejected() {
        let token = manager("other-service").create_token(&user()).unwrap();
        assert!(manager("clipvote").verify_token(&token).is_err());
    }

    #[test]
    fn test_tampered_token_rejected() {
        let manager = manager("clipvote");
        let mut token = manager.create_token(&user()).unwrap();
        token.push('x');
        assert!(manager.verify_token(&token).is_err());
    }
}
