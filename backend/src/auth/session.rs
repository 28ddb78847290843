use axum::http::{header, HeaderMap, HeaderValue};
use axum_extra::extract::cookie::CookieJar;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use connect_common::UserId;

use super::cookies;
use super::AuthError;
use crate::config::AuthConfig;

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "token";

/// Authenticated principal attached to every protected request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: UserId,
    pub email: String,
}

/// JWT claims.
#[derive(Debug, Deserialize, Serialize)]
struct Claims {
    #[serde(rename = "userId")]
    user_id: UserId,
    email: String,
    exp: u64,
    iat: u64,
}

/// Issues and verifies HS256 session tokens.
pub struct SessionTokens {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl SessionTokens {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(&config.jwt_secret, Duration::days(config.token_ttl_days))
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Sign a token for `user_id` valid for the configured lifetime.
    pub fn issue(&self, user_id: UserId, email: &str) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            user_id,
            email: email.to_string(),
            exp: (now + self.ttl).timestamp() as u64,
            iat: now.timestamp() as u64,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Signing(e.to_string()))
    }

    pub fn verify(&self, token: &str) -> Result<AuthUser, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_aud = false;

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

        Ok(AuthUser {
            id: token_data.claims.user_id,
            email: token_data.claims.email,
        })
    }

    /// Authenticate a request from its session cookie, falling back to a
    /// Bearer token. A cookie that fails to verify does not mask a valid
    /// Bearer header.
    pub fn authenticate(&self, headers: &HeaderMap) -> Result<AuthUser, AuthError> {
        let jar = CookieJar::from_headers(headers);
        let from_cookie = cookies::value(&jar, SESSION_COOKIE).map(|token| self.verify(token));

        match (from_cookie, headers.get(header::AUTHORIZATION)) {
            (Some(Ok(user)), _) => Ok(user),
            (Some(Err(e)), None) => Err(e),
            (_, Some(value)) => self.verify_bearer(value),
            (None, None) => Err(AuthError::MissingCredential),
        }
    }

    fn verify_bearer(&self, value: &HeaderValue) -> Result<AuthUser, AuthError> {
        let token = value
            .to_str()
            .map_err(|_| AuthError::InvalidFormat)?
            .strip_prefix("Bearer ")
            .ok_or(AuthError::InvalidFormat)?;
        self.verify(token)
    }
}
