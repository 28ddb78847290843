//! Identity: OAuth login, session tokens and the request guard.

pub mod cookies;
pub mod google;
pub mod provider;
pub mod session;

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

pub use google::GoogleOAuth;
pub use provider::{IdentityProvider, OAuthProfile};
pub use session::{AuthUser, SessionTokens, SESSION_COOKIE};

use crate::error::Error;
use crate::AppState;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Missing session credential")]
    MissingCredential,
    #[error("Invalid Authorization header format")]
    InvalidFormat,
    #[error("Invalid token: {0}")]
    InvalidToken(String),
    #[error("Token signing failed: {0}")]
    Signing(String),
    #[error("OAuth provider error: {0}")]
    Provider(String),
}

impl From<AuthError> for Error {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingCredential => {
                Error::Unauthenticated("Authentication required".to_string())
            }
            AuthError::InvalidFormat | AuthError::InvalidToken(_) => {
                Error::Unauthenticated("Invalid or expired token".to_string())
            }
            AuthError::Signing(_) | AuthError::Provider(_) => Error::Internal(err.to_string()),
        }
    }
}

/// Middleware that requires a valid session and exposes it as an
/// [`AuthUser`] request extension.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    match state.sessions.authenticate(request.headers()) {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => {
            tracing::debug!("Rejected request to {}: {}", request.uri().path(), e);
            Error::from(e).into_response()
        }
    }
}
