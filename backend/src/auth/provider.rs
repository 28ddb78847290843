use async_trait::async_trait;

use super::AuthError;
use crate::models::NewUser;

/// Identity verified by an OAuth provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthProfile {
    /// Provider tag, e.g. "google"
    pub provider: String,
    /// Stable subject id at the provider
    pub subject: String,
    pub email: String,
    pub name: String,
    pub avatar_url: Option<String>,
}

impl OAuthProfile {
    pub fn into_new_user(self) -> NewUser {
        NewUser {
            email: self.email,
            name: self.name,
            avatar_url: self.avatar_url,
            oauth_provider: self.provider,
            oauth_id: self.subject,
        }
    }
}

/// OAuth authorization-code login against an external provider.
///
/// Built once at startup and shared through `AppState`.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Provider tag stored on users created through it.
    fn name(&self) -> &str;

    /// URL to send the browser to, carrying the anti-forgery `state`.
    fn authorize_url(&self, state: &str) -> Result<String, AuthError>;

    /// Trade an authorization code for the user's verified profile.
    async fn exchange(&self, code: &str) -> Result<OAuthProfile, AuthError>;
}
