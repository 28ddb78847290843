use chrono::{DateTime, Utc};
use connect_common::{CurrentUser, UserId, UserProfile};

/// User record created on first OAuth login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub avatar_url: Option<String>,
    /// Identity provider tag, e.g. "google"
    pub oauth_provider: String,
    /// Subject identifier at the provider
    pub oauth_id: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            email: self.email.clone(),
            name: self.name.clone(),
            avatar_url: self.avatar_url.clone(),
            created_at: self.created_at,
        }
    }

    pub fn current(&self) -> CurrentUser {
        CurrentUser {
            id: self.id,
            email: self.email.clone(),
            name: self.name.clone(),
            avatar_url: self.avatar_url.clone(),
            oauth_provider: self.oauth_provider.clone(),
            created_at: self.created_at,
        }
    }
}

/// Fields needed to create a user from a verified provider identity.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub avatar_url: Option<String>,
    pub oauth_provider: String,
    pub oauth_id: String,
}
