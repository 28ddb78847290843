//! Fixtures shared by unit and integration tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum_extra::extract::cookie::Cookie;

use crate::auth::{AuthError, IdentityProvider, OAuthProfile, SESSION_COOKIE};
use crate::config::{AuthConfig, Config, DatabaseConfig, LoggingConfig, OAuthConfig, ServerConfig};
use crate::models::{NewUser, User};
use crate::store::Store;
use crate::AppState;

pub const TEST_CLIENT_URL: &str = "http://localhost:5173";

pub fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 5000,
        },
        database: DatabaseConfig {
            url: ":memory:".to_string(),
        },
        auth: AuthConfig {
            jwt_secret: "test-secret".to_string(),
            token_ttl_days: 7,
            cookie_secure: false,
        },
        oauth: OAuthConfig {
            client_id: "test-client".to_string(),
            client_secret: "test-client-secret".to_string(),
            redirect_url: "http://localhost:5000/api/auth/google/callback".to_string(),
            auth_url: "https://provider.test/auth".to_string(),
            token_url: "https://provider.test/token".to_string(),
            userinfo_url: "https://provider.test/userinfo".to_string(),
        },
        client_url: TEST_CLIENT_URL.to_string(),
        logging: LoggingConfig {
            level: "debug".to_string(),
        },
    }
}

/// Identity provider that resolves fixed authorization codes to profiles.
#[derive(Default)]
pub struct StaticIdentity {
    profiles: HashMap<String, OAuthProfile>,
}

impl StaticIdentity {
    pub fn with_profile(mut self, code: &str, profile: OAuthProfile) -> Self {
        self.profiles.insert(code.to_string(), profile);
        self
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentity {
    fn name(&self) -> &str {
        "static"
    }

    fn authorize_url(&self, state: &str) -> Result<String, AuthError> {
        Ok(format!("https://provider.test/auth?state={}", state))
    }

    async fn exchange(&self, code: &str) -> Result<OAuthProfile, AuthError> {
        self.profiles
            .get(code)
            .cloned()
            .ok_or_else(|| AuthError::Provider(format!("unknown code {}", code)))
    }
}

/// Application state over a fresh in-memory store.
pub fn create_test_state(identity: StaticIdentity) -> (Arc<AppState>, Arc<Store>) {
    let store = Arc::new(Store::in_memory().expect("in-memory store"));
    let state = Arc::new(AppState::new(test_config(), store.clone(), Arc::new(identity)));
    (state, store)
}

pub fn create_user(store: &Store, name: &str) -> User {
    let slug = name.to_lowercase().replace(' ', ".");
    store
        .find_or_create_oauth_user(&NewUser {
            email: format!("{}@example.com", slug),
            name: name.to_string(),
            avatar_url: None,
            oauth_provider: "google".to_string(),
            oauth_id: format!("google-{}", slug),
        })
        .expect("create user")
}

/// `Cookie` header value carrying a valid session for `user`.
pub fn session_cookie(state: &AppState, user: &User) -> String {
    let token = state
        .sessions
        .issue(user.id, &user.email)
        .expect("issue session token");
    Cookie::new(SESSION_COOKIE, token).to_string()
}
