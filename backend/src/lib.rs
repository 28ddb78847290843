pub mod auth;
pub mod config;
pub mod connections;
pub mod error;
pub mod logging;
pub mod models;
pub mod routes;
pub mod store;
pub mod test_util;
pub mod users;

pub use auth::{AuthUser, GoogleOAuth, IdentityProvider, SessionTokens};
pub use config::Config;
pub use connections::ConnectionService;
pub use error::Error;
pub use store::Store;
pub use users::UserService;

use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    /// Session token issuer and verifier.
    pub sessions: SessionTokens,
    /// OAuth provider used by the login routes.
    pub identity: Arc<dyn IdentityProvider>,
    pub users: UserService,
    pub connections: ConnectionService,
}

impl AppState {
    pub fn new(config: Config, store: Arc<Store>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self {
            sessions: SessionTokens::from_config(&config.auth),
            identity,
            users: UserService::new(store.clone()),
            connections: ConnectionService::new(store),
            config,
        }
    }
}
