//! Connect API server.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use connect_backend::{routes, AppState, Config, GoogleOAuth, Store};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::load().map_err(|e| {
        format!(
            "Failed to load configuration: {}. \
             Set CONNECT__AUTH__JWT_SECRET, CONNECT__OAUTH__CLIENT_ID and \
             CONNECT__OAUTH__CLIENT_SECRET or provide config.toml.",
            e
        )
    })?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Connect API");

    // Initialize components
    let store = Arc::new(Store::new(&config.database.url)?);
    let identity = Arc::new(GoogleOAuth::new(&config.oauth));

    let state = Arc::new(AppState::new(config.clone(), store, identity));
    let app = routes::app(state)?;

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!("Listening on {}", addr);
    tracing::info!("Client URL: {}", config.client_url);

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
