//! HTTP surface.
//!
//! - `/health`
//! - `/api/auth/*` - OAuth login, current user, logout
//! - `/api/users/*` - user directory and profile updates
//! - `/api/connections/*` - connection requests and their lifecycle

pub mod auth;
pub mod connections;
pub mod health;
pub mod users;

use std::sync::Arc;

use axum::async_trait;
use axum::body::Body;
use axum::extract::{FromRequest, Request};
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use axum::{middleware, Json, Router};
use serde::de::DeserializeOwned;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::error::{Error, Result};
use crate::logging;
use crate::AppState;

/// Routes under `/api`.
pub fn api_router(state: Arc<AppState>) -> Router {
    Router::new()
        .nest("/auth", auth::router(state.clone()))
        .nest("/users", users::router(state.clone()))
        .nest("/connections", connections::router(state))
}

/// The complete application: health, API, CORS and request logging.
pub fn app(state: Arc<AppState>) -> Result<Router> {
    let origin = state
        .config
        .client_url
        .trim_end_matches('/')
        .parse::<HeaderValue>()
        .map_err(|e| Error::Internal(format!("invalid client_url: {}", e)))?;

    // Credentialed CORS needs an explicit origin, not a wildcard.
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION]);

    Ok(Router::new()
        .merge(health::router())
        .nest("/api", api_router(state))
        .layer(cors)
        .layer(middleware::from_fn(logging::request_logger))
        .layer(TraceLayer::new_for_http()))
}

const BODY_LIMIT: usize = 2 * 1024 * 1024;

/// JSON request body that reads as `T::default()` when the body is empty.
///
/// Malformed bodies are rejected as [`Error::InvalidRequest`] so they get the
/// usual `{"error": ...}` response.
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned + Default,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self> {
        let (parts, body) = req.into_parts();
        let bytes = axum::body::to_bytes(body, BODY_LIMIT)
            .await
            .map_err(|e| Error::InvalidRequest(format!("Failed to read request body: {}", e)))?;

        if bytes.iter().all(|b| b.is_ascii_whitespace()) {
            return Ok(Self(T::default()));
        }

        let req = Request::from_parts(parts, Body::from(bytes));
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

/// Parse a numeric id from a path segment.
fn parse_id(raw: &str, what: &str) -> Result<i64> {
    raw.parse()
        .map_err(|_| Error::InvalidRequest(format!("Invalid {} id", what)))
}
