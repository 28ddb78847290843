//! OAuth login and session routes.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    middleware,
    response::Redirect,
    routing::{get, post},
    Extension, Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use connect_common::{CurrentUser, MessageResponse};
use serde::Deserialize;

use crate::auth::cookies::{self, CookieOptions};
use crate::auth::{require_auth, AuthUser, SESSION_COOKIE};
use crate::error::{Error, Result};
use crate::models::User;
use crate::AppState;

/// Cookie holding the anti-forgery value between redirect and callback.
const OAUTH_STATE_COOKIE: &str = "oauth_state";
const OAUTH_STATE_PATH: &str = "/api/auth";
const OAUTH_STATE_TTL_SECS: i64 = 600;

#[derive(Debug, Deserialize)]
struct CallbackQuery {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

/// GET /auth/google - Start the OAuth flow
async fn google_login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<(CookieJar, Redirect)> {
    let nonce = uuid::Uuid::new_v4().simple().to_string();
    let url = state.identity.authorize_url(&nonce)?;
    tracing::debug!("Redirecting to {} for login", state.identity.name());

    let jar = jar.add(cookies::build(
        OAUTH_STATE_COOKIE,
        nonce,
        CookieOptions {
            path: OAUTH_STATE_PATH,
            max_age_secs: OAUTH_STATE_TTL_SECS,
            secure: state.config.auth.cookie_secure,
        },
    ));

    Ok((jar, Redirect::to(&url)))
}

/// GET /auth/google/callback - Finish the OAuth flow and start a session
async fn google_callback(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Query(query): Query<CallbackQuery>,
) -> (CookieJar, Redirect) {
    let secure = state.config.auth.cookie_secure;
    let client_url = state.config.client_url.trim_end_matches('/');

    let outcome = complete_login(&state, &jar, query).await;
    let jar = jar.add(cookies::removal(OAUTH_STATE_COOKIE, OAUTH_STATE_PATH, secure));

    match outcome {
        Ok((user, token)) => {
            tracing::info!("OAuth login succeeded for user {} ({})", user.id, user.email);
            let session = cookies::build(
                SESSION_COOKIE,
                token,
                CookieOptions {
                    path: "/",
                    max_age_secs: state.sessions.ttl().num_seconds(),
                    secure,
                },
            );
            (
                jar.add(session),
                Redirect::to(&format!("{}/dashboard", client_url)),
            )
        }
        Err(e) => {
            tracing::warn!("OAuth login failed: {}", e);
            (
                jar,
                Redirect::to(&format!("{}/login?error=auth_failed", client_url)),
            )
        }
    }
}

async fn complete_login(
    state: &AppState,
    jar: &CookieJar,
    query: CallbackQuery,
) -> Result<(User, String)> {
    if let Some(error) = query.error {
        return Err(Error::Unauthenticated(format!("provider returned error: {}", error)));
    }

    let expected = cookies::value(jar, OAUTH_STATE_COOKIE)
        .ok_or_else(|| Error::Unauthenticated("missing OAuth state cookie".to_string()))?;
    if query.state.as_deref() != Some(expected) {
        return Err(Error::Unauthenticated("OAuth state mismatch".to_string()));
    }

    let code = query
        .code
        .filter(|c| !c.is_empty())
        .ok_or_else(|| Error::Unauthenticated("missing authorization code".to_string()))?;

    let profile = state.identity.exchange(&code).await?;
    let user = state.users.login(&profile.into_new_user())?;
    let token = state.sessions.issue(user.id, &user.email)?;

    Ok((user, token))
}

/// GET /auth/me - The authenticated user
async fn me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<CurrentUser>> {
    Ok(Json(state.users.current(user.id)?))
}

/// POST /auth/logout - Drop the session cookie
async fn logout(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> (CookieJar, Json<MessageResponse>) {
    let jar = jar.add(cookies::removal(
        SESSION_COOKIE,
        "/",
        state.config.auth.cookie_secure,
    ));
    (jar, Json(MessageResponse::new("Logged out successfully")))
}

pub fn router(state: Arc<AppState>) -> Router {
    let protected = Router::new()
        .route("/me", get(me))
        .route("/logout", post(logout))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route("/google", get(google_login))
        .route("/google/callback", get(google_callback))
        .merge(protected)
        .with_state(state)
}
