use std::sync::Arc;

use axum::{
    extract::{Path, State},
    middleware,
    routing::{get, put},
    Extension, Json, Router,
};
use connect_common::{UpdateProfileRequest, UserProfile};

use super::{parse_id, JsonBody};
use crate::auth::{require_auth, AuthUser};
use crate::error::Result;
use crate::AppState;

/// GET /users - Everyone except the current user
async fn list_users(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<UserProfile>>> {
    Ok(Json(state.users.list_others(user.id)?))
}

/// GET /users/:id
async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<UserProfile>> {
    let id = parse_id(&id, "user")?;
    Ok(Json(state.users.get(id)?))
}

/// PUT /users/me - Update the current user's name and avatar
async fn update_me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    JsonBody(req): JsonBody<UpdateProfileRequest>,
) -> Result<Json<UserProfile>> {
    let profile = state.users.update_profile(
        user.id,
        req.name.as_deref(),
        req.avatar_url.as_deref(),
    )?;
    Ok(Json(profile))
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(list_users))
        .route("/me", put(update_me))
        .route("/:id", get(get_user))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state)
}
