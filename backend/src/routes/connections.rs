use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware,
    routing::{get, post, put},
    Extension, Json, Router,
};
use connect_common::{Connection, ConnectionView, MessageResponse};

use super::parse_id;
use crate::auth::{require_auth, AuthUser};
use crate::error::Result;
use crate::AppState;

/// GET /connections - Connections of the current user, newest first
async fn list_connections(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<ConnectionView>>> {
    Ok(Json(state.connections.list(user.id)?))
}

/// POST /connections/:userId - Send a connection request to a user
async fn send_request(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(target): Path<String>,
) -> Result<(StatusCode, Json<Connection>)> {
    let target = parse_id(&target, "user")?;
    let conn = state.connections.request(user.id, target)?;
    Ok((StatusCode::CREATED, Json(conn)))
}

/// PUT /connections/:id/accept - Accept a pending request addressed to the current user
async fn accept_connection(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<Connection>> {
    let id = parse_id(&id, "connection")?;
    Ok(Json(state.connections.accept(user.id, id)?))
}

/// DELETE /connections/:id - Reject, cancel or remove a connection
async fn delete_connection(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>> {
    let id = parse_id(&id, "connection")?;
    state.connections.remove(user.id, id)?;
    Ok(Json(MessageResponse::new("Connection deleted successfully")))
}

pub fn router(state: Arc<AppState>) -> Router {
    // POST takes a user id, DELETE a connection id; axum needs one name per segment.
    Router::new()
        .route("/", get(list_connections))
        .route("/:id", post(send_request).delete(delete_connection))
        .route("/:id/accept", put(accept_connection))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state)
}
