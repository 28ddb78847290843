//! Connection lifecycle.
//!
//! ```text
//! (absent) --request(initiator)--> pending --accept(recipient)--> accepted
//!  pending | accepted --remove(either party)--> (absent)
//! ```
//!
//! Rejecting, cancelling and removing are the same deletion; the labels only
//! exist in the UI.

use std::sync::Arc;

use connect_common::{Connection, ConnectionId, ConnectionStatus, ConnectionView, UserId};

use crate::error::{Error, Result};
use crate::store::{Store, StoreError, Transition};

pub struct ConnectionService {
    store: Arc<Store>,
}

impl ConnectionService {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    /// Every connection the viewer is part of, newest first.
    pub fn list(&self, viewer: UserId) -> Result<Vec<ConnectionView>> {
        Ok(self.store.connections_for(viewer)?)
    }

    /// Send a connection request from `viewer` to `target`.
    pub fn request(&self, viewer: UserId, target: UserId) -> Result<Connection> {
        if viewer == target {
            return Err(Error::InvalidOperation("Cannot connect with yourself".to_string()));
        }

        if !self.store.user_exists(target)? {
            return Err(user_not_found());
        }

        match self.store.insert_connection(viewer, target) {
            Ok(conn) => {
                tracing::info!(
                    connection_id = conn.id,
                    initiator = viewer,
                    recipient = target,
                    "Connection requested"
                );
                Ok(conn)
            }
            Err(StoreError::UniqueViolation) => {
                Err(Error::Conflict("Connection already exists".to_string()))
            }
            // The target vanished between the existence check and the insert.
            Err(StoreError::ForeignKeyViolation) => Err(user_not_found()),
            Err(StoreError::CheckViolation) => {
                Err(Error::InvalidOperation("Cannot connect with yourself".to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Accept a pending request. Only its recipient may do this.
    pub fn accept(&self, viewer: UserId, id: ConnectionId) -> Result<Connection> {
        let current = match self.store.accept_pending(id, viewer)? {
            Transition::Applied(conn) => {
                tracing::info!(connection_id = id, recipient = viewer, "Connection accepted");
                return Ok(conn);
            }
            Transition::Unmatched(current) => current.ok_or_else(connection_not_found)?,
        };

        if current.recipient() != viewer {
            return Err(Error::Forbidden(
                "Not authorized to accept this connection".to_string(),
            ));
        }
        match current.status {
            ConnectionStatus::Accepted => {
                Err(Error::Conflict("Connection already accepted".to_string()))
            }
            ConnectionStatus::Pending => Err(Error::Internal(format!(
                "connection {id} is pending but the accept matched no row"
            ))),
        }
    }

    /// Delete a connection in any status. Either party may do this.
    pub fn remove(&self, viewer: UserId, id: ConnectionId) -> Result<()> {
        match self.store.delete_for_party(id, viewer)? {
            Transition::Applied(removed) => {
                tracing::info!(
                    connection_id = id,
                    by = viewer,
                    other = removed.other_party(viewer),
                    "Connection removed"
                );
                Ok(())
            }
            Transition::Unmatched(None) => Err(connection_not_found()),
            Transition::Unmatched(Some(current)) if !current.is_party(viewer) => Err(
                Error::Forbidden("Not authorized to delete this connection".to_string()),
            ),
            Transition::Unmatched(Some(_)) => Err(Error::Internal(format!(
                "user {viewer} is a party to connection {id} but the delete matched no row"
            ))),
        }
    }
}

fn user_not_found() -> Error {
    Error::NotFound("User not found".to_string())
}

fn connection_not_found() -> Error {
    Error::NotFound("Connection not found".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewUser;

    struct Fixture {
        service: ConnectionService,
        store: Arc<Store>,
        users: Vec<UserId>,
    }

    fn fixture(n: usize) -> Fixture {
        let store = Arc::new(Store::in_memory().unwrap());
        let users = (0..n)
            .map(|i| {
                store
                    .find_or_create_oauth_user(&NewUser {
                        email: format!("user{i}@example.com"),
                        name: format!("User {i}"),
                        avatar_url: None,
                        oauth_provider: "google".to_string(),
                        oauth_id: format!("sub-{i}"),
                    })
                    .unwrap()
                    .id
            })
            .collect();
        Fixture {
            service: ConnectionService::new(store.clone()),
            store,
            users,
        }
    }

    #[test]
    fn test_duplicate_request_conflicts_in_both_directions() {
        let f = fixture(2);
        let (a, b) = (f.users[0], f.users[1]);
        f.service.request(a, b).unwrap();

        assert!(matches!(f.service.request(a, b), Err(Error::Conflict(_))));
        assert!(matches!(f.service.request(b, a), Err(Error::Conflict(_))));
    }

    #[test]
    fn test_self_request_is_invalid() {
        let f = fixture(1);
        let a = f.users[0];
        let err = f.service.request(a, a).unwrap_err();
        assert!(matches!(err, Error::InvalidOperation(_)));
        assert_eq!(err.to_string(), "Cannot connect with yourself");
    }

    #[test]
    fn test_self_request_checked_before_existence() {
        let f = fixture(0);
        assert!(matches!(f.service.request(77, 77), Err(Error::InvalidOperation(_))));
    }

    #[test]
    fn test_request_to_unknown_user() {
        let f = fixture(1);
        let err = f.service.request(f.users[0], 999).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        assert_eq!(err.to_string(), "User not found");
    }

    #[test]
    fn test_request_creates_pending_from_viewer() {
        let f = fixture(2);
        let conn = f.service.request(f.users[0], f.users[1]).unwrap();
        assert_eq!(conn.initiator(), f.users[0]);
        assert_eq!(conn.recipient(), f.users[1]);
        assert_eq!(conn.status, ConnectionStatus::Pending);
    }

    #[test]
    fn test_initiator_cannot_accept() {
        let f = fixture(2);
        let conn = f.service.request(f.users[0], f.users[1]).unwrap();
        let err = f.service.accept(f.users[0], conn.id).unwrap_err();
        assert!(matches!(err, Error::Forbidden(_)));

        let stored = f.store.get_connection(conn.id).unwrap().unwrap();
        assert_eq!(stored.status, ConnectionStatus::Pending);
    }

    #[test]
    fn test_outsider_cannot_accept() {
        let f = fixture(3);
        let conn = f.service.request(f.users[0], f.users[1]).unwrap();
        assert!(matches!(f.service.accept(f.users[2], conn.id), Err(Error::Forbidden(_))));
    }

    #[test]
    fn test_accept_twice_conflicts_without_mutation() {
        let f = fixture(2);
        let conn = f.service.request(f.users[0], f.users[1]).unwrap();
        let accepted = f.service.accept(f.users[1], conn.id).unwrap();
        assert_eq!(accepted.status, ConnectionStatus::Accepted);

        let err = f.service.accept(f.users[1], conn.id).unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
        assert_eq!(err.to_string(), "Connection already accepted");

        let stored = f.store.get_connection(conn.id).unwrap().unwrap();
        assert_eq!(stored, accepted);
    }

    #[test]
    fn test_accept_missing_connection() {
        let f = fixture(1);
        assert!(matches!(f.service.accept(f.users[0], 5), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_non_party_cannot_remove() {
        let f = fixture(3);
        let conn = f.service.request(f.users[0], f.users[1]).unwrap();
        let err = f.service.remove(f.users[2], conn.id).unwrap_err();
        assert!(matches!(err, Error::Forbidden(_)));
        assert_eq!(f.store.get_connection(conn.id).unwrap(), Some(conn));
    }

    #[test]
    fn test_remove_missing_connection() {
        let f = fixture(1);
        assert!(matches!(f.service.remove(f.users[0], 1), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_either_party_removes_in_any_status() {
        let f = fixture(2);
        let (a, b) = (f.users[0], f.users[1]);

        // Recipient rejects a pending request.
        let pending = f.service.request(a, b).unwrap();
        f.service.remove(b, pending.id).unwrap();

        // Initiator cancels.
        let pending = f.service.request(a, b).unwrap();
        f.service.remove(a, pending.id).unwrap();

        // Either side removes after acceptance.
        let conn = f.service.request(b, a).unwrap();
        f.service.accept(a, conn.id).unwrap();
        f.service.remove(b, conn.id).unwrap();

        assert!(f.service.list(a).unwrap().is_empty());
    }

    #[test]
    fn test_request_after_remove_succeeds() {
        let f = fixture(2);
        let (a, b) = (f.users[0], f.users[1]);
        let conn = f.service.request(a, b).unwrap();
        f.service.remove(a, conn.id).unwrap();

        let again = f.service.request(b, a).unwrap();
        assert_ne!(again.id, conn.id);
        assert_eq!(again.initiator(), b);
    }

    #[test]
    fn test_full_lifecycle_views() {
        let f = fixture(2);
        let (one, two) = (f.users[0], f.users[1]);

        let conn = f.service.request(one, two).unwrap();

        let mine = f.service.list(one).unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].id, conn.id);
        assert_eq!(mine[0].status, ConnectionStatus::Pending);
        assert!(mine[0].is_sender);
        assert_eq!(mine[0].friend.id, two);

        let theirs = f.service.list(two).unwrap();
        assert_eq!(theirs.len(), 1);
        assert_eq!(theirs[0].id, conn.id);
        assert!(!theirs[0].is_sender);
        assert_eq!(theirs[0].friend.id, one);

        f.service.accept(two, conn.id).unwrap();
        assert_eq!(f.service.list(one).unwrap()[0].status, ConnectionStatus::Accepted);
        assert_eq!(f.service.list(two).unwrap()[0].status, ConnectionStatus::Accepted);

        f.service.remove(one, conn.id).unwrap();
        assert!(f.service.list(one).unwrap().is_empty());
        assert!(f.service.list(two).unwrap().is_empty());
    }
}
