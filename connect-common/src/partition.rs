//! Sorting users by their relationship to the viewer.
//!
//! Pure computation over data the client already fetched from
//! `GET /api/users` and `GET /api/connections`.

use std::collections::HashMap;

use crate::connection::{ConnectionView, Relationship};
use crate::user::{UserId, UserProfile};

/// Users split into disjoint buckets relative to one viewer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPartition {
    pub connected: Vec<UserProfile>,
    pub pending_sent: Vec<UserProfile>,
    pub pending_received: Vec<UserProfile>,
    /// Users with no connection record at all.
    pub discoverable: Vec<UserProfile>,
}

/// Map each counterpart in `connections` to the viewer's relationship with them.
pub fn relationships(connections: &[ConnectionView]) -> HashMap<UserId, Relationship> {
    connections
        .iter()
        .map(|c| (c.friend.id, c.relationship()))
        .collect()
}

/// Partition `users` using the viewer's own connection list.
///
/// Order within each bucket follows the order of `users`.
pub fn partition(connections: &[ConnectionView], users: Vec<UserProfile>) -> UserPartition {
    let by_user = relationships(connections);
    let mut out = UserPartition::default();

    for user in users {
        match by_user.get(&user.id) {
            Some(Relationship::Connected) => out.connected.push(user),
            Some(Relationship::PendingSent) => out.pending_sent.push(user),
            Some(Relationship::PendingReceived) => out.pending_received.push(user),
            None => out.discoverable.push(user),
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::ConnectionStatus;
    use chrono::Utc;

    fn user(id: UserId) -> UserProfile {
        UserProfile {
            id,
            email: format!("user{id}@example.com"),
            name: format!("User {id}"),
            avatar_url: None,
            created_at: Utc::now(),
        }
    }

    fn view(id: i64, friend: UserId, status: ConnectionStatus, is_sender: bool) -> ConnectionView {
        ConnectionView {
            id,
            status,
            created_at: Utc::now(),
            is_sender,
            friend: user(friend).public(),
        }
    }

    #[test]
    fn test_partition_assigns_each_user_once() {
        let connections = vec![
            view(10, 2, ConnectionStatus::Accepted, true),
            view(11, 3, ConnectionStatus::Pending, true),
            view(12, 4, ConnectionStatus::Pending, false),
            view(13, 6, ConnectionStatus::Accepted, false),
        ];
        let users = (2..=6).map(user).collect();

        let parts = partition(&connections, users);

        let ids = |v: &[UserProfile]| v.iter().map(|u| u.id).collect::<Vec<_>>();
        assert_eq!(ids(&parts.connected), vec![2, 6]);
        assert_eq!(ids(&parts.pending_sent), vec![3]);
        assert_eq!(ids(&parts.pending_received), vec![4]);
        assert_eq!(ids(&parts.discoverable), vec![5]);
    }

    #[test]
    fn test_partition_without_connections() {
        let parts = partition(&[], vec![user(1), user(2)]);
        assert!(parts.connected.is_empty());
        assert!(parts.pending_sent.is_empty());
        assert!(parts.pending_received.is_empty());
        assert_eq!(parts.discoverable.len(), 2);
    }

    #[test]
    fn test_connection_to_unlisted_user_is_ignored() {
        let connections = vec![view(1, 99, ConnectionStatus::Accepted, true)];
        let parts = partition(&connections, vec![user(1)]);
        assert!(parts.connected.is_empty());
        assert_eq!(parts.discoverable.len(), 1);
    }
}
