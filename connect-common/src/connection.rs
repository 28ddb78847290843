//! Connection records and viewer-relative views.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::user::{PublicProfile, UserId};

/// Numeric connection identifier.
pub type ConnectionId = i64;

/// Persisted connection status.
///
/// There is no rejected status: rejecting or cancelling a request deletes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Pending,
    Accepted,
}

impl ConnectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionStatus::Pending => "pending",
            ConnectionStatus::Accepted => "accepted",
        }
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown connection status: {0}")]
pub struct ParseStatusError(pub String);

impl FromStr for ConnectionStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ConnectionStatus::Pending),
            "accepted" => Ok(ConnectionStatus::Accepted),
            other => Err(ParseStatusError(other.to_string())),
        }
    }
}

/// A connection row. `user_id` is the initiator, `friend_id` the recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub id: ConnectionId,
    pub user_id: UserId,
    pub friend_id: UserId,
    pub status: ConnectionStatus,
    pub created_at: DateTime<Utc>,
}

impl Connection {
    pub fn initiator(&self) -> UserId {
        self.user_id
    }

    pub fn recipient(&self) -> UserId {
        self.friend_id
    }

    /// Whether `user` is either side of this connection.
    pub fn is_party(&self, user: UserId) -> bool {
        self.user_id == user || self.friend_id == user
    }

    /// The counterpart of `user`, or `None` if `user` is not a party.
    pub fn other_party(&self, user: UserId) -> Option<UserId> {
        if self.user_id == user {
            Some(self.friend_id)
        } else if self.friend_id == user {
            Some(self.user_id)
        } else {
            None
        }
    }
}

/// How the viewer relates to the other party of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relationship {
    Connected,
    PendingSent,
    PendingReceived,
}

/// A connection as seen by one of its parties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionView {
    pub id: ConnectionId,
    pub status: ConnectionStatus,
    pub created_at: DateTime<Utc>,
    /// True when the viewer initiated the request.
    pub is_sender: bool,
    pub friend: PublicProfile,
}

impl ConnectionView {
    pub fn relationship(&self) -> Relationship {
        match (self.status, self.is_sender) {
            (ConnectionStatus::Accepted, _) => Relationship::Connected,
            (ConnectionStatus::Pending, true) => Relationship::PendingSent,
            (ConnectionStatus::Pending, false) => Relationship::PendingReceived,
        }
    }
}

/// Plain `{ "message": ... }` acknowledgement body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Error body returned by every failing API call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
