//! Connect Common Types
//!
//! Shared types used by the backend and by API clients: user profiles,
//! connection records, viewer-relative connection views and the pure
//! partition helper that sorts users by their relationship to the viewer.

pub mod connection;
pub mod partition;
pub mod user;

pub use connection::{
    Connection, ConnectionId, ConnectionStatus, ConnectionView, ErrorBody, MessageResponse,
    ParseStatusError, Relationship,
};
pub use partition::{partition, relationships, UserPartition};
pub use user::{CurrentUser, PublicProfile, UpdateProfileRequest, UserId, UserProfile};
