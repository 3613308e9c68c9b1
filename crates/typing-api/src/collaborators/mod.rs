//! Collaborator seams
//!
//! Authentication and room membership are owned by other parts of a
//! homeserver. The API layer talks to them through these traits; the
//! in-memory implementations back the binary and the tests.

mod auth;
mod membership;

use async_trait::async_trait;
use typing_core::{RoomId, UserId};

pub use auth::StaticTokenAuthenticator;
pub use membership::InMemoryMembership;

/// Identity resolved from an access token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requester {
    pub user_id: UserId,
    pub is_guest: bool,
}

impl Requester {
    /// Create a non-guest requester
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            is_guest: false,
        }
    }

    /// Create a guest requester
    pub fn guest(user_id: UserId) -> Self {
        Self {
            user_id,
            is_guest: true,
        }
    }
}

/// Resolves access tokens to requesters
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// `None` when the token is unknown
    async fn authenticate(&self, token: &str) -> Option<Requester>;
}

/// Answers room membership questions
#[async_trait]
pub trait RoomMembership: Send + Sync {
    async fn is_member(&self, room: &RoomId, user: &UserId) -> bool;

    /// Rooms `user` has joined, in no particular order
    async fn joined_rooms(&self, user: &UserId) -> Vec<RoomId>;
}
