//! In-memory room membership

use std::collections::HashSet;

use async_trait::async_trait;
use dashmap::DashMap;
use typing_core::{RoomId, UserId};
use typing_stream::TypingEngine;

use super::RoomMembership;

/// Room membership kept in process memory
///
/// Leaving a room clears the member's typing state in the engine.
pub struct InMemoryMembership {
    rooms: DashMap<RoomId, HashSet<UserId>>,
    engine: TypingEngine,
}

impl InMemoryMembership {
    pub fn new(engine: TypingEngine) -> Self {
        Self {
            rooms: DashMap::new(),
            engine,
        }
    }

    /// Build from seeded `(room, members)` pairs
    pub fn from_seed(engine: TypingEngine, seed: &[(RoomId, Vec<UserId>)]) -> Self {
        let membership = Self::new(engine);
        for (room, members) in seed {
            for user in members {
                membership.join(room.clone(), user.clone());
            }
        }
        membership
    }

    /// Add `user` to `room`; returns `false` if already joined
    pub fn join(&self, room: RoomId, user: UserId) -> bool {
        tracing::debug!(room_id = %room, user_id = %user, "Member joined");
        self.rooms.entry(room).or_default().insert(user)
    }

    /// Remove `user` from `room`; returns `false` if not joined
    pub fn leave(&self, room: &RoomId, user: &UserId) -> bool {
        let removed = self
            .rooms
            .get_mut(room)
            .is_some_and(|mut members| members.remove(user));

        if removed {
            // Drop empty rooms atomically
            self.rooms.remove_if(room, |_, members| members.is_empty());
            self.engine.user_left_room(room, user);
            tracing::debug!(room_id = %room, user_id = %user, "Member left");
        }
        removed
    }

    /// Number of rooms with at least one member
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}

#[async_trait]
impl RoomMembership for InMemoryMembership {
    async fn is_member(&self, room: &RoomId, user: &UserId) -> bool {
        self.rooms
            .get(room)
            .is_some_and(|members| members.contains(user))
    }

    async fn joined_rooms(&self, user: &UserId) -> Vec<RoomId> {
        self.rooms
            .iter()
            .filter(|entry| entry.value().contains(user))
            .map(|entry| entry.key().clone())
            .collect()
    }
}

impl std::fmt::Debug for InMemoryMembership {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryMembership")
            .field("rooms", &self.rooms.len())
            .finish()
    }
}
