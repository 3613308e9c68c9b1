//! Typing event shapes
//!
//! A typing event always carries the full current set of typing users for a
//! room, never a diff against an earlier state.

use serde::{Deserialize, Serialize};

use crate::value_objects::{RoomId, StreamKey, UserId};

/// Event type tag for typing notifications
pub const TYPING_EVENT_TYPE: &str = "m.typing";

/// Content of a typing event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypingContent {
    /// Users currently typing, sorted
    pub user_ids: Vec<UserId>,
}

/// Typing event for a single room
///
/// Serializes as `{"type": "m.typing", "room_id": ..., "content": {"user_ids": [...]}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypingEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub room_id: RoomId,
    pub content: TypingContent,
}

impl TypingEvent {
    /// Create a typing event for a room
    ///
    /// The user list is sorted so equal states always serialize identically.
    #[must_use]
    pub fn new(room_id: RoomId, mut user_ids: Vec<UserId>) -> Self {
        user_ids.sort();
        user_ids.dedup();
        Self {
            event_type: TYPING_EVENT_TYPE.to_string(),
            room_id,
            content: TypingContent { user_ids },
        }
    }

    /// Whether nobody is typing in the room
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.content.user_ids.is_empty()
    }

    /// Convert to a JSON value
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// One row of the replication feed: the latest state of a room at the key it
/// last changed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypingUpdateRow {
    pub stream_key: StreamKey,
    pub room_id: RoomId,
    pub user_ids: Vec<UserId>,
}
