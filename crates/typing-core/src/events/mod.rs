//! Typing events surfaced to sync clients and replication consumers

mod typing_event;

pub use typing_event::{TypingContent, TypingEvent, TypingUpdateRow, TYPING_EVENT_TYPE};
