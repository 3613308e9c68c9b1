//! # typing-core
//!
//! Domain layer for the typing notification stream: room and user identifiers,
//! the stream key (cursor), the typing event shape, and domain errors.
//! This crate has zero dependencies on infrastructure (runtime, web framework, etc.).

pub mod error;
pub mod events;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use error::{DomainError, DomainResult};
pub use events::{TypingContent, TypingEvent, TypingUpdateRow, TYPING_EVENT_TYPE};
pub use value_objects::{IdParseError, RoomId, StreamKey, StreamKeyParseError, UserId};
