//! # typing-stream
//!
//! In-process engine for ephemeral, room-scoped typing notifications.
//!
//! ## Features
//!
//! - **Room Typing Table**: per-room sets of typing users, each with an expiry deadline
//! - **Stream Cursor**: a single monotonic key advanced once per state change
//! - **Timeout Scheduler**: one cancellable timer per (room, user), refresh always wins
//! - **Event Source**: "what changed since key X" queries and long-poll wakeups
//!
//! ## Example
//!
//! ```ignore
//! use typing_stream::TypingEngine;
//!
//! let engine = TypingEngine::new();
//! let before = engine.get_current_key();
//!
//! engine.set_typing(&room_id, &user_id, 30_000)?;
//!
//! let batch = engine.get_new_events(&user_id, before, &[room_id], None, false)?;
//! assert_eq!(batch.events.len(), 1);
//! ```

pub mod engine;
pub mod event_source;
pub mod scheduler;
pub mod table;

pub use engine::{EngineStats, TypingEngine};
pub use event_source::{EventBatch, ReplicationBatch};
pub use scheduler::{ExpiryHandler, Generation, TimeoutScheduler};
pub use table::{RoomChange, RoomTypingTable, TypingEntry};
