//! Typing engine - update path
//!
//! The engine is the single owner of the room typing table, the stream cursor,
//! and the timeout scheduler. All three live behind one mutex; every mutation
//! (including timer-driven expiry) happens under it, and each state change
//! publishes the new stream key to long-poll waiters before the lock is
//! released so waiters never see keys out of order.

use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use serde::Serialize;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, info, instrument};
use typing_core::{DomainError, DomainResult, RoomId, StreamKey, UserId};

use crate::scheduler::{ExpiryHandler, Generation, TimeoutScheduler};
use crate::table::RoomTypingTable;

pub(crate) struct TypingState {
    pub(crate) table: RoomTypingTable,
    pub(crate) scheduler: TimeoutScheduler,
}

pub(crate) struct EngineInner {
    pub(crate) state: Mutex<TypingState>,
    pub(crate) key_tx: watch::Sender<StreamKey>,
}

impl EngineInner {
    /// Publish a new key while the state lock is held
    fn publish(&self, key: StreamKey) {
        self.key_tx.send_replace(key);
    }
}

impl ExpiryHandler for EngineInner {
    fn on_expiry(&self, room: RoomId, user: UserId, generation: Generation) {
        let mut state = self.state.lock();
        if !state.scheduler.take_if_current(&room, &user, generation) {
            debug!(room_id = %room, user_id = %user, generation, "Discarded stale typing expiry");
            return;
        }

        if let Some(key) = state.table.remove(&room, &user) {
            self.publish(key);
            info!(room_id = %room, user_id = %user, stream_key = %key, "Typing timed out");
        }
    }
}

/// Counters describing the engine's current state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EngineStats {
    pub current_key: StreamKey,
    pub rooms: usize,
    pub typing_users: usize,
    pub pending_timeouts: usize,
}

/// Room-scoped typing notification engine
///
/// Cheap to clone; clones share state.
#[derive(Clone)]
pub struct TypingEngine {
    pub(crate) inner: Arc<EngineInner>,
}

impl TypingEngine {
    /// Create an engine whose expiry timers run on the current Tokio runtime
    ///
    /// # Panics
    /// Panics if called outside a Tokio runtime.
    #[must_use]
    pub fn new() -> Self {
        Self::with_runtime(Handle::current())
    }

    /// Create an engine whose expiry timers run on `runtime`
    #[must_use]
    pub fn with_runtime(runtime: Handle) -> Self {
        let (key_tx, _) = watch::channel(StreamKey::ZERO);
        let inner = Arc::new_cyclic(|weak: &Weak<EngineInner>| {
            let handler: Weak<dyn ExpiryHandler> = weak.clone();
            EngineInner {
                state: Mutex::new(TypingState {
                    table: RoomTypingTable::new(),
                    scheduler: TimeoutScheduler::new(runtime, handler),
                }),
                key_tx,
            }
        });
        Self { inner }
    }

    /// Mark `user` as typing in `room` for `timeout_ms` milliseconds
    ///
    /// Installs a new entry or refreshes an existing one, restarting its
    /// countdown. Every call advances the stream key by one. Membership must
    /// already have been checked by the caller.
    ///
    /// Fails with `InvalidArgument` only when the deadline cannot be
    /// represented by the platform clock; a 64-bit clock holds any `u64`
    /// millisecond timeout.
    #[instrument(skip(self, room, user), fields(room_id = %room, user_id = %user))]
    pub fn set_typing(&self, room: &RoomId, user: &UserId, timeout_ms: u64) -> DomainResult<StreamKey> {
        let deadline = Instant::now()
            .checked_add(Duration::from_millis(timeout_ms))
            .ok_or_else(|| {
                DomainError::invalid_argument(format!("timeout of {timeout_ms}ms is out of range"))
            })?;

        let mut state = self.inner.state.lock();
        let refreshed = state.table.contains(room, user);
        let key = state.table.add_or_refresh(room, user, deadline);
        state.scheduler.schedule(room.clone(), user.clone(), deadline);
        self.inner.publish(key);
        drop(state);

        debug!(stream_key = %key, timeout_ms, refreshed, "Typing started");
        Ok(key)
    }

    /// Clear `user`'s typing state in `room`
    ///
    /// Returns the new stream key, or `None` if the user was not typing; a
    /// no-op stop leaves the key unchanged.
    #[instrument(skip(self, room, user), fields(room_id = %room, user_id = %user))]
    pub fn stop_typing(&self, room: &RoomId, user: &UserId) -> Option<StreamKey> {
        let key = self.remove_entry(room, user);
        match key {
            Some(key) => debug!(stream_key = %key, "Typing stopped"),
            None => debug!("Stop requested for user who was not typing"),
        }
        key
    }

    /// Clear typing state for a user who left or was removed from `room`
    #[instrument(skip(self, room, user), fields(room_id = %room, user_id = %user))]
    pub fn user_left_room(&self, room: &RoomId, user: &UserId) -> Option<StreamKey> {
        let key = self.remove_entry(room, user);
        if let Some(key) = key {
            debug!(stream_key = %key, "Cleared typing for departed member");
        }
        key
    }

    fn remove_entry(&self, room: &RoomId, user: &UserId) -> Option<StreamKey> {
        let mut state = self.inner.state.lock();
        state.scheduler.cancel(room, user);
        let key = state.table.remove(room, user)?;
        self.inner.publish(key);
        Some(key)
    }

    /// Whether `user` is currently typing in `room`
    pub fn is_typing(&self, room: &RoomId, user: &UserId) -> bool {
        self.inner.state.lock().table.contains(room, user)
    }

    /// Users currently typing in `room`, sorted
    pub fn current_members(&self, room: &RoomId) -> Vec<UserId> {
        self.inner.state.lock().table.current_members(room)
    }

    /// Key at which `room` last changed
    pub fn last_changed_cursor(&self, room: &RoomId) -> Option<StreamKey> {
        self.inner.state.lock().table.last_changed_cursor(room)
    }

    /// Snapshot of engine counters
    pub fn stats(&self) -> EngineStats {
        let state = self.inner.state.lock();
        EngineStats {
            current_key: state.table.current_key(),
            rooms: state.table.room_count(),
            typing_users: state.table.entry_count(),
            pending_timeouts: state.scheduler.pending_count(),
        }
    }
}

impl Default for TypingEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TypingEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypingEngine")
            .field("stats", &self.stats())
            .finish()
    }
}
