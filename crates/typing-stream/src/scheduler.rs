//! Timeout scheduler
//!
//! Keeps at most one pending expiry per (room, user). Each pending expiry is a
//! Tokio task sleeping until the entry's deadline, tagged with a generation
//! number. Rescheduling or cancelling aborts the task and forgets its
//! generation; a task that already woke up and is waiting on the engine lock
//! finds its generation gone and does nothing.

use std::collections::HashMap;
use std::sync::Weak;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use typing_core::{RoomId, UserId};

/// Identifies one scheduling of a pair; never reused
pub type Generation = u64;

/// Receives expiry callbacks from fired timers
///
/// The handler must take the same lock that guards the scheduler and call
/// [`TimeoutScheduler::take_if_current`] before acting.
pub trait ExpiryHandler: Send + Sync + 'static {
    fn on_expiry(&self, room: RoomId, user: UserId, generation: Generation);
}

#[derive(Debug)]
struct PendingExpiry {
    generation: Generation,
    deadline: Instant,
    task: JoinHandle<()>,
}

/// Per-entry expiry timers with cancel-and-reschedule semantics
pub struct TimeoutScheduler {
    runtime: Handle,
    handler: Weak<dyn ExpiryHandler>,
    pending: HashMap<(RoomId, UserId), PendingExpiry>,
    next_generation: Generation,
}

impl TimeoutScheduler {
    /// Create a scheduler spawning timers on `runtime`
    pub fn new(runtime: Handle, handler: Weak<dyn ExpiryHandler>) -> Self {
        Self {
            runtime,
            handler,
            pending: HashMap::new(),
            next_generation: 1,
        }
    }

    /// Install or replace the pending expiry for a pair
    ///
    /// Any earlier timer for the same pair is aborted; the countdown restarts
    /// from `deadline` rather than stacking.
    pub fn schedule(&mut self, room: RoomId, user: UserId, deadline: Instant) -> Generation {
        let generation = self.next_generation;
        self.next_generation += 1;

        let handler = self.handler.clone();
        let (task_room, task_user) = (room.clone(), user.clone());
        let task = self.runtime.spawn(async move {
            tokio::time::sleep_until(deadline).await;
            if let Some(handler) = handler.upgrade() {
                handler.on_expiry(task_room, task_user, generation);
            }
        });

        let replaced = self.pending.insert(
            (room, user),
            PendingExpiry {
                generation,
                deadline,
                task,
            },
        );
        if let Some(previous) = replaced {
            previous.task.abort();
        }

        generation
    }

    /// Drop the pending expiry for a pair without firing it
    ///
    /// Returns whether a timer was pending.
    pub fn cancel(&mut self, room: &RoomId, user: &UserId) -> bool {
        match self.pending.remove(&(room.clone(), user.clone())) {
            Some(previous) => {
                previous.task.abort();
                true
            }
            None => false,
        }
    }

    /// Claim a fired timer
    ///
    /// Returns `true` and forgets the pending record only when `generation` is
    /// still the current one for the pair. A stale generation means the entry
    /// was refreshed or cancelled after the timer started firing.
    pub fn take_if_current(&mut self, room: &RoomId, user: &UserId, generation: Generation) -> bool {
        let key = (room.clone(), user.clone());
        match self.pending.get(&key) {
            Some(pending) if pending.generation == generation => {
                self.pending.remove(&key);
                true
            }
            _ => false,
        }
    }

    /// Deadline of the pending expiry for a pair
    pub fn deadline(&self, room: &RoomId, user: &UserId) -> Option<Instant> {
        self.pending
            .get(&(room.clone(), user.clone()))
            .map(|pending| pending.deadline)
    }

    /// Number of pending timers
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

impl Drop for TimeoutScheduler {
    fn drop(&mut self) {
        for (_, pending) in self.pending.drain() {
            pending.task.abort();
        }
    }
}

impl std::fmt::Debug for TimeoutScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimeoutScheduler")
            .field("pending", &self.pending.len())
            .field("next_generation", &self.next_generation)
            .finish()
    }
}
