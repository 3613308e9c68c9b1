//! Typing engine - query path (event source)
//!
//! Sync handlers poll with the last key they saw and receive one event per
//! visible room that changed since then, each carrying the room's full
//! current typing set. Events are ordered earliest-changed-first; because
//! every key belongs to exactly one room change, that order is total.

use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tracing::{instrument, trace};
use typing_core::{DomainError, DomainResult, RoomId, StreamKey, TypingEvent, TypingUpdateRow, UserId};

use crate::engine::TypingEngine;
use crate::table::RoomChange;

/// Events returned by [`TypingEngine::get_new_events`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventBatch {
    pub events: Vec<TypingEvent>,
    /// Key to pass as `from_key` on the next query
    pub next_key: StreamKey,
    /// Whether `limit` cut the batch short
    pub limited: bool,
}

impl EventBatch {
    /// Whether the batch has no events
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Rows returned by [`TypingEngine::get_all_typing_updates`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplicationBatch {
    pub rows: Vec<TypingUpdateRow>,
    /// Highest key covered by `rows`
    pub upto: StreamKey,
    pub limited: bool,
}

fn check_limit(limit: Option<usize>) -> DomainResult<()> {
    if limit == Some(0) {
        return Err(DomainError::invalid_argument("limit must be greater than zero"));
    }
    Ok(())
}

fn check_not_ahead(requested: StreamKey, current: StreamKey) -> DomainResult<()> {
    if requested > current {
        return Err(DomainError::StreamKeyAhead { requested, current });
    }
    Ok(())
}

/// Truncate `changes` to `limit`, returning the key a reader should resume from
fn truncate(changes: &mut Vec<RoomChange>, limit: Option<usize>, current: StreamKey) -> (StreamKey, bool) {
    match limit {
        Some(limit) if changes.len() > limit => {
            changes.truncate(limit);
            let resume = changes.last().map_or(current, |change| change.last_changed);
            (resume, true)
        }
        _ => (current, false),
    }
}

impl TypingEngine {
    /// Current stream key
    pub fn get_current_key(&self) -> StreamKey {
        self.inner.state.lock().table.current_key()
    }

    /// Typing events for rooms in `room_ids` that changed after `from_key`
    ///
    /// `room_ids` must already be filtered to what `user` may see; guests get
    /// no extra filtering here. Rooms appearing twice are reported once.
    /// With `limit`, the earliest-changed rooms are kept and `next_key` points
    /// at the last one returned, so resuming from it loses nothing.
    #[instrument(skip(self, user, room_ids), fields(user_id = %user, rooms = room_ids.len()))]
    pub fn get_new_events(
        &self,
        user: &UserId,
        from_key: StreamKey,
        room_ids: &[RoomId],
        limit: Option<usize>,
        is_guest: bool,
    ) -> DomainResult<EventBatch> {
        check_limit(limit)?;

        let (mut changes, current) = {
            let state = self.inner.state.lock();
            let current = state.table.current_key();
            check_not_ahead(from_key, current)?;
            (state.table.changed_since(from_key, room_ids), current)
        };

        let (next_key, limited) = truncate(&mut changes, limit, current);
        let events: Vec<TypingEvent> = changes
            .into_iter()
            .map(|change| TypingEvent::new(change.room_id, change.user_ids))
            .collect();

        trace!(events = events.len(), %next_key, limited, "Fetched typing events");
        Ok(EventBatch {
            events,
            next_key,
            limited,
        })
    }

    /// Wait until the stream key moves past `from_key`, or `timeout` elapses
    ///
    /// Returns the current key either way; callers compare it with `from_key`
    /// to tell a wakeup from a timeout.
    pub async fn wait_for_events(&self, from_key: StreamKey, timeout: Duration) -> DomainResult<StreamKey> {
        let mut rx = self.subscribe();
        check_not_ahead(from_key, *rx.borrow())?;

        let woke = tokio::time::timeout(timeout, rx.wait_for(|key| *key > from_key)).await;
        match woke {
            Ok(Ok(key)) => Ok(*key),
            // Sender lives as long as the engine; treat a closed channel like a timeout
            Ok(Err(_)) | Err(_) => Ok(self.get_current_key()),
        }
    }

    /// Receiver notified with every new stream key
    pub fn subscribe(&self) -> watch::Receiver<StreamKey> {
        self.inner.key_tx.subscribe()
    }

    /// Latest state of every room whose last change lies in `(from, to]`
    ///
    /// Unlike [`get_new_events`](Self::get_new_events) this is not scoped to a
    /// user; it feeds other in-process consumers that mirror the stream.
    pub fn get_all_typing_updates(
        &self,
        from: StreamKey,
        to: StreamKey,
        limit: usize,
    ) -> DomainResult<ReplicationBatch> {
        check_limit(Some(limit))?;
        if from > to {
            return Err(DomainError::invalid_argument(format!(
                "from key {from} is after to key {to}"
            )));
        }

        let mut changes = {
            let state = self.inner.state.lock();
            check_not_ahead(to, state.table.current_key())?;
            state.table.changed_between(from, to)
        };

        let (upto, limited) = truncate(&mut changes, Some(limit), to);
        let rows = changes
            .into_iter()
            .map(|change| TypingUpdateRow {
                stream_key: change.last_changed,
                room_id: change.room_id,
                user_ids: change.user_ids,
            })
            .collect();

        Ok(ReplicationBatch { rows, upto, limited })
    }
}
