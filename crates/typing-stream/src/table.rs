//! Room typing table
//!
//! Maps each room to the users currently typing in it and owns the stream
//! cursor. Every mutation advances the cursor by exactly one and stamps the
//! room with the new key in the same `&mut self` call, so callers holding the
//! engine lock always observe the two together.

use std::collections::{BTreeMap, HashMap, HashSet};

use tokio::time::Instant;
use typing_core::{RoomId, StreamKey, UserId};

/// A live typing entry for one (room, user) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypingEntry {
    /// Point after which the entry is stale
    pub deadline: Instant,
    /// Key at which this entry was last installed or refreshed
    pub changed_at: StreamKey,
}

/// Typing state of a single room
#[derive(Debug, Default)]
struct RoomTyping {
    members: BTreeMap<UserId, TypingEntry>,
    last_changed: StreamKey,
}

impl RoomTyping {
    fn user_ids(&self) -> Vec<UserId> {
        self.members.keys().cloned().collect()
    }
}

/// Point-in-time view of a room that changed after some key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomChange {
    pub room_id: RoomId,
    pub last_changed: StreamKey,
    /// Sorted
    pub user_ids: Vec<UserId>,
}

/// Room typing table plus the stream cursor
///
/// Rooms are created on first activity and kept once empty, so an emptied
/// room still reports its final (empty) state to clients behind it.
///
/// The room map therefore only grows: it holds one small row for every room
/// that has ever seen typing since startup, bounded by the number of rooms
/// the server hosts rather than by current activity.
#[derive(Debug, Default)]
pub struct RoomTypingTable {
    rooms: HashMap<RoomId, RoomTyping>,
    current_key: StreamKey,
}

impl RoomTypingTable {
    /// Create an empty table with the cursor at zero
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current stream key
    #[inline]
    pub fn current_key(&self) -> StreamKey {
        self.current_key
    }

    fn advance(&mut self) -> StreamKey {
        self.current_key = self.current_key.next();
        self.current_key
    }

    /// Install or refresh the entry for `user` in `room`
    ///
    /// Returns the new stream key. A refresh replaces the deadline and still
    /// advances the key.
    pub fn add_or_refresh(&mut self, room: &RoomId, user: &UserId, deadline: Instant) -> StreamKey {
        let key = self.advance();
        let typing = self.rooms.entry(room.clone()).or_default();
        typing.members.insert(
            user.clone(),
            TypingEntry {
                deadline,
                changed_at: key,
            },
        );
        typing.last_changed = key;
        key
    }

    /// Remove the entry for `user` in `room`
    ///
    /// Returns the new stream key, or `None` without touching the cursor when
    /// no entry exists.
    pub fn remove(&mut self, room: &RoomId, user: &UserId) -> Option<StreamKey> {
        let present = self
            .rooms
            .get(room)
            .is_some_and(|typing| typing.members.contains_key(user));
        if !present {
            return None;
        }

        let key = self.advance();
        let typing = self.rooms.get_mut(room)?;
        typing.members.remove(user);
        typing.last_changed = key;
        Some(key)
    }

    /// Whether `user` is currently typing in `room`
    pub fn contains(&self, room: &RoomId, user: &UserId) -> bool {
        self.entry(room, user).is_some()
    }

    /// Entry for a pair, if live
    pub fn entry(&self, room: &RoomId, user: &UserId) -> Option<&TypingEntry> {
        self.rooms.get(room).and_then(|typing| typing.members.get(user))
    }

    /// Users currently typing in `room`, sorted
    pub fn current_members(&self, room: &RoomId) -> Vec<UserId> {
        self.rooms.get(room).map(RoomTyping::user_ids).unwrap_or_default()
    }

    /// Key at which `room` last changed, `None` if it never saw activity
    pub fn last_changed_cursor(&self, room: &RoomId) -> Option<StreamKey> {
        self.rooms.get(room).map(|typing| typing.last_changed)
    }

    /// Rooms among `room_ids` that changed strictly after `from`
    ///
    /// Ordered by ascending change key. Duplicate room ids are reported once.
    pub fn changed_since<'a>(
        &self,
        from: StreamKey,
        room_ids: impl IntoIterator<Item = &'a RoomId>,
    ) -> Vec<RoomChange> {
        let mut seen = HashSet::new();
        let mut changes: Vec<RoomChange> = room_ids
            .into_iter()
            .filter(|room_id| seen.insert(*room_id))
            .filter_map(|room_id| {
                let typing = self.rooms.get(room_id)?;
                (typing.last_changed > from).then(|| RoomChange {
                    room_id: room_id.clone(),
                    last_changed: typing.last_changed,
                    user_ids: typing.user_ids(),
                })
            })
            .collect();

        changes.sort_by_key(|change| change.last_changed);
        changes
    }

    /// Every room whose last change lies in `(from, to]`, ascending
    pub fn changed_between(&self, from: StreamKey, to: StreamKey) -> Vec<RoomChange> {
        let mut changes: Vec<RoomChange> = self
            .rooms
            .iter()
            .filter(|(_, typing)| typing.last_changed > from && typing.last_changed <= to)
            .map(|(room_id, typing)| RoomChange {
                room_id: room_id.clone(),
                last_changed: typing.last_changed,
                user_ids: typing.user_ids(),
            })
            .collect();

        changes.sort_by_key(|change| change.last_changed);
        changes
    }

    /// Number of rooms that ever saw typing activity
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Number of live typing entries across all rooms
    pub fn entry_count(&self) -> usize {
        self.rooms.values().map(|typing| typing.members.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn room(id: &str) -> RoomId {
        RoomId::parse(id).unwrap()
    }

    fn user(id: &str) -> UserId {
        UserId::parse(id).unwrap()
    }

    fn deadline() -> Instant {
        Instant::now() + Duration::from_secs(30)
    }

    #[test]
    fn test_new_table_starts_at_zero() {
        let table = RoomTypingTable::new();
        assert_eq!(table.current_key(), StreamKey::ZERO);
        assert_eq!(table.last_changed_cursor(&room("!a:red")), None);
        assert!(table.current_members(&room("!a:red")).is_empty());
    }

    #[test]
    fn test_add_bumps_cursor_and_stamps_room() {
        let mut table = RoomTypingTable::new();
        let key = table.add_or_refresh(&room("!a:red"), &user("@sid:red"), deadline());

        assert_eq!(key, StreamKey::new(1));
        assert_eq!(table.current_key(), key);
        assert_eq!(table.last_changed_cursor(&room("!a:red")), Some(key));
        assert_eq!(table.current_members(&room("!a:red")), vec![user("@sid:red")]);
        assert_eq!(table.entry(&room("!a:red"), &user("@sid:red")).unwrap().changed_at, key);
    }

    #[test]
    fn test_refresh_keeps_single_entry_and_bumps() {
        let mut table = RoomTypingTable::new();
        let r = room("!a:red");
        let u = user("@sid:red");

        table.add_or_refresh(&r, &u, deadline());
        let later = deadline() + Duration::from_secs(10);
        let key = table.add_or_refresh(&r, &u, later);

        assert_eq!(key, StreamKey::new(2));
        assert_eq!(table.entry_count(), 1);
        assert_eq!(table.entry(&r, &u).unwrap().deadline, later);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut table = RoomTypingTable::new();
        assert_eq!(table.remove(&room("!a:red"), &user("@sid:red")), None);
        assert_eq!(table.current_key(), StreamKey::ZERO);

        table.add_or_refresh(&room("!a:red"), &user("@jim:red"), deadline());
        assert_eq!(table.remove(&room("!a:red"), &user("@sid:red")), None);
        assert_eq!(table.current_key(), StreamKey::new(1));
    }

    #[test]
    fn test_remove_keeps_empty_room() {
        let mut table = RoomTypingTable::new();
        let r = room("!a:red");
        table.add_or_refresh(&r, &user("@sid:red"), deadline());

        let key = table.remove(&r, &user("@sid:red"));
        assert_eq!(key, Some(StreamKey::new(2)));
        assert_eq!(table.room_count(), 1);
        assert_eq!(table.last_changed_cursor(&r), Some(StreamKey::new(2)));
        assert!(table.current_members(&r).is_empty());
    }

    #[test]
    fn test_room_rows_grow_with_distinct_rooms_only() {
        let mut table = RoomTypingTable::new();
        let sid = user("@sid:red");
        for i in 0..3 {
            let r = room(&format!("!r{i}:red"));
            table.add_or_refresh(&r, &sid, deadline());
            table.remove(&r, &sid);
        }
        assert_eq!(table.room_count(), 3);
        assert_eq!(table.entry_count(), 0);

        // Reused rooms do not add rows
        table.add_or_refresh(&room("!r0:red"), &sid, deadline());
        assert_eq!(table.room_count(), 3);
    }

    #[test]
    fn test_members_are_sorted() {
        let mut table = RoomTypingTable::new();
        let r = room("!a:red");
        table.add_or_refresh(&r, &user("@zed:red"), deadline());
        table.add_or_refresh(&r, &user("@amy:red"), deadline());

        assert_eq!(
            table.current_members(&r),
            vec![user("@amy:red"), user("@zed:red")]
        );
    }

    #[test]
    fn test_changed_since_orders_by_key_and_dedups() {
        let mut table = RoomTypingTable::new();
        let a = room("!a:red");
        let b = room("!b:red");
        let c = room("!c:red");

        table.add_or_refresh(&b, &user("@sid:red"), deadline()); // 1
        table.add_or_refresh(&a, &user("@sid:red"), deadline()); // 2
        table.add_or_refresh(&c, &user("@sid:red"), deadline()); // 3

        let changes = table.changed_since(StreamKey::ZERO, [&c, &a, &b, &a]);
        let order: Vec<_> = changes.iter().map(|c| c.room_id.as_str()).collect();
        assert_eq!(order, vec!["!b:red", "!a:red", "!c:red"]);

        let changes = table.changed_since(StreamKey::new(2), [&a, &b, &c]);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].room_id, c);
    }

    #[test]
    fn test_changed_between_covers_all_rooms() {
        let mut table = RoomTypingTable::new();
        table.add_or_refresh(&room("!a:red"), &user("@sid:red"), deadline()); // 1
        table.add_or_refresh(&room("!b:red"), &user("@sid:red"), deadline()); // 2
        table.add_or_refresh(&room("!c:red"), &user("@sid:red"), deadline()); // 3

        let changes = table.changed_between(StreamKey::new(1), StreamKey::new(2));
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].room_id.as_str(), "!b:red");
        assert_eq!(changes[0].last_changed, StreamKey::new(2));
    }
}
