//! Test fixtures and data generators

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use typing_common::{SeedConfig, SeedToken};
use typing_core::{RoomId, UserId};

/// Counter for unique test data
static COUNTER: AtomicU64 = AtomicU64::new(1);

/// Get a unique suffix for test data
pub fn unique_suffix() -> u64 {
    COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// A seeded user and their access token
#[derive(Debug, Clone)]
pub struct TestUser {
    pub user_id: UserId,
    pub token: String,
}

impl TestUser {
    pub fn unique(name: &str) -> Self {
        let suffix = unique_suffix();
        Self {
            user_id: UserId::parse(format!("@{name}{suffix}:test")).expect("valid user id"),
            token: format!("{name}-token-{suffix}"),
        }
    }
}

/// Unique room id
pub fn unique_room() -> RoomId {
    RoomId::parse(format!("!room{}:test", unique_suffix())).expect("valid room id")
}

/// Seed config with the given users all joined to `rooms`
pub fn seed(users: &[&TestUser], rooms: &[&RoomId]) -> SeedConfig {
    SeedConfig {
        tokens: users
            .iter()
            .map(|u| SeedToken {
                token: u.token.clone(),
                user_id: u.user_id.clone(),
                is_guest: false,
            })
            .collect(),
        rooms: rooms
            .iter()
            .map(|r| ((*r).clone(), users.iter().map(|u| u.user_id.clone()).collect()))
            .collect(),
    }
}

/// Typing notification body
#[derive(Debug, Serialize)]
pub struct TypingRequest {
    pub typing: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

impl TypingRequest {
    pub fn start(timeout: u64) -> Self {
        Self {
            typing: true,
            timeout: Some(timeout),
        }
    }

    pub fn stop() -> Self {
        Self {
            typing: false,
            timeout: None,
        }
    }
}

/// Typing event as returned by the sync endpoint
#[derive(Debug, Deserialize)]
pub struct TypingEventBody {
    #[serde(rename = "type")]
    pub event_type: String,
    pub room_id: String,
    pub content: TypingContentBody,
}

#[derive(Debug, Deserialize)]
pub struct TypingContentBody {
    pub user_ids: Vec<String>,
}

/// Sync endpoint response
#[derive(Debug, Deserialize)]
pub struct SyncResponse {
    pub events: Vec<TypingEventBody>,
    pub next_key: String,
    pub limited: bool,
}

/// Error body
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}
