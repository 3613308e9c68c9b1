//! API Integration Tests
//!
//! Each test spawns its own server on an ephemeral port with seeded tokens
//! and room memberships; no external services are required.
//!
//! Run with: cargo test -p integration-tests --test api_tests

use std::time::{Duration, Instant};

use integration_tests::{
    assert_json, assert_status, seed, unique_room, ErrorBody, SyncResponse, TestServer,
    TestUser, TypingRequest,
};
use reqwest::StatusCode;
use serde_json::{json, Value};

// ============================================================================
// Health Check Tests
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    let server = TestServer::start(Default::default()).await.expect("Failed to start server");
    let response = server.get("/health").await.expect("Request failed");
    assert!(response.headers().contains_key("x-request-id"));

    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["stream"]["current_key"], "0");
}

// ============================================================================
// Typing Tests
// ============================================================================

#[tokio::test]
async fn test_typing_visible_to_room_members() {
    let sid = TestUser::unique("sid");
    let jim = TestUser::unique("jim");
    let room = unique_room();
    let server = TestServer::start(seed(&[&sid, &jim], &[&room])).await.unwrap();

    let response = server
        .put_typing(&sid.token, &room, &sid.user_id, &TypingRequest::start(30_000))
        .await
        .unwrap();
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body, json!({}));

    let response = server.sync(&jim.token, "?from=0").await.unwrap();
    let sync: SyncResponse = assert_json(response, StatusCode::OK).await.unwrap();

    assert_eq!(sync.next_key, "1");
    assert!(!sync.limited);
    assert_eq!(sync.events.len(), 1);
    assert_eq!(sync.events[0].event_type, "m.typing");
    assert_eq!(sync.events[0].room_id, room.as_str());
    assert_eq!(sync.events[0].content.user_ids, vec![sid.user_id.to_string()]);

    // Caught up: nothing new
    let response = server.sync(&jim.token, "?from=1").await.unwrap();
    let sync: SyncResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(sync.events.is_empty());
    assert_eq!(sync.next_key, "1");
}

#[tokio::test]
async fn test_typing_expires_after_timeout() {
    let sid = TestUser::unique("sid");
    let room = unique_room();
    let server = TestServer::start(seed(&[&sid], &[&room])).await.unwrap();

    server
        .put_typing(&sid.token, &room, &sid.user_id, &TypingRequest::start(200))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(600)).await;

    let response = server.sync(&sid.token, "?from=1").await.unwrap();
    let sync: SyncResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(sync.next_key, "2");
    assert_eq!(sync.events.len(), 1);
    assert!(sync.events[0].content.user_ids.is_empty());

    // Typing again after expiry advances the key once more
    server
        .put_typing(&sid.token, &room, &sid.user_id, &TypingRequest::start(30_000))
        .await
        .unwrap();
    assert_eq!(server.state.engine().get_current_key().into_inner(), 3);
}

#[tokio::test]
async fn test_stop_typing_is_idempotent() {
    let sid = TestUser::unique("sid");
    let room = unique_room();
    let server = TestServer::start(seed(&[&sid], &[&room])).await.unwrap();

    server
        .put_typing(&sid.token, &room, &sid.user_id, &TypingRequest::start(30_000))
        .await
        .unwrap();

    for _ in 0..2 {
        let response = server
            .put_typing(&sid.token, &room, &sid.user_id, &TypingRequest::stop())
            .await
            .unwrap();
        assert_status(response, StatusCode::OK).await.unwrap();
    }
    assert_eq!(server.state.engine().get_current_key().into_inner(), 2);
}

#[tokio::test]
async fn test_typing_rejections() {
    let sid = TestUser::unique("sid");
    let jim = TestUser::unique("jim");
    let outsider = TestUser::unique("eve");
    let room = unique_room();
    let mut seeded = seed(&[&sid, &jim], &[&room]);
    seeded.tokens.extend(seed(&[&outsider], &[]).tokens);
    let server = TestServer::start(seeded).await.unwrap();

    // Someone else's state
    let response = server
        .put_typing(&sid.token, &room, &jim.user_id, &TypingRequest::start(30_000))
        .await
        .unwrap();
    let err: ErrorBody = assert_json(response, StatusCode::FORBIDDEN).await.unwrap();
    assert_eq!(err.error.code, "FORBIDDEN");

    // Not a member
    let response = server
        .put_typing(&outsider.token, &room, &outsider.user_id, &TypingRequest::start(30_000))
        .await
        .unwrap();
    let err: ErrorBody = assert_json(response, StatusCode::FORBIDDEN).await.unwrap();
    assert_eq!(err.error.code, "NOT_IN_ROOM");

    // Missing timeout
    let response = server
        .put_typing(&sid.token, &room, &sid.user_id, &json!({"typing": true}))
        .await
        .unwrap();
    let err: ErrorBody = assert_json(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(err.error.code, "MISSING_PARAM");

    // Unknown token
    let response = server
        .put_typing("bogus", &room, &sid.user_id, &TypingRequest::start(30_000))
        .await
        .unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();

    assert_eq!(server.state.engine().get_current_key().into_inner(), 0);
}

// ============================================================================
// Sync Tests
// ============================================================================

#[tokio::test]
async fn test_sync_rejects_bad_keys() {
    let sid = TestUser::unique("sid");
    let server = TestServer::start(seed(&[&sid], &[])).await.unwrap();

    let response = server.sync(&sid.token, "?from=s1").await.unwrap();
    assert_status(response, StatusCode::BAD_REQUEST).await.unwrap();

    let response = server.sync(&sid.token, "?from=42").await.unwrap();
    let err: ErrorBody = assert_json(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(err.error.code, "INVALID_STREAM_KEY");
}

#[tokio::test]
async fn test_sync_limit_resumes_without_loss() {
    let sid = TestUser::unique("sid");
    let rooms = [unique_room(), unique_room(), unique_room()];
    let server = TestServer::start(seed(&[&sid], &[&rooms[0], &rooms[1], &rooms[2]]))
        .await
        .unwrap();

    for room in &rooms {
        server
            .put_typing(&sid.token, room, &sid.user_id, &TypingRequest::start(30_000))
            .await
            .unwrap();
    }

    let response = server.sync(&sid.token, "?from=0&limit=2").await.unwrap();
    let first: SyncResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(first.limited);
    assert_eq!(first.next_key, "2");
    assert_eq!(first.events[0].room_id, rooms[0].as_str());
    assert_eq!(first.events[1].room_id, rooms[1].as_str());

    let response = server
        .sync(&sid.token, &format!("?from={}&limit=2", first.next_key))
        .await
        .unwrap();
    let rest: SyncResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(!rest.limited);
    assert_eq!(rest.events.len(), 1);
    assert_eq!(rest.events[0].room_id, rooms[2].as_str());
}

#[tokio::test]
async fn test_sync_long_poll_wakes_on_typing() {
    let sid = TestUser::unique("sid");
    let jim = TestUser::unique("jim");
    let room = unique_room();
    let server = TestServer::start(seed(&[&sid, &jim], &[&room])).await.unwrap();

    let started = Instant::now();
    let poll = server.sync(&jim.token, "?from=0&timeout=5000");
    let typer = async {
        tokio::time::sleep(Duration::from_millis(200)).await;
        server
            .put_typing(&sid.token, &room, &sid.user_id, &TypingRequest::start(30_000))
            .await
    };
    let (response, typed) = tokio::join!(poll, typer);
    typed.unwrap();

    let sync: SyncResponse = assert_json(response.unwrap(), StatusCode::OK).await.unwrap();
    assert_eq!(sync.events.len(), 1);
    assert_eq!(sync.next_key, "1");
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn test_sync_long_poll_times_out() {
    let sid = TestUser::unique("sid");
    let server = TestServer::start(seed(&[&sid], &[])).await.unwrap();

    let started = Instant::now();
    let response = server.sync(&sid.token, "?from=0&timeout=300").await.unwrap();
    let sync: SyncResponse = assert_json(response, StatusCode::OK).await.unwrap();

    assert!(sync.events.is_empty());
    assert_eq!(sync.next_key, "0");
    assert!(started.elapsed() >= Duration::from_millis(300));
}
