//! Typing stream handler
//!
//! GET /typing?from=&limit=&timeout=

use axum::{extract::State, Json};
use tokio::time::Instant;
use tracing::instrument;
use typing_stream::EventBatch;

use crate::extractors::{AuthUser, SyncParams};
use crate::response::ApiResult;
use crate::state::AppState;

/// Typing events for the requester's joined rooms since `from`
///
/// With a `timeout` the request is held until an event becomes visible to the
/// requester or the (server-capped) timeout elapses. Changes in rooms the
/// requester cannot see wake the wait but do not end it.
#[instrument(skip_all, fields(user_id = %auth.user_id, from = %params.from))]
pub async fn get_typing(
    State(state): State<AppState>,
    auth: AuthUser,
    params: SyncParams,
) -> ApiResult<Json<EventBatch>> {
    let sync = &state.config().sync;
    let limit = params.limit.unwrap_or(sync.default_limit);
    let deadline = params
        .timeout
        .map(|timeout| Instant::now() + timeout.min(sync.max_wait()));

    let rooms = state.membership().joined_rooms(&auth.user_id).await;
    let engine = state.engine();

    loop {
        let batch = engine.get_new_events(&auth.user_id, params.from, &rooms, Some(limit), auth.is_guest)?;

        let remaining = deadline.map_or(std::time::Duration::ZERO, |deadline| {
            deadline.saturating_duration_since(Instant::now())
        });
        if !batch.is_empty() || remaining.is_zero() {
            return Ok(Json(batch));
        }

        engine.wait_for_events(batch.next_key, remaining).await?;
    }
}
