//! Typing notification handler
//!
//! PUT /rooms/{room_id}/typing/{user_id}

use axum::extract::State;
use serde::Deserialize;
use tracing::{debug, instrument};
use typing_core::DomainError;
use validator::Validate;

use crate::extractors::{AuthUser, RoomUserPath, ValidatedJson};
use crate::response::{ApiError, ApiResult, EmptyJson};
use crate::state::AppState;

/// Request body for a typing notification
#[derive(Debug, Deserialize, Validate)]
pub struct TypingRequest {
    pub typing: bool,
    /// Milliseconds; required when `typing` is true
    #[validate(range(min = 0))]
    #[serde(default)]
    pub timeout: Option<i64>,
}

/// Start or stop typing in a room
///
/// Only the requester may change their own state, and only in rooms they
/// have joined. Stopping when not typing succeeds without side effects.
/// Membership is checked again after starting, so a concurrent leave never
/// leaves a stale typing entry behind.
#[instrument(skip_all, fields(room_id = %path.room_id, user_id = %auth.user_id))]
pub async fn set_typing(
    State(state): State<AppState>,
    auth: AuthUser,
    path: RoomUserPath,
    ValidatedJson(request): ValidatedJson<TypingRequest>,
) -> ApiResult<EmptyJson> {
    let RoomUserPath { room_id, user_id } = path;

    if user_id != auth.user_id {
        return Err(DomainError::Forbidden(format!(
            "{} cannot set typing state for {user_id}",
            auth.user_id
        ))
        .into());
    }

    if !state.membership().is_member(&room_id, &user_id).await {
        return Err(DomainError::NotInRoom { room_id, user_id }.into());
    }

    if request.typing {
        let requested = request.timeout.ok_or(DomainError::MissingParam("timeout"))?;
        let requested = u64::try_from(requested)
            .map_err(|_| ApiError::invalid_body("timeout must not be negative"))?;
        let timeout_ms = state.config().typing.clamp_timeout(requested);

        state.engine().set_typing(&room_id, &user_id, timeout_ms)?;

        // A leave that landed between the check and the insert already ran
        // its cleanup; undo the insert ourselves.
        if !state.membership().is_member(&room_id, &user_id).await {
            state.engine().user_left_room(&room_id, &user_id);
            debug!("Left room while starting to type");
            return Err(DomainError::NotInRoom { room_id, user_id }.into());
        }
    } else {
        state.engine().stop_typing(&room_id, &user_id);
    }

    Ok(EmptyJson)
}
