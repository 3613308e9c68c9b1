//! Path parameter extractors
//!
//! Parse room and user ids straight out of the URL so handlers receive
//! validated identifiers.

use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use typing_core::{RoomId, UserId};

use crate::response::ApiError;

/// `/rooms/:room_id/typing/:user_id`
#[derive(Debug, Clone)]
pub struct RoomUserPath {
    pub room_id: RoomId,
    pub user_id: UserId,
}

#[async_trait]
impl<S> FromRequestParts<S> for RoomUserPath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path((room_id, user_id)) = Path::<(String, String)>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::invalid_path(e.to_string()))?;

        let room_id = RoomId::parse(room_id)
            .map_err(|e| ApiError::invalid_path(format!("room_id: {e}")))?;
        let user_id = UserId::parse(user_id)
            .map_err(|e| ApiError::invalid_path(format!("user_id: {e}")))?;

        Ok(Self { room_id, user_id })
    }
}
