//! Authentication extractor
//!
//! Resolves the bearer token in the Authorization header through the
//! configured [`Authenticator`](crate::collaborators::Authenticator).

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use typing_core::UserId;

use crate::response::ApiError;
use crate::state::AppState;

/// Authenticated requester
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: UserId,
    pub is_guest: bool,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::MissingAuth)?;

        let app_state = AppState::from_ref(state);

        let requester = app_state
            .authenticator()
            .authenticate(bearer.token())
            .await
            .ok_or_else(|| {
                tracing::warn!("Unrecognised access token");
                ApiError::UnknownToken
            })?;

        Ok(Self {
            user_id: requester.user_id,
            is_guest: requester.is_guest,
        })
    }
}
