//! Domain errors - error types for the domain layer

use thiserror::Error;

use crate::value_objects::{RoomId, StreamKey, UserId};

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Missing parameter: {0}")]
    MissingParam(&'static str),

    #[error("Stream key {requested} is ahead of the current key {current}")]
    StreamKeyAhead {
        requested: StreamKey,
        current: StreamKey,
    },

    // =========================================================================
    // Authorization Errors
    // =========================================================================
    #[error("User {user_id} is not in room {room_id}")]
    NotInRoom { room_id: RoomId, user_id: UserId },

    #[error("Forbidden: {0}")]
    Forbidden(String),
}

impl DomainError {
    /// Create an invalid argument error
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Get an error code string for API responses
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "INVALID_ARGUMENT",
            Self::MissingParam(_) => "MISSING_PARAM",
            Self::StreamKeyAhead { .. } => "INVALID_STREAM_KEY",
            Self::NotInRoom { .. } => "NOT_IN_ROOM",
            Self::Forbidden(_) => "FORBIDDEN",
        }
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidArgument(_) | Self::MissingParam(_) | Self::StreamKeyAhead { .. }
        )
    }

    /// Check if this is an authorization error
    pub fn is_authorization(&self) -> bool {
        matches!(self, Self::NotInRoom { .. } | Self::Forbidden(_))
    }
}

/// Result type alias for domain operations
pub type DomainResult<T> = Result<T, DomainError>;
