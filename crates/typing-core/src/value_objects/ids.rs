//! Opaque room and user identifiers
//!
//! Both are carried as strings (e.g. `!abc:server` / `@sid:server`). The engine
//! never interprets them beyond requiring a non-empty value without control
//! characters.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Error when parsing an identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum IdParseError {
    #[error("identifier must not be empty")]
    Empty,

    #[error("identifier must not contain control characters")]
    ControlCharacter,
}

fn check_id(raw: &str) -> Result<(), IdParseError> {
    if raw.is_empty() {
        return Err(IdParseError::Empty);
    }
    if raw.chars().any(char::is_control) {
        return Err(IdParseError::ControlCharacter);
    }
    Ok(())
}

macro_rules! opaque_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Parse and validate an identifier
            pub fn parse(raw: impl Into<String>) -> Result<Self, IdParseError> {
                let raw = raw.into();
                check_id(&raw)?;
                Ok(Self(raw))
            }

            /// Borrow the identifier as a string slice
            #[inline]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = IdParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdParseError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::parse(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

opaque_id!(
    /// Room identifier
    RoomId
);

opaque_id!(
    /// User identifier
    UserId
);
