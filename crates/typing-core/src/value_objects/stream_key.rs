//! Stream key - position in the sequence of typing-state changes
//!
//! The key starts at zero before any change has happened; the first change
//! produces key 1. Every state change advances it by exactly one.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Monotonic stream cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct StreamKey(u64);

impl StreamKey {
    /// Key before any change has been recorded
    pub const ZERO: Self = Self(0);

    /// Create a key from a raw value
    #[inline]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Get the inner value
    #[inline]
    pub const fn into_inner(self) -> u64 {
        self.0
    }

    /// The key that follows this one
    ///
    /// Saturates at `u64::MAX`, which a process cannot reach in practice.
    #[inline]
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// Parse from string representation
    pub fn parse(s: &str) -> Result<Self, StreamKeyParseError> {
        s.trim()
            .parse::<u64>()
            .map(StreamKey)
            .map_err(|_| StreamKeyParseError::InvalidFormat(s.to_string()))
    }
}

/// Error when parsing a stream key from string
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StreamKeyParseError {
    #[error("invalid stream key: {0:?}")]
    InvalidFormat(String),
}

impl fmt::Display for StreamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for StreamKey {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<StreamKey> for u64 {
    fn from(key: StreamKey) -> Self {
        key.0
    }
}

impl std::str::FromStr for StreamKey {
    type Err = StreamKeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StreamKey::parse(s)
    }
}

// Serialize as string so clients treat it as an opaque token
impl Serialize for StreamKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0.to_string())
    }
}

// Deserialize from string or number
impl<'de> Deserialize<'de> for StreamKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};

        struct StreamKeyVisitor;

        impl Visitor<'_> for StreamKeyVisitor {
            type Value = StreamKey;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a string or non-negative integer stream key")
            }

            fn visit_u64<E>(self, value: u64) -> Result<StreamKey, E>
            where
                E: de::Error,
            {
                Ok(StreamKey(value))
            }

            fn visit_i64<E>(self, value: i64) -> Result<StreamKey, E>
            where
                E: de::Error,
            {
                u64::try_from(value)
                    .map(StreamKey)
                    .map_err(|_| de::Error::custom("stream key must not be negative"))
            }

            fn visit_str<E>(self, value: &str) -> Result<StreamKey, E>
            where
                E: de::Error,
            {
                StreamKey::parse(value).map_err(de::Error::custom)
            }
        }

        deserializer.deserialize_any(StreamKeyVisitor)
    }
}
