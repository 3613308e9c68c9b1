//! Sync query extractor
//!
//! Parses `from`, `limit` and `timeout` from the query string of the typing
//! stream endpoint.

use std::time::Duration;

use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use serde::Deserialize;
use typing_core::StreamKey;

use crate::response::ApiError;

/// Raw sync query parameters
#[derive(Debug, Default, Deserialize)]
pub struct SyncQuery {
    /// Last stream key the client has seen
    #[serde(default)]
    pub from: Option<String>,
    /// Maximum number of events to return
    #[serde(default)]
    pub limit: Option<String>,
    /// Long-poll duration in milliseconds
    #[serde(default)]
    pub timeout: Option<String>,
}

/// Parsed sync query parameters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncParams {
    /// Defaults to the start of the stream
    pub from: StreamKey,
    /// `None` means the server default
    pub limit: Option<usize>,
    /// `None` means answer immediately
    pub timeout: Option<Duration>,
}

fn parse_number<T: std::str::FromStr>(name: &str, raw: Option<String>) -> Result<Option<T>, ApiError> {
    raw.map(|s| {
        s.trim()
            .parse::<T>()
            .map_err(|_| ApiError::invalid_query(format!("'{name}' must be a non-negative integer")))
    })
    .transpose()
}

impl TryFrom<SyncQuery> for SyncParams {
    type Error = ApiError;

    fn try_from(query: SyncQuery) -> Result<Self, Self::Error> {
        let from = query
            .from
            .map(|s| {
                StreamKey::parse(s.trim())
                    .map_err(|_| ApiError::invalid_query("'from' must be a stream key"))
            })
            .transpose()?
            .unwrap_or_default();

        let limit = parse_number::<usize>("limit", query.limit)?;
        let timeout = parse_number::<u64>("timeout", query.timeout)?.map(Duration::from_millis);

        Ok(Self { from, limit, timeout })
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for SyncParams
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(query) = Query::<SyncQuery>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::invalid_query(e.to_string()))?;

        Self::try_from(query)
    }
}
