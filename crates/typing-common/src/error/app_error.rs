//! Application error types
//!
//! Startup and serving failures. Request-level failures live in the API
//! crate's `ApiError`.

use std::io;
use std::net::SocketAddr;

/// Errors that stop the server
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid listen address {address}: {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("Failed to bind to {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("Server error: {0}")]
    Serve(#[source] io::Error),
}
