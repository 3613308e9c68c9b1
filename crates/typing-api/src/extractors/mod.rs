//! Axum extractors for request handling
//!
//! Custom extractors for authentication, validation, path ids, and sync
//! query parameters.

mod auth;
mod path;
mod sync_params;
mod validated;

pub use auth::AuthUser;
pub use path::RoomUserPath;
pub use sync_params::{SyncParams, SyncQuery};
pub use validated::ValidatedJson;
