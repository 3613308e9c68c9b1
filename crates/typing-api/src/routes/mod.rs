//! Route definitions
//!
//! Client endpoints are mounted under the client API prefix; the health
//! check sits at the root.

use axum::{
    routing::{get, put},
    Router,
};

use crate::handlers::{health, sync, typing};
use crate::state::AppState;

/// Prefix for client-server endpoints
pub const CLIENT_API_PREFIX: &str = "/_matrix/client/api/v1";

/// Create the main router with all routes
pub fn create_router() -> Router<AppState> {
    Router::new()
        .nest(CLIENT_API_PREFIX, client_routes())
        .merge(health_routes())
}

/// Health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health::health_check))
}

/// Client API routes
fn client_routes() -> Router<AppState> {
    Router::new()
        .route("/rooms/:room_id/typing/:user_id", put(typing::set_typing))
        .route("/typing", get(sync::get_typing))
}
