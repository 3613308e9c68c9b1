//! Server setup and initialization
//!
//! Provides the application builder and server runner.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tracing::info;
use typing_common::{AppConfig, AppError};
use typing_stream::TypingEngine;

use crate::collaborators::{InMemoryMembership, StaticTokenAuthenticator};
use crate::middleware::{apply_middleware, request_timeout};
use crate::routes::create_router;
use crate::state::AppState;

/// Build the complete Axum application with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    let timeout = request_timeout(state.config().sync.max_wait());
    let router = create_router();
    let router = apply_middleware(router, timeout);
    router.with_state(state)
}

/// Create the engine and in-memory collaborators and wrap them in AppState
///
/// Must be called from within a Tokio runtime; expiry timers are spawned on it.
pub fn create_app_state(config: AppConfig) -> AppState {
    let engine = TypingEngine::new();

    let authenticator = StaticTokenAuthenticator::from_seed(&config.seed.tokens);
    let membership = InMemoryMembership::from_seed(engine.clone(), &config.seed.rooms);
    info!(
        tokens = authenticator.len(),
        rooms = membership.room_count(),
        "In-memory collaborators seeded"
    );

    AppState::new(engine, Arc::new(authenticator), Arc::new(membership), config)
}

/// Run the HTTP server
pub async fn run_server(app: Router, addr: SocketAddr) -> Result<(), AppError> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| AppError::Bind { addr, source })?;

    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .await
        .map_err(AppError::Serve)?;

    Ok(())
}

/// Run the complete server with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let address = config.api.address();
    let addr = address
        .parse::<SocketAddr>()
        .map_err(|e| AppError::InvalidAddress {
            address: address.clone(),
            reason: e.to_string(),
        })?;

    let state = create_app_state(config);
    let app = create_app(state);

    run_server(app, addr).await
}
