//! Application state
//!
//! Holds the shared state for the Axum application: the typing engine, the
//! collaborators it relies on, and configuration.

use std::sync::Arc;

use typing_common::AppConfig;
use typing_stream::TypingEngine;

use crate::collaborators::{Authenticator, RoomMembership};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    engine: TypingEngine,
    authenticator: Arc<dyn Authenticator>,
    membership: Arc<dyn RoomMembership>,
    config: Arc<AppConfig>,
}

impl AppState {
    /// Create a new AppState
    pub fn new(
        engine: TypingEngine,
        authenticator: Arc<dyn Authenticator>,
        membership: Arc<dyn RoomMembership>,
        config: AppConfig,
    ) -> Self {
        Self {
            engine,
            authenticator,
            membership,
            config: Arc::new(config),
        }
    }

    pub fn engine(&self) -> &TypingEngine {
        &self.engine
    }

    pub fn authenticator(&self) -> &dyn Authenticator {
        self.authenticator.as_ref()
    }

    pub fn membership(&self) -> &dyn RoomMembership {
        self.membership.as_ref()
    }

    /// Get the application configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("engine", &self.engine)
            .field("authenticator", &"Authenticator")
            .field("membership", &"RoomMembership")
            .field("config", &"AppConfig")
            .finish()
    }
}
