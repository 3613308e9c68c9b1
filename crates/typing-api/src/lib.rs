//! # typing-api
//!
//! REST API server for the typing stream, built with the Axum framework.

pub mod collaborators;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod server;
pub mod state;

pub use collaborators::{
    Authenticator, InMemoryMembership, Requester, RoomMembership, StaticTokenAuthenticator,
};
pub use server::{create_app, create_app_state, run, run_server};
pub use state::AppState;
