//! Integration test utilities for the typing API
//!
//! Spawns the REST server on an ephemeral port and drives it over HTTP.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
