//! Route handlers
//!
//! All HTTP request handlers organized by endpoint.

pub mod health;
pub mod sync;
pub mod typing;
