//! Integration test utilities for the collaboration server
//!
//! Spawns the full router on an ephemeral port with in-memory storage so the
//! REST API and the channel event socket can be exercised end to end.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
