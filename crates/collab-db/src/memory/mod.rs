//! In-memory adapters
//!
//! Used by the service tests and by the server when `STORAGE=memory`.
//! They enforce the same uniqueness and atomicity rules as the PostgreSQL
//! repositories: each compound write happens under one map entry or lock.

mod channels;
mod messages;
mod ports;
mod store;
mod user_state;

pub use ports::{MemoryFileStore, StaticDirectory};
pub use store::InMemoryStore;
