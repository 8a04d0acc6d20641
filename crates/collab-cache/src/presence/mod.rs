//! Presence storage

mod store;

pub use store::RedisPresenceStore;
