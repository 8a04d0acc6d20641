//! # collab-cache
//!
//! Redis layer for presence and cross-instance event fan-out.
//!
//! ## Features
//!
//! - **Connection Pool**: Managed Redis connection pool with deadpool
//! - **Presence**: Status entries with a TTL, refreshed on every update
//! - **Pub/Sub**: Channel-scoped domain events distributed across server instances
//! - **Local bus**: In-process broadcast bus for single-node deployments and tests
//!
//! ## Example
//!
//! ```ignore
//! use collab_cache::{RedisEventBus, RedisPool, RedisPoolConfig, RedisPresenceStore};
//!
//! let pool = RedisPool::new(RedisPoolConfig::default())?;
//! let presence = RedisPresenceStore::new(pool.clone(), 300);
//! let bus = RedisEventBus::connect(pool);
//!
//! bus.publish(&DomainEvent::ChannelUpdated { channel_id }).await?;
//! let mut events = bus.subscribe(channel_id).await?;
//! ```

pub mod pool;
pub mod presence;
pub mod pubsub;

// Re-export pool types
pub use pool::{RedisPool, RedisPoolConfig, RedisPoolError, RedisResult};

// Re-export presence types
pub use presence::RedisPresenceStore;

// Re-export pubsub types
pub use pubsub::{
    channel_topic, parse_channel_topic, LocalEventBus, ReceivedMessage, RedisEventBus, Subscriber,
    SubscriberConfig, SubscriberError, SubscriberResult, Subscription, CHANNEL_PREFIX,
};
