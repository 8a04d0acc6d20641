//! # collab-db
//!
//! Storage layer implementing the repository traits of `collab-core`.
//!
//! ## Overview
//!
//! - Connection pool management and embedded migrations
//! - Database models with SQLx `FromRow` derives
//! - Entity ↔ Model mappers
//! - PostgreSQL repository implementations
//! - In-memory adapters with the same semantics, for tests and single-node runs
//!
//! ## Usage
//!
//! ```rust,ignore
//! use collab_db::pool::{create_pool, run_migrations, DatabaseConfig};
//! use collab_db::repositories::PgMessageRepository;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = create_pool(&DatabaseConfig::from_env()).await?;
//!     run_migrations(&pool).await?;
//!     let messages = PgMessageRepository::new(pool);
//!     Ok(())
//! }
//! ```

pub mod mappers;
pub mod memory;
pub mod models;
pub mod pool;
pub mod repositories;

// Re-export commonly used types
pub use memory::{InMemoryStore, MemoryFileStore, StaticDirectory};
pub use pool::{create_pool, create_pool_from_env, run_migrations, DatabaseConfig, PgPool};
pub use repositories::{
    PgCategoryRepository, PgChannelRepository, PgDirectoryService, PgMemberRepository,
    PgMessageRepository, PgPollRepository, PgQuickReplyRepository, PgReactionRepository,
    PgReadStateRepository, PgSavedItemRepository,
};
