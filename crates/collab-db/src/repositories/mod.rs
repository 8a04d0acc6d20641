//! Repository implementations
//!
//! PostgreSQL implementations of the repository traits defined in collab-core.
//! Each repository handles database operations for a specific domain entity.

mod channel;
mod directory;
mod error;
mod member;
mod message;
mod poll;
mod reaction;
mod read_state;
mod saved;

pub use channel::{PgCategoryRepository, PgChannelRepository};
pub use directory::PgDirectoryService;
pub use member::PgMemberRepository;
pub use message::PgMessageRepository;
pub use poll::PgPollRepository;
pub use reaction::PgReactionRepository;
pub use read_state::PgReadStateRepository;
pub use saved::{PgQuickReplyRepository, PgSavedItemRepository};
