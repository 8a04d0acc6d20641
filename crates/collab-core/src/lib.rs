//! # collab-core
//!
//! Domain layer of the collaboration service: entities, value objects,
//! repository traits, collaborator ports, domain events and the mention
//! resolver. Nothing here touches a database, cache or web framework.

pub mod clock;
pub mod entities;
pub mod error;
pub mod events;
pub mod mentions;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    Category, Channel, ChannelMember, ChannelType, ContentType, Employee, FileRef, ItemType,
    MemberRole, MentionRecord, Message, Poll, PollOption, PollResults, PollVote, PresenceStatus,
    Principal, QuickReply, Reaction, ReactionSummary, ReadMarker, Role, RootMessage, SavedItem,
    Thread, UnreadState, UserStatus,
};
pub use error::DomainError;
pub use events::{DomainEvent, EventEnvelope};
pub use mentions::{extract_mentions, MentionCandidate, MentionPolicy};
pub use traits::{
    CategoryRepository, ChannelRepository, DirectoryService, EventPublisher, EventStream,
    FileStore, IdentityProvider, MemberRepository, MessageQuery, MessageRepository, Notification,
    NotificationDispatcher, NotificationKind, PollRepository, PresenceRepository,
    QuickReplyRepository, ReactionRepository, ReadStateRepository, RepoResult,
    SavedItemRepository, SearchFilters, SearchQuery,
};
pub use value_objects::{CanonicalPair, Snowflake, SnowflakeGenerator, SnowflakeParseError};
