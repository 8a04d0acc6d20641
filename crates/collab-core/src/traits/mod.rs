//! Repository traits and collaborator ports

mod ports;
mod repositories;

pub use ports::{
    DirectoryService, EventPublisher, EventStream, FileStore, IdentityProvider, Notification,
    NotificationDispatcher, NotificationKind,
};
pub use repositories::{
    CategoryRepository, ChannelRepository, MemberRepository, MessageQuery, MessageRepository,
    PollRepository, PresenceRepository, QuickReplyRepository, ReactionRepository,
    ReadStateRepository, RepoResult, SavedItemRepository, SearchFilters, SearchQuery,
};
