//! Business logic services
//!
//! Each service borrows the shared [`ServiceContext`], checks channel access
//! through [`PermissionService`], performs its mutation and then publishes
//! events and notifications without letting their failures reach the caller.

pub mod channel;
pub mod context;
pub mod dm;
pub mod employee;
pub mod error;
pub mod file;
pub mod member;
pub mod message;
pub mod permission;
pub mod poll;
pub mod presence;
pub mod quick_reply;
pub mod reaction;
pub mod read_state;
pub mod saved;
pub mod search;

// Re-export all services for convenience
pub use channel::ChannelService;
pub use context::{ServiceContext, ServiceContextBuilder, ServiceSettings};
pub use dm::DmService;
pub use employee::DirectoryQueryService;
pub use error::{ServiceError, ServiceResult};
pub use file::FileService;
pub use member::MemberService;
pub use message::MessageService;
pub use permission::{ChannelAccess, PermissionService};
pub use poll::PollService;
pub use presence::PresenceService;
pub use quick_reply::QuickReplyService;
pub use reaction::ReactionService;
pub use read_state::ReadStateService;
pub use saved::SavedItemService;
pub use search::SearchService;
