//! # collab-service
//!
//! Application layer: the collaboration use cases, the dependency container
//! they run against, request/response DTOs and the service error type.
//!
//! Services are thin borrowers of a [`ServiceContext`]:
//!
//! ```rust,ignore
//! let message = MessageService::new(&ctx)
//!     .post_message(&principal, channel_id, request)
//!     .await?;
//! ```

pub mod directory;
pub mod dto;
pub mod notifier;
pub mod services;

pub use directory::CachedDirectory;
pub use dto::*;
pub use notifier::{LoggingNotifier, RecordingNotifier};
pub use services::{
    ChannelAccess, ChannelService, DirectoryQueryService, DmService, FileService, MemberService,
    MessageService, PermissionService, PollService, PresenceService, QuickReplyService,
    ReactionService, ReadStateService, SavedItemService, SearchService, ServiceContext,
    ServiceContextBuilder, ServiceError, ServiceResult, ServiceSettings,
};
