//! Domain entities - core business objects

mod channel;
mod identity;
mod message;
mod poll;
mod presence;
mod reaction;
mod read_state;
mod saved;

pub use channel::{Category, Channel, ChannelMember, ChannelType, MemberRole};
pub use identity::{Employee, Principal, Role};
pub use message::{
    validate_content, ContentType, FileRef, Message, RootMessage, Thread, MAX_CONTENT_LENGTH,
};
pub use poll::{
    normalize_options, Poll, PollOption, PollResults, PollVote, MAX_POLL_OPTIONS,
    MIN_POLL_OPTIONS,
};
pub use presence::{PresenceStatus, UserStatus, MAX_STATUS_TEXT_LENGTH};
pub use reaction::{Reaction, ReactionSummary};
pub use read_state::{MentionRecord, ReadMarker, UnreadState};
pub use saved::{QuickReply, SavedItem, ItemType};
