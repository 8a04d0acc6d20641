//! Database models - SQLx-compatible structs for PostgreSQL tables

mod channel;
mod directory;
mod message;
mod poll;
mod read_state;
mod saved;

pub use channel::{CategoryModel, ChannelMemberModel, ChannelModel};
pub use directory::EmployeeModel;
pub use message::{MessageModel, ReactionModel, RootMessageModel};
pub use poll::{PollModel, PollOptionModel, PollVoteModel};
pub use read_state::{MentionModel, ReadMarkerModel};
pub use saved::{QuickReplyModel, SavedItemModel};
