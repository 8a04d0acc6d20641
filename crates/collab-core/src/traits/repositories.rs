//! Repository traits (ports) - define the interface for data access
//!
//! The domain layer defines what it needs, and the infrastructure layer
//! provides the implementation. Every implementation must enforce the same
//! uniqueness and atomicity rules; services rely on them instead of
//! check-then-write sequences.

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::entities::{
    Category, Channel, ChannelMember, ItemType, MentionRecord, Message, Poll, PollVote,
    PresenceStatus, QuickReply, Reaction, ReadMarker, RootMessage, SavedItem,
};
use crate::error::DomainError;
use crate::value_objects::{CanonicalPair, Snowflake};

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// Channel Repository
// ============================================================================

#[async_trait]
pub trait ChannelRepository: Send + Sync {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Channel>>;

    /// Insert a public or private channel together with its first admin
    async fn create(&self, channel: &Channel, owner: &ChannelMember) -> RepoResult<()>;

    /// Insert a direct channel keyed by `pair` unless one already exists.
    ///
    /// Returns the channel that owns the pair afterwards: `channel` when this
    /// call won, the earlier one otherwise.
    async fn create_direct(
        &self,
        channel: &Channel,
        pair: CanonicalPair,
        members: [ChannelMember; 2],
    ) -> RepoResult<Channel>;

    async fn find_direct(&self, pair: CanonicalPair) -> RepoResult<Option<Channel>>;

    /// Update name, description, icon, color and category
    async fn update(&self, channel: &Channel) -> RepoResult<()>;

    /// Sets `archived_at` once; archiving twice keeps the first timestamp.
    async fn archive(&self, id: Snowflake, at: DateTime<Utc>) -> RepoResult<()>;

    /// Channels the user is a member of, ordered by id
    async fn find_by_member(&self, user_id: Snowflake) -> RepoResult<Vec<Channel>>;

    /// Public, non-archived channels ordered by name
    async fn find_public(&self) -> RepoResult<Vec<Channel>>;
}

// ============================================================================
// Category Repository
// ============================================================================

#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Category>>;

    async fn create(&self, category: &Category) -> RepoResult<()>;

    /// Ordered by position, then id
    async fn list(&self) -> RepoResult<Vec<Category>>;
}

// ============================================================================
// Member Repository
// ============================================================================

#[async_trait]
pub trait MemberRepository: Send + Sync {
    async fn find(&self, channel_id: Snowflake, user_id: Snowflake)
        -> RepoResult<Option<ChannelMember>>;

    /// Members ordered by join time
    async fn find_by_channel(&self, channel_id: Snowflake) -> RepoResult<Vec<ChannelMember>>;

    /// Fails with `AlreadyMember` when the row exists
    async fn add(&self, member: &ChannelMember) -> RepoResult<()>;

    async fn remove(&self, channel_id: Snowflake, user_id: Snowflake) -> RepoResult<()>;

    async fn channel_ids_for_user(&self, user_id: Snowflake) -> RepoResult<Vec<Snowflake>>;
}

// ============================================================================
// Message Repository
// ============================================================================

/// Cursor pagination over `(created_at, id)` order. `before` and `after`
/// are message ids.
#[derive(Debug, Clone, Copy)]
pub struct MessageQuery {
    pub before: Option<Snowflake>,
    pub after: Option<Snowflake>,
    pub limit: i64,
}

impl Default for MessageQuery {
    fn default() -> Self {
        Self {
            before: None,
            after: None,
            limit: 50,
        }
    }
}

/// Optional narrowing of a search. No field can widen the channel scope.
#[derive(Debug, Clone, Default)]
pub struct SearchFilters {
    pub item_type: Option<ItemType>,
    pub sender_id: Option<Snowflake>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
    pub has_attachments: Option<bool>,
    pub is_pinned: Option<bool>,
    pub channel_id: Option<Snowflake>,
}

#[derive(Debug, Clone)]
pub struct SearchQuery {
    /// Channels the requester may read; results never leave this set
    pub channel_ids: Vec<Snowflake>,
    /// Whitespace separated terms, all of which must occur
    pub text: Option<String>,
    pub filters: SearchFilters,
    pub limit: i64,
}

impl SearchQuery {
    /// Lowercased search terms
    pub fn terms(&self) -> Vec<String> {
        self.text
            .as_deref()
            .unwrap_or_default()
            .split_whitespace()
            .map(str::to_lowercase)
            .collect()
    }

    /// Lowercased full phrase, if any
    pub fn phrase(&self) -> Option<String> {
        let terms = self.terms();
        (!terms.is_empty()).then(|| terms.join(" "))
    }
}

#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Includes soft-deleted messages
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Message>>;

    /// Persist a message and its mention rows.
    ///
    /// When the message carries an idempotency key already used by the same
    /// sender in the same channel, nothing is written and the earlier message
    /// is returned.
    async fn insert(&self, message: &Message) -> RepoResult<Message>;

    /// Replace content and mention rows, stamping `edited_at`
    async fn update_content(
        &self,
        id: Snowflake,
        content: &str,
        mentions: &BTreeSet<Snowflake>,
        edited_at: DateTime<Utc>,
    ) -> RepoResult<()>;

    /// Returns false when the message was already deleted
    async fn soft_delete(&self, id: Snowflake) -> RepoResult<bool>;

    async fn set_pinned(&self, id: Snowflake, pinned: bool) -> RepoResult<()>;

    /// Live thread roots with their live reply counts
    async fn list_roots(&self, channel_id: Snowflake, query: MessageQuery)
        -> RepoResult<Vec<RootMessage>>;

    /// Live replies of a root
    async fn find_replies(&self, parent_id: Snowflake) -> RepoResult<Vec<Message>>;

    /// Live pinned messages
    async fn find_pinned(&self, channel_id: Snowflake) -> RepoResult<Vec<Message>>;

    /// Live messages matching the query. Results containing the whole phrase
    /// rank first, newest first within each group.
    async fn search(&self, query: &SearchQuery) -> RepoResult<Vec<Message>>;
}

// ============================================================================
// Reaction Repository
// ============================================================================

#[async_trait]
pub trait ReactionRepository: Send + Sync {
    /// Remove the row if present, insert it otherwise, as one statement.
    /// Returns whether the reaction now exists.
    async fn toggle(&self, reaction: &Reaction) -> RepoResult<bool>;

    async fn find_by_message(&self, message_id: Snowflake) -> RepoResult<Vec<Reaction>>;
}

// ============================================================================
// Poll Repository
// ============================================================================

#[async_trait]
pub trait PollRepository: Send + Sync {
    /// Fails with `PollAlreadyExists` when the message has a poll
    async fn create(&self, poll: &Poll) -> RepoResult<()>;

    /// Options carry vote counts derived from vote rows
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Poll>>;

    async fn find_by_message(&self, message_id: Snowflake) -> RepoResult<Option<Poll>>;

    async fn find_votes(&self, poll_id: Snowflake) -> RepoResult<Vec<PollVote>>;

    /// Atomically replace every vote `user_id` holds on the poll with
    /// `option_ids`. An option that vanished mid-vote is a `Conflict`.
    async fn replace_votes(
        &self,
        poll_id: Snowflake,
        user_id: Snowflake,
        option_ids: &BTreeSet<Snowflake>,
        at: DateTime<Utc>,
    ) -> RepoResult<()>;
}

// ============================================================================
// Read State Repository
// ============================================================================

#[async_trait]
pub trait ReadStateRepository: Send + Sync {
    async fn find_marker(&self, user_id: Snowflake, channel_id: Snowflake)
        -> RepoResult<Option<ReadMarker>>;

    /// Upsert that never moves a marker backwards. Returns the stored marker.
    async fn advance_marker(&self, marker: &ReadMarker) -> RepoResult<ReadMarker>;

    /// Live messages from other users after the marker (all of them without one)
    async fn unread_count(&self, user_id: Snowflake, channel_id: Snowflake) -> RepoResult<i64>;

    /// Mentions of `user_id` in live messages after the marker of their channel,
    /// restricted to `channel_ids`, oldest first
    async fn pending_mentions(
        &self,
        user_id: Snowflake,
        channel_ids: &[Snowflake],
    ) -> RepoResult<Vec<MentionRecord>>;
}

// ============================================================================
// Saved Items / Quick Replies
// ============================================================================

#[async_trait]
pub trait SavedItemRepository: Send + Sync {
    /// Saving the same target twice returns the first bookmark
    async fn save(&self, item: &SavedItem) -> RepoResult<SavedItem>;

    /// Returns false when no such bookmark belongs to the user
    async fn delete(&self, user_id: Snowflake, id: Snowflake) -> RepoResult<bool>;

    /// Newest first
    async fn find_by_user(&self, user_id: Snowflake) -> RepoResult<Vec<SavedItem>>;
}

#[async_trait]
pub trait QuickReplyRepository: Send + Sync {
    async fn create(&self, reply: &QuickReply) -> RepoResult<()>;

    /// Oldest first
    async fn find_by_user(&self, user_id: Snowflake) -> RepoResult<Vec<QuickReply>>;

    /// Returns false when no such reply belongs to the user
    async fn delete(&self, user_id: Snowflake, id: Snowflake) -> RepoResult<bool>;
}

// ============================================================================
// Presence Repository
// ============================================================================

#[async_trait]
pub trait PresenceRepository: Send + Sync {
    async fn set(&self, presence: &PresenceStatus) -> RepoResult<()>;

    async fn get(&self, user_id: Snowflake) -> RepoResult<Option<PresenceStatus>>;

    /// One entry per requested user; unknown users read as offline
    async fn get_many(&self, user_ids: &[Snowflake]) -> RepoResult<Vec<PresenceStatus>>;
}
