use dashmap::DashMap;
use parking_lot::Mutex;

use collab_core::entities::{
    Category, Channel, ChannelMember, Message, Poll, PollVote, PresenceStatus, QuickReply,
    Reaction, ReadMarker, SavedItem,
};
use collab_core::value_objects::{CanonicalPair, Snowflake};

/// Key of a reaction row: message, emoji, user
pub(super) type ReactionKey = (Snowflake, String, Snowflake);

/// Key of an idempotent send: channel, sender, client key
pub(super) type IdempotencyKey = (Snowflake, Snowflake, String);

/// Every table of the collaboration core, held in process memory
#[derive(Default)]
pub struct InMemoryStore {
    pub(super) channels: DashMap<Snowflake, Channel>,
    pub(super) categories: DashMap<Snowflake, Category>,
    pub(super) direct_pairs: DashMap<CanonicalPair, Snowflake>,
    /// Keyed by (channel, user)
    pub(super) members: DashMap<(Snowflake, Snowflake), ChannelMember>,
    pub(super) messages: DashMap<Snowflake, Message>,
    pub(super) idempotency: DashMap<IdempotencyKey, Snowflake>,
    pub(super) reactions: DashMap<ReactionKey, Reaction>,
    pub(super) polls: DashMap<Snowflake, Poll>,
    pub(super) poll_by_message: DashMap<Snowflake, Snowflake>,
    pub(super) votes: Mutex<Vec<PollVote>>,
    /// Keyed by (user, channel)
    pub(super) markers: DashMap<(Snowflake, Snowflake), ReadMarker>,
    pub(super) saved: Mutex<Vec<SavedItem>>,
    pub(super) quick_replies: DashMap<Snowflake, QuickReply>,
    pub(super) presence: DashMap<Snowflake, PresenceStatus>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the messages matching `keep`. Collecting first keeps map
    /// guards from being held across further lookups.
    pub(super) fn messages_where<F>(&self, keep: F) -> Vec<Message>
    where
        F: Fn(&Message) -> bool,
    {
        let mut found: Vec<Message> = self
            .messages
            .iter()
            .filter(|entry| keep(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        found.sort_by_key(Message::order_key);
        found
    }
}

impl std::fmt::Debug for InMemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryStore")
            .field("channels", &self.channels.len())
            .field("messages", &self.messages.len())
            .finish()
    }
}
