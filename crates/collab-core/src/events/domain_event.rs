//! Domain events - channel-scoped notifications of state changes
//!
//! Every event belongs to exactly one channel, except presence updates which
//! fan out to every channel the user is in. Consumers relay them over the
//! event stream; clients refetch the entity when they need its full state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::UserStatus;
use crate::value_objects::Snowflake;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomainEvent {
    // =========================================================================
    // Channel Events
    // =========================================================================
    ChannelCreated {
        channel_id: Snowflake,
        created_by: Snowflake,
    },
    ChannelUpdated {
        channel_id: Snowflake,
    },
    ChannelArchived {
        channel_id: Snowflake,
    },
    MemberJoined {
        channel_id: Snowflake,
        user_id: Snowflake,
    },
    MemberLeft {
        channel_id: Snowflake,
        user_id: Snowflake,
    },

    // =========================================================================
    // Message Events
    // =========================================================================
    MessageCreated {
        channel_id: Snowflake,
        message_id: Snowflake,
        sender_id: Snowflake,
        parent_id: Option<Snowflake>,
    },
    MessageUpdated {
        channel_id: Snowflake,
        message_id: Snowflake,
    },
    MessageDeleted {
        channel_id: Snowflake,
        message_id: Snowflake,
    },
    MessagePinned {
        channel_id: Snowflake,
        message_id: Snowflake,
        pinned: bool,
    },
    ReactionToggled {
        channel_id: Snowflake,
        message_id: Snowflake,
        user_id: Snowflake,
        emoji: String,
        added: bool,
    },

    // =========================================================================
    // Poll Events
    // =========================================================================
    PollCreated {
        channel_id: Snowflake,
        message_id: Snowflake,
        poll_id: Snowflake,
    },
    PollVoted {
        channel_id: Snowflake,
        poll_id: Snowflake,
    },

    // =========================================================================
    // Presence Events
    // =========================================================================
    PresenceUpdated {
        channel_id: Snowflake,
        user_id: Snowflake,
        status: UserStatus,
    },
}

impl DomainEvent {
    /// Dotted event name used on the wire
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::ChannelCreated { .. } => "channel.created",
            Self::ChannelUpdated { .. } => "channel.updated",
            Self::ChannelArchived { .. } => "channel.archived",
            Self::MemberJoined { .. } => "member.joined",
            Self::MemberLeft { .. } => "member.left",
            Self::MessageCreated { .. } => "message.created",
            Self::MessageUpdated { .. } => "message.updated",
            Self::MessageDeleted { .. } => "message.deleted",
            Self::MessagePinned { .. } => "message.pinned",
            Self::ReactionToggled { .. } => "reaction.toggled",
            Self::PollCreated { .. } => "poll.created",
            Self::PollVoted { .. } => "poll.voted",
            Self::PresenceUpdated { .. } => "presence.updated",
        }
    }

    /// Channel whose stream carries the event
    pub fn channel_id(&self) -> Snowflake {
        match self {
            Self::ChannelCreated { channel_id, .. }
            | Self::ChannelUpdated { channel_id }
            | Self::ChannelArchived { channel_id }
            | Self::MemberJoined { channel_id, .. }
            | Self::MemberLeft { channel_id, .. }
            | Self::MessageCreated { channel_id, .. }
            | Self::MessageUpdated { channel_id, .. }
            | Self::MessageDeleted { channel_id, .. }
            | Self::MessagePinned { channel_id, .. }
            | Self::ReactionToggled { channel_id, .. }
            | Self::PollCreated { channel_id, .. }
            | Self::PollVoted { channel_id, .. }
            | Self::PresenceUpdated { channel_id, .. } => *channel_id,
        }
    }
}

/// Event plus the moment it was emitted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    #[serde(flatten)]
    pub event: DomainEvent,
    pub timestamp: DateTime<Utc>,
}

impl EventEnvelope {
    pub fn now(event: DomainEvent) -> Self {
        Self {
            event,
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_json_shape() {
        let envelope = EventEnvelope::now(DomainEvent::ReactionToggled {
            channel_id: Snowflake::new(1),
            message_id: Snowflake::new(2),
            user_id: Snowflake::new(3),
            emoji: "👍".to_string(),
            added: true,
        });
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["type"], "reaction_toggled");
        assert_eq!(json["channel_id"], "1");
        assert_eq!(json["added"], true);
        assert!(json["timestamp"].is_string());
    }

    #[test]
    fn test_channel_id_and_type() {
        let event = DomainEvent::PollVoted {
            channel_id: Snowflake::new(8),
            poll_id: Snowflake::new(9),
        };
        assert_eq!(event.channel_id(), Snowflake::new(8));
        assert_eq!(event.event_type(), "poll.voted");
    }
}
