//! Read markers and the mention records they are compared against

use chrono::{DateTime, Utc};

use crate::value_objects::Snowflake;

/// Per-user, per-channel read cursor. Only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadMarker {
    pub user_id: Snowflake,
    pub channel_id: Snowflake,
    pub last_read_at: DateTime<Utc>,
    pub last_read_message_id: Option<Snowflake>,
}

impl ReadMarker {
    /// Position of the marker in `(created_at, id)` message order. A marker
    /// set by time alone sorts after every message with that timestamp.
    pub fn position(&self) -> (DateTime<Utc>, Snowflake) {
        (
            self.last_read_at,
            self.last_read_message_id
                .unwrap_or(Snowflake::new(i64::MAX)),
        )
    }

    /// Whether a message at `(created_at, id)` is after this marker
    pub fn is_before(&self, created_at: DateTime<Utc>, id: Snowflake) -> bool {
        (created_at, id) > self.position()
    }
}

/// A user mentioned by a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MentionRecord {
    pub message_id: Snowflake,
    pub channel_id: Snowflake,
    pub user_id: Snowflake,
    pub created_at: DateTime<Utc>,
}

/// Per-channel badge numbers for one user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UnreadState {
    pub unread_count: i64,
    pub mention_count: i64,
}
