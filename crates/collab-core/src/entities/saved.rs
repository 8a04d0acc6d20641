//! User-owned bookmarks and canned replies

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::Snowflake;

/// Kind of content a bookmark or a search result points at. A file is a
/// message with attachments; a poll is the message carrying it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Message,
    File,
    Poll,
}

impl ItemType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Message => "message",
            Self::File => "file",
            Self::Poll => "poll",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "message" => Some(Self::Message),
            "file" => Some(Self::File),
            "poll" => Some(Self::Poll),
            _ => None,
        }
    }
}

/// Bookmark. The target may vanish later; readers filter such entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedItem {
    pub id: Snowflake,
    pub user_id: Snowflake,
    pub item_type: ItemType,
    pub item_id: Snowflake,
    pub channel_id: Snowflake,
    pub saved_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuickReply {
    pub id: Snowflake,
    pub user_id: Snowflake,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}
