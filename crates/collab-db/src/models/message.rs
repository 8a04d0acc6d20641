//! Message database models

use chrono::{DateTime, Utc};
use collab_core::entities::FileRef;
use sqlx::types::Json;
use sqlx::FromRow;

/// Database model for messages table.
///
/// `mentions` is aggregated from `message_mentions` by every query that
/// selects messages.
#[derive(Debug, Clone, FromRow)]
pub struct MessageModel {
    pub id: i64,
    pub channel_id: i64,
    pub sender_id: i64,
    pub content: String,
    pub content_type: String,
    pub created_at: DateTime<Utc>,
    pub edited_at: Option<DateTime<Utc>>,
    pub parent_id: Option<i64>,
    pub attachments: Json<Vec<FileRef>>,
    pub is_pinned: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub idempotency_key: Option<String>,
    pub mentions: Vec<i64>,
}

impl MessageModel {
    /// Check if message is soft deleted
    #[inline]
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// A thread root with its live reply count
#[derive(Debug, Clone, FromRow)]
pub struct RootMessageModel {
    #[sqlx(flatten)]
    pub message: MessageModel,
    pub reply_count: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct ReactionModel {
    pub message_id: i64,
    pub user_id: i64,
    pub emoji: String,
    pub created_at: DateTime<Utc>,
}
