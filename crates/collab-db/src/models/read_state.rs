//! Read marker and mention models

use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct ReadMarkerModel {
    pub user_id: i64,
    pub channel_id: i64,
    pub last_read_at: DateTime<Utc>,
    pub last_read_message_id: Option<i64>,
}

#[derive(Debug, Clone, FromRow)]
pub struct MentionModel {
    pub message_id: i64,
    pub channel_id: i64,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
}
