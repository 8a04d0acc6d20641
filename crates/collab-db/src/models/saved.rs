//! Saved item and quick reply models

use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct SavedItemModel {
    pub id: i64,
    pub user_id: i64,
    pub item_type: String,
    pub item_id: i64,
    pub channel_id: i64,
    pub saved_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct QuickReplyModel {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}
