//! Channel database models

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for channels table
#[derive(Debug, Clone, FromRow)]
pub struct ChannelModel {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    /// 'public', 'private' or 'direct'
    #[sqlx(rename = "type")]
    pub channel_type: String,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub category_id: Option<i64>,
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
    pub archived_at: Option<DateTime<Utc>>,
}

impl ChannelModel {
    #[inline]
    pub fn is_archived(&self) -> bool {
        self.archived_at.is_some()
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct CategoryModel {
    pub id: i64,
    pub name: String,
    pub position: i32,
}

#[derive(Debug, Clone, FromRow)]
pub struct ChannelMemberModel {
    pub channel_id: i64,
    pub user_id: i64,
    pub role: String,
    pub display_name: String,
    pub joined_at: DateTime<Utc>,
}
