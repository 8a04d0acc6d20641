//! Poll database models

use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct PollModel {
    pub id: i64,
    pub message_id: i64,
    pub question: String,
    pub allow_multiple: bool,
    pub is_anonymous: bool,
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
}

/// Option row joined with its vote count
#[derive(Debug, Clone, FromRow)]
pub struct PollOptionModel {
    pub id: i64,
    pub poll_id: i64,
    pub text: String,
    pub position: i32,
    pub vote_count: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct PollVoteModel {
    pub poll_id: i64,
    pub option_id: i64,
    pub user_id: i64,
    pub voted_at: DateTime<Utc>,
}
