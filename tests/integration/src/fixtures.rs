//! Test fixtures for integration tests
//!
//! The seeded roster plus client-side views of the API responses. Only the
//! fields the tests look at are declared.

use collab_core::{Employee, Snowflake};
use serde::Deserialize;
use serde_json::{json, Value};

pub const ALICE: Snowflake = Snowflake::new(1);
pub const BOB: Snowflake = Snowflake::new(2);
pub const CAROL: Snowflake = Snowflake::new(3);

/// Directory the test server is seeded with
pub fn roster() -> Vec<Employee> {
    vec![
        Employee::new(ALICE, "Alice Kim"),
        Employee::new(BOB, "Bob Lee"),
        Employee::new(CAROL, "Carol Park"),
    ]
}

// ============================================================================
// Request bodies
// ============================================================================

pub fn channel_body(name: &str, channel_type: &str) -> Value {
    json!({ "name": name, "type": channel_type })
}

pub fn message_body(content: &str) -> Value {
    json!({ "content": content })
}

pub fn reply_body(content: &str, parent_id: Snowflake) -> Value {
    json!({ "content": content, "parent_id": parent_id })
}

// ============================================================================
// Response views
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ChannelView {
    pub id: Snowflake,
    pub name: String,
    #[serde(rename = "type")]
    pub channel_type: String,
}

#[derive(Debug, Deserialize)]
pub struct ChannelSummaryView {
    pub id: Snowflake,
    pub unread_count: i64,
    pub mention_count: i64,
}

#[derive(Debug, Deserialize)]
pub struct MessageView {
    pub id: Snowflake,
    pub channel_id: Snowflake,
    pub sender_id: Snowflake,
    pub content: String,
    pub parent_id: Option<Snowflake>,
    #[serde(default)]
    pub mentions: Vec<Snowflake>,
    pub is_pinned: bool,
    pub is_deleted: bool,
    pub reply_count: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct ThreadView {
    pub parent: MessageView,
    pub replies: Vec<MessageView>,
}

#[derive(Debug, Deserialize)]
pub struct ToggleView {
    pub added: bool,
}

#[derive(Debug, Deserialize)]
pub struct ReactionView {
    pub emoji: String,
    pub count: i64,
    pub users: Vec<Snowflake>,
    pub me: bool,
}

#[derive(Debug, Deserialize)]
pub struct PollOptionView {
    pub id: Snowflake,
    pub text: String,
    pub vote_count: i64,
}

#[derive(Debug, Deserialize)]
pub struct PollView {
    pub id: Snowflake,
    pub message_id: Snowflake,
    pub options: Vec<PollOptionView>,
    pub total_votes: i64,
    pub my_votes: Vec<Snowflake>,
}

#[derive(Debug, Deserialize)]
pub struct UnreadView {
    pub unread_count: i64,
}

#[derive(Debug, Deserialize)]
pub struct MentionView {
    pub message_id: Snowflake,
    pub channel_id: Snowflake,
}

#[derive(Debug, Deserialize)]
pub struct SavedItemView {
    pub id: Snowflake,
    pub item_id: Snowflake,
    pub message: MessageView,
}

#[derive(Debug, Deserialize)]
pub struct QuickReplyView {
    pub id: Snowflake,
    pub title: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct PresenceView {
    pub user_id: Snowflake,
    pub status: String,
    pub status_text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FileView {
    pub url: String,
    pub name: String,
    pub mime: String,
    pub size: u64,
}

#[derive(Debug, Deserialize)]
pub struct EmployeeView {
    pub id: Snowflake,
    pub name: String,
}
