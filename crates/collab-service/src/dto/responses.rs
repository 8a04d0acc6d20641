//! Response DTOs for API endpoints
//!
//! All response DTOs implement `Serialize` for JSON output.
//! Snowflake IDs are serialized as strings for JavaScript compatibility.

use chrono::{DateTime, Utc};
use collab_core::{
    ChannelType, ContentType, FileRef, ItemType, MemberRole, Snowflake, UserStatus,
};
use serde::Serialize;

// ============================================================================
// Common Response Types
// ============================================================================

/// Generic API response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

// ============================================================================
// Channel Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ChannelResponse {
    pub id: Snowflake,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub channel_type: ChannelType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub category_id: Option<Snowflake>,
    pub created_by: Snowflake,
    pub created_at: DateTime<Utc>,
    pub archived_at: Option<DateTime<Utc>>,
}

/// A channel in the caller's sidebar, with its badges
#[derive(Debug, Clone, Serialize)]
pub struct ChannelSummaryResponse {
    #[serde(flatten)]
    pub channel: ChannelResponse,
    pub unread_count: i64,
    pub mention_count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryResponse {
    pub id: Snowflake,
    pub name: String,
    pub position: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct MemberResponse {
    pub user_id: Snowflake,
    pub display_name: String,
    pub role: MemberRole,
    pub joined_at: DateTime<Utc>,
    pub presence: PresenceResponse,
}

// ============================================================================
// Message Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub id: Snowflake,
    pub channel_id: Snowflake,
    pub sender_id: Snowflake,
    pub content: String,
    pub content_type: ContentType,
    pub created_at: DateTime<Utc>,
    pub edited_at: Option<DateTime<Utc>>,
    pub parent_id: Option<Snowflake>,
    pub mentions: Vec<Snowflake>,
    pub attachments: Vec<FileRef>,
    pub is_pinned: bool,
    pub is_deleted: bool,
    /// Present on channel timelines only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_count: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ThreadResponse {
    pub parent: MessageResponse,
    pub replies: Vec<MessageResponse>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ToggleReactionResponse {
    pub added: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReactionResponse {
    pub emoji: String,
    pub count: i64,
    pub users: Vec<Snowflake>,
    /// Whether the caller is among `users`
    pub me: bool,
}

// ============================================================================
// Poll Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct PollOptionResponse {
    pub id: Snowflake,
    pub text: String,
    pub vote_count: i64,
    /// Omitted for anonymous polls
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voters: Option<Vec<Snowflake>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PollResponse {
    pub id: Snowflake,
    pub message_id: Snowflake,
    pub question: String,
    pub options: Vec<PollOptionResponse>,
    pub allow_multiple: bool,
    pub is_anonymous: bool,
    pub created_by: Snowflake,
    pub created_at: DateTime<Utc>,
    pub total_votes: i64,
    pub my_votes: Vec<Snowflake>,
}

// ============================================================================
// Read State Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ReadMarkerResponse {
    pub channel_id: Snowflake,
    pub last_read_at: DateTime<Utc>,
    pub last_read_message_id: Option<Snowflake>,
    pub unread_count: i64,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct UnreadCountResponse {
    pub channel_id: Snowflake,
    pub unread_count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MentionResponse {
    pub message_id: Snowflake,
    pub channel_id: Snowflake,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Saved Items / Quick Replies
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct SavedItemResponse {
    pub id: Snowflake,
    pub item_type: ItemType,
    pub item_id: Snowflake,
    pub channel_id: Snowflake,
    pub saved_at: DateTime<Utc>,
    /// Current state of the bookmarked message
    pub message: MessageResponse,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuickReplyResponse {
    pub id: Snowflake,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Presence / Directory
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct PresenceResponse {
    pub user_id: Snowflake,
    pub status: UserStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_emoji: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmployeeResponse {
    pub id: Snowflake,
    pub name: String,
}

// ============================================================================
// Health Responses
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub checks: HealthChecks,
}

/// `None` means the dependency is not configured on this backend
#[derive(Debug, Serialize)]
pub struct HealthChecks {
    pub database: Option<bool>,
    pub redis: Option<bool>,
}

impl ReadinessResponse {
    pub fn new(database: Option<bool>, redis: Option<bool>) -> Self {
        let ready = database.unwrap_or(true) && redis.unwrap_or(true);
        Self {
            status: if ready { "ready" } else { "not_ready" }.to_string(),
            checks: HealthChecks { database, redis },
        }
    }

    pub fn is_ready(&self) -> bool {
        self.status == "ready"
    }
}
