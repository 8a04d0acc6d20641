//! Request DTOs for API endpoints
//!
//! All request DTOs implement `Deserialize` and `Validate` for input
//! validation. Rules that depend on stored state (archived channels, poll
//! options, thread parents) are checked by the services.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use collab_core::{ChannelType, ContentType, FileRef, ItemType, Snowflake, UserStatus};
use serde::Deserialize;
use validator::Validate;

// ============================================================================
// Channel Requests
// ============================================================================

/// Create channel request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateChannelRequest {
    #[validate(length(min = 1, max = 100, message = "Channel name must be 1-100 characters"))]
    pub name: String,

    #[serde(rename = "type", default)]
    pub channel_type: ChannelType,

    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<String>,

    #[validate(length(max = 64))]
    pub icon: Option<String>,

    #[validate(length(max = 32))]
    pub color: Option<String>,

    pub category_id: Option<Snowflake>,
}

/// Update channel request. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateChannelRequest {
    #[validate(length(min = 1, max = 100, message = "Channel name must be 1-100 characters"))]
    pub name: Option<String>,

    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<String>,

    #[validate(length(max = 64))]
    pub icon: Option<String>,

    #[validate(length(max = 32))]
    pub color: Option<String>,

    pub category_id: Option<Snowflake>,
}

/// Create category request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCategoryRequest {
    #[validate(length(min = 1, max = 100, message = "Category name must be 1-100 characters"))]
    pub name: String,

    #[serde(default)]
    pub position: i32,
}

/// Add a user to a channel
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AddMemberRequest {
    pub user_id: Snowflake,
}

/// Open (or reopen) a direct channel
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateDmRequest {
    pub user_id: Snowflake,
}

// ============================================================================
// Message Requests
// ============================================================================

/// Post a message. Mentions are resolved from the content; any mention
/// list sent by the client is ignored.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CreateMessageRequest {
    #[serde(default)]
    pub content: String,

    #[serde(default)]
    pub content_type: ContentType,

    pub parent_id: Option<Snowflake>,

    #[serde(default)]
    #[validate(length(max = 10, message = "At most 10 attachments per message"))]
    pub attachments: Vec<FileRef>,

    #[validate(length(min = 1, max = 128, message = "Idempotency key must be 1-128 characters"))]
    pub idempotency_key: Option<String>,
}

/// Edit message request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateMessageRequest {
    pub content: String,
}

/// Pin or unpin a message
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SetPinnedRequest {
    pub pinned: bool,
}

/// Toggle a reaction
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ToggleReactionRequest {
    #[validate(length(min = 1, max = 64, message = "Emoji must be 1-64 characters"))]
    pub emoji: String,
}

// ============================================================================
// Poll Requests
// ============================================================================

/// Attach a poll to a message
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreatePollRequest {
    #[validate(length(min = 1, max = 300, message = "Question must be 1-300 characters"))]
    pub question: String,

    #[validate(length(min = 2, message = "A poll needs at least 2 options"))]
    pub options: Vec<String>,

    #[serde(default)]
    pub allow_multiple: bool,

    #[serde(default)]
    pub is_anonymous: bool,
}

/// Replace the caller's ballot. An empty set retracts it.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct VoteRequest {
    #[serde(default)]
    pub option_ids: BTreeSet<Snowflake>,
}

// ============================================================================
// Read State Requests
// ============================================================================

/// Advance the caller's read marker for a channel.
///
/// With `message_id` the marker moves to that message; otherwise to `at`
/// (default: now).
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct MarkReadRequest {
    pub at: Option<DateTime<Utc>>,
    pub message_id: Option<Snowflake>,
}

// ============================================================================
// Search Requests
// ============================================================================

/// Search query string parameters
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct SearchRequest {
    #[validate(length(max = 200, message = "Query must be at most 200 characters"))]
    pub q: Option<String>,

    #[serde(rename = "type")]
    pub item_type: Option<ItemType>,

    pub sender_id: Option<Snowflake>,

    pub date_from: Option<DateTime<Utc>>,

    pub date_to: Option<DateTime<Utc>>,

    pub has_attachments: Option<bool>,

    pub is_pinned: Option<bool>,

    pub channel_id: Option<Snowflake>,

    #[validate(range(min = 1, max = 100, message = "Limit must be 1-100"))]
    pub limit: Option<i64>,
}

// ============================================================================
// Saved Items / Quick Replies
// ============================================================================

/// Bookmark a message, file or poll
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SaveItemRequest {
    pub item_type: ItemType,
    pub item_id: Snowflake,
}

/// Create a canned reply
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateQuickReplyRequest {
    #[validate(length(min = 1, max = 100, message = "Title must be 1-100 characters"))]
    pub title: String,

    #[validate(length(min = 1, max = 4000, message = "Content must be 1-4000 characters"))]
    pub content: String,
}

// ============================================================================
// Presence Requests
// ============================================================================

/// Update the caller's presence
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdatePresenceRequest {
    pub status: UserStatus,

    #[validate(length(max = 128, message = "Status text must be at most 128 characters"))]
    pub status_text: Option<String>,

    #[validate(length(max = 32))]
    pub status_emoji: Option<String>,
}

/// Look up several users' presence
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PresenceQueryRequest {
    #[validate(length(min = 1, max = 100, message = "Ask for 1-100 users at a time"))]
    pub user_ids: Vec<Snowflake>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_channel_defaults_to_public() {
        let req: CreateChannelRequest =
            serde_json::from_str(r#"{"name": "general"}"#).unwrap();
        assert_eq!(req.channel_type, ChannelType::Public);
        assert!(req.validate().is_ok());

        let req: CreateChannelRequest =
            serde_json::from_str(r#"{"name": "", "type": "private"}"#).unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_message_request_ignores_client_mentions() {
        let req: CreateMessageRequest = serde_json::from_str(
            r#"{"content": "hi @bob", "mentions": ["1", "2"], "parent_id": "42"}"#,
        )
        .unwrap();
        assert_eq!(req.parent_id, Some(Snowflake::new(42)));
        assert_eq!(req.content_type, ContentType::Text);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_blank_idempotency_key_rejected() {
        let req = CreateMessageRequest {
            content: "hi".to_string(),
            idempotency_key: Some(String::new()),
            ..Default::default()
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_vote_request_dedupes() {
        let req: VoteRequest = serde_json::from_str(r#"{"option_ids": ["5", 5, "6"]}"#).unwrap();
        assert_eq!(req.option_ids.len(), 2);

        let req: VoteRequest = serde_json::from_str("{}").unwrap();
        assert!(req.option_ids.is_empty());
    }

    #[test]
    fn test_search_limit_bounds() {
        let req = SearchRequest {
            limit: Some(500),
            ..Default::default()
        };
        assert!(req.validate().is_err());
    }
}
