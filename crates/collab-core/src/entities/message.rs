//! Message entity - one entry of a channel's append-only log

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// Upper bound on message content, in characters
pub const MAX_CONTENT_LENGTH: usize = 4000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    #[default]
    Text,
    Image,
    File,
}

impl ContentType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
            Self::File => "file",
        }
    }

    /// Unknown values fall back to text
    pub fn parse(s: &str) -> Self {
        match s {
            "image" => Self::Image,
            "file" => Self::File,
            _ => Self::Text,
        }
    }
}

/// Reference to a stored file, as handed out by the file store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRef {
    pub url: String,
    pub name: String,
    pub mime: String,
    pub size: u64,
}

/// Message entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: Snowflake,
    pub channel_id: Snowflake,
    pub sender_id: Snowflake,
    pub content: String,
    pub content_type: ContentType,
    pub created_at: DateTime<Utc>,
    pub edited_at: Option<DateTime<Utc>>,
    pub parent_id: Option<Snowflake>,
    pub mentions: BTreeSet<Snowflake>,
    pub attachments: Vec<FileRef>,
    pub is_pinned: bool,
    pub is_deleted: bool,
    pub idempotency_key: Option<String>,
}

impl Message {
    pub fn new(id: Snowflake, channel_id: Snowflake, sender_id: Snowflake, content: String) -> Self {
        Self {
            id,
            channel_id,
            sender_id,
            content,
            content_type: ContentType::Text,
            created_at: crate::clock::now(),
            edited_at: None,
            parent_id: None,
            mentions: BTreeSet::new(),
            attachments: Vec::new(),
            is_pinned: false,
            is_deleted: false,
            idempotency_key: None,
        }
    }

    #[inline]
    pub fn is_reply(&self) -> bool {
        self.parent_id.is_some()
    }

    #[inline]
    pub fn is_edited(&self) -> bool {
        self.edited_at.is_some()
    }

    #[inline]
    pub fn has_attachments(&self) -> bool {
        !self.attachments.is_empty()
    }

    /// Copy of a deleted message with its payload stripped
    pub fn redacted(&self) -> Self {
        Self {
            content: String::new(),
            attachments: Vec::new(),
            mentions: BTreeSet::new(),
            is_deleted: true,
            ..self.clone()
        }
    }

    /// Sort key shared by every listing
    #[inline]
    pub fn order_key(&self) -> (DateTime<Utc>, Snowflake) {
        (self.created_at, self.id)
    }
}

/// Content must be non-blank unless files are attached, and at most
/// [`MAX_CONTENT_LENGTH`] characters.
pub fn validate_content(content: &str, has_attachments: bool) -> Result<(), DomainError> {
    if content.trim().is_empty() && !has_attachments {
        return Err(DomainError::EmptyMessage);
    }
    if content.chars().count() > MAX_CONTENT_LENGTH {
        return Err(DomainError::ContentTooLong {
            max: MAX_CONTENT_LENGTH,
        });
    }
    Ok(())
}

/// A thread root together with its replies in `(created_at, id)` order
#[derive(Debug, Clone)]
pub struct Thread {
    pub parent: Message,
    pub replies: Vec<Message>,
}

/// Root message as shown in a channel timeline
#[derive(Debug, Clone)]
pub struct RootMessage {
    pub message: Message,
    pub reply_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message() -> Message {
        Message::new(
            Snowflake::new(1),
            Snowflake::new(10),
            Snowflake::new(100),
            "hello @bob".to_string(),
        )
    }

    #[test]
    fn test_redacted_strips_payload() {
        let mut msg = message();
        msg.mentions.insert(Snowflake::new(2));
        msg.attachments.push(FileRef {
            url: "/files/a.png".to_string(),
            name: "a.png".to_string(),
            mime: "image/png".to_string(),
            size: 12,
        });
        let redacted = msg.redacted();
        assert!(redacted.is_deleted);
        assert!(redacted.content.is_empty());
        assert!(redacted.attachments.is_empty());
        assert!(redacted.mentions.is_empty());
        assert_eq!(redacted.id, msg.id);
    }

    #[test]
    fn test_validate_content() {
        assert!(validate_content("hi", false).is_ok());
        assert!(matches!(
            validate_content("   ", false),
            Err(DomainError::EmptyMessage)
        ));
        assert!(validate_content("", true).is_ok());
        let long = "x".repeat(MAX_CONTENT_LENGTH + 1);
        assert!(matches!(
            validate_content(&long, false),
            Err(DomainError::ContentTooLong { .. })
        ));
        // multi-byte characters count once
        let emoji = "🎉".repeat(MAX_CONTENT_LENGTH);
        assert!(validate_content(&emoji, false).is_ok());
    }

    #[test]
    fn test_content_type_parse() {
        assert_eq!(ContentType::parse("image"), ContentType::Image);
        assert_eq!(ContentType::parse("unknown"), ContentType::Text);
    }
}
