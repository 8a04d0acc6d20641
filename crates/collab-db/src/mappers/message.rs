//! Message entity <-> model mapper

use collab_core::entities::{ContentType, FileRef, Message, Reaction, RootMessage};
use collab_core::value_objects::Snowflake;
use sqlx::types::Json;

use crate::models::{MessageModel, ReactionModel, RootMessageModel};

impl From<MessageModel> for Message {
    fn from(model: MessageModel) -> Self {
        let is_deleted = model.is_deleted();
        Message {
            id: Snowflake::new(model.id),
            channel_id: Snowflake::new(model.channel_id),
            sender_id: Snowflake::new(model.sender_id),
            content: model.content,
            content_type: ContentType::parse(&model.content_type),
            created_at: model.created_at,
            edited_at: model.edited_at,
            parent_id: model.parent_id.map(Snowflake::new),
            mentions: model.mentions.into_iter().map(Snowflake::new).collect(),
            attachments: model.attachments.0,
            is_pinned: model.is_pinned,
            is_deleted,
            idempotency_key: model.idempotency_key,
        }
    }
}

impl From<RootMessageModel> for RootMessage {
    fn from(model: RootMessageModel) -> Self {
        RootMessage {
            message: Message::from(model.message),
            reply_count: model.reply_count,
        }
    }
}

impl From<ReactionModel> for Reaction {
    fn from(model: ReactionModel) -> Self {
        Reaction {
            message_id: Snowflake::new(model.message_id),
            user_id: Snowflake::new(model.user_id),
            emoji: model.emoji,
            created_at: model.created_at,
        }
    }
}

/// Message column values for insertion
pub struct MessageInsert<'a> {
    pub id: i64,
    pub channel_id: i64,
    pub sender_id: i64,
    pub content: &'a str,
    pub content_type: &'static str,
    pub parent_id: Option<i64>,
    pub attachments: Json<&'a [FileRef]>,
    pub idempotency_key: Option<&'a str>,
    pub mentions: Vec<i64>,
}

impl<'a> MessageInsert<'a> {
    pub fn new(message: &'a Message) -> Self {
        Self {
            id: message.id.into_inner(),
            channel_id: message.channel_id.into_inner(),
            sender_id: message.sender_id.into_inner(),
            content: &message.content,
            content_type: message.content_type.as_str(),
            parent_id: message.parent_id.map(Snowflake::into_inner),
            attachments: Json(&message.attachments),
            idempotency_key: message.idempotency_key.as_deref(),
            mentions: ids(&message.mentions),
        }
    }
}

/// Raw ids for `BIGINT[]` binds
pub fn ids<'a>(set: impl IntoIterator<Item = &'a Snowflake>) -> Vec<i64> {
    set.into_iter().map(|id| id.into_inner()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::collections::BTreeSet;

    fn model() -> MessageModel {
        MessageModel {
            id: 10,
            channel_id: 1,
            sender_id: 2,
            content: "hello @bob".to_string(),
            content_type: "file".to_string(),
            created_at: Utc::now(),
            edited_at: None,
            parent_id: None,
            attachments: Json(vec![FileRef {
                url: "/files/a.png".to_string(),
                name: "a.png".to_string(),
                mime: "image/png".to_string(),
                size: 3,
            }]),
            is_pinned: true,
            deleted_at: None,
            idempotency_key: None,
            mentions: vec![5, 3],
        }
    }

    #[test]
    fn test_message_from_model() {
        let message = Message::from(model());
        assert_eq!(message.content_type, ContentType::File);
        assert!(message.has_attachments());
        assert!(message.is_pinned);
        assert!(!message.is_deleted);
        let expected: BTreeSet<_> = [Snowflake::new(3), Snowflake::new(5)].into();
        assert_eq!(message.mentions, expected);
    }

    #[test]
    fn test_deleted_at_marks_deleted() {
        let mut m = model();
        m.deleted_at = Some(Utc::now());
        assert!(Message::from(m).is_deleted);
    }

    #[test]
    fn test_insert_collects_mentions() {
        let mut message = Message::new(
            Snowflake::new(1),
            Snowflake::new(2),
            Snowflake::new(3),
            "hi".to_string(),
        );
        message.mentions.insert(Snowflake::new(9));
        let insert = MessageInsert::new(&message);
        assert_eq!(insert.mentions, vec![9]);
        assert_eq!(insert.content_type, "text");
    }
}
