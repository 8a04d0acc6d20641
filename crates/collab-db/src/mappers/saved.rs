//! Saved item, quick reply, read state and directory mappers

use collab_core::entities::{
    Employee, ItemType, MentionRecord, QuickReply, ReadMarker, SavedItem,
};
use collab_core::value_objects::Snowflake;

use crate::models::{EmployeeModel, MentionModel, QuickReplyModel, ReadMarkerModel, SavedItemModel};

impl From<SavedItemModel> for SavedItem {
    fn from(model: SavedItemModel) -> Self {
        SavedItem {
            id: Snowflake::new(model.id),
            user_id: Snowflake::new(model.user_id),
            // guarded by a CHECK constraint
            item_type: ItemType::parse(&model.item_type).unwrap_or(ItemType::Message),
            item_id: Snowflake::new(model.item_id),
            channel_id: Snowflake::new(model.channel_id),
            saved_at: model.saved_at,
        }
    }
}

impl From<QuickReplyModel> for QuickReply {
    fn from(model: QuickReplyModel) -> Self {
        QuickReply {
            id: Snowflake::new(model.id),
            user_id: Snowflake::new(model.user_id),
            title: model.title,
            content: model.content,
            created_at: model.created_at,
        }
    }
}

impl From<ReadMarkerModel> for ReadMarker {
    fn from(model: ReadMarkerModel) -> Self {
        ReadMarker {
            user_id: Snowflake::new(model.user_id),
            channel_id: Snowflake::new(model.channel_id),
            last_read_at: model.last_read_at,
            last_read_message_id: model.last_read_message_id.map(Snowflake::new),
        }
    }
}

impl From<MentionModel> for MentionRecord {
    fn from(model: MentionModel) -> Self {
        MentionRecord {
            message_id: Snowflake::new(model.message_id),
            channel_id: Snowflake::new(model.channel_id),
            user_id: Snowflake::new(model.user_id),
            created_at: model.created_at,
        }
    }
}

impl From<EmployeeModel> for Employee {
    fn from(model: EmployeeModel) -> Self {
        Employee::new(Snowflake::new(model.id), model.name)
    }
}
