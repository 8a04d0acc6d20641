//! Channel entity <-> model mapper

use collab_core::entities::{Category, Channel, ChannelMember, ChannelType, MemberRole};
use collab_core::value_objects::Snowflake;

use crate::models::{CategoryModel, ChannelMemberModel, ChannelModel};

/// The column is guarded by a CHECK constraint
fn parse_channel_type(type_str: &str) -> ChannelType {
    type_str.parse().unwrap_or_default()
}

impl From<ChannelModel> for Channel {
    fn from(model: ChannelModel) -> Self {
        Channel {
            id: Snowflake::new(model.id),
            name: model.name,
            description: model.description,
            channel_type: parse_channel_type(&model.channel_type),
            icon: model.icon,
            color: model.color,
            category_id: model.category_id.map(Snowflake::new),
            created_by: Snowflake::new(model.created_by),
            created_at: model.created_at,
            archived_at: model.archived_at,
        }
    }
}

impl From<CategoryModel> for Category {
    fn from(model: CategoryModel) -> Self {
        Category {
            id: Snowflake::new(model.id),
            name: model.name,
            position: model.position,
        }
    }
}

impl From<ChannelMemberModel> for ChannelMember {
    fn from(model: ChannelMemberModel) -> Self {
        ChannelMember {
            channel_id: Snowflake::new(model.channel_id),
            user_id: Snowflake::new(model.user_id),
            role: MemberRole::parse(&model.role),
            display_name: model.display_name,
            joined_at: model.joined_at,
        }
    }
}

/// Channel column values for insert and update
pub struct ChannelInsert<'a> {
    pub id: i64,
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub channel_type: &'static str,
    pub icon: Option<&'a str>,
    pub color: Option<&'a str>,
    pub category_id: Option<i64>,
    pub created_by: i64,
}

impl<'a> ChannelInsert<'a> {
    pub fn new(channel: &'a Channel) -> Self {
        Self {
            id: channel.id.into_inner(),
            name: &channel.name,
            description: channel.description.as_deref(),
            channel_type: channel.channel_type.as_str(),
            icon: channel.icon.as_deref(),
            color: channel.color.as_deref(),
            category_id: channel.category_id.map(Snowflake::into_inner),
            created_by: channel.created_by.into_inner(),
        }
    }
}

pub struct MemberInsert<'a> {
    pub channel_id: i64,
    pub user_id: i64,
    pub role: &'static str,
    pub display_name: &'a str,
}

impl<'a> MemberInsert<'a> {
    pub fn new(member: &'a ChannelMember) -> Self {
        Self {
            channel_id: member.channel_id.into_inner(),
            user_id: member.user_id.into_inner(),
            role: member.role.as_str(),
            display_name: &member.display_name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_channel_from_model() {
        let model = ChannelModel {
            id: 7,
            name: "general".to_string(),
            description: None,
            channel_type: "private".to_string(),
            icon: None,
            color: Some("#336699".to_string()),
            category_id: Some(3),
            created_by: 1,
            created_at: Utc::now(),
            archived_at: None,
        };
        let channel = Channel::from(model);
        assert_eq!(channel.channel_type, ChannelType::Private);
        assert_eq!(channel.category_id, Some(Snowflake::new(3)));
        assert!(!channel.is_archived());
    }

    #[test]
    fn test_member_role_roundtrip() {
        let member = ChannelMember::new(
            Snowflake::new(1),
            Snowflake::new(2),
            MemberRole::Admin,
            "Alice".to_string(),
        );
        let insert = MemberInsert::new(&member);
        assert_eq!(insert.role, "admin");
        assert_eq!(MemberRole::parse(insert.role), MemberRole::Admin);
    }
}
