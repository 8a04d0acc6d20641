//! Channel entity - a named conversation scope, or a 1:1 direct channel

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::Snowflake;

/// Channel visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ChannelType {
    /// Listed in the directory, anyone may join
    #[default]
    Public,
    /// Members are added by an admin
    Private,
    /// Exactly two members, keyed by their canonical pair
    Direct,
}

impl ChannelType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Private => "private",
            Self::Direct => "direct",
        }
    }
}

impl std::fmt::Display for ChannelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ChannelType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "public" => Ok(Self::Public),
            "private" => Ok(Self::Private),
            "direct" | "dm" => Ok(Self::Direct),
            other => Err(format!("unknown channel type: {other}")),
        }
    }
}

/// Channel entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel {
    pub id: Snowflake,
    pub name: String,
    pub description: Option<String>,
    pub channel_type: ChannelType,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub category_id: Option<Snowflake>,
    pub created_by: Snowflake,
    pub created_at: DateTime<Utc>,
    pub archived_at: Option<DateTime<Utc>>,
}

impl Channel {
    /// Create a public or private channel
    pub fn new(id: Snowflake, name: String, channel_type: ChannelType, created_by: Snowflake) -> Self {
        Self {
            id,
            name,
            description: None,
            channel_type,
            icon: None,
            color: None,
            category_id: None,
            created_by,
            created_at: crate::clock::now(),
            archived_at: None,
        }
    }

    /// Create a direct channel for two users. The name is derived from the ids.
    pub fn new_direct(id: Snowflake, low: Snowflake, high: Snowflake, created_by: Snowflake) -> Self {
        Self::new(id, format!("dm-{low}-{high}"), ChannelType::Direct, created_by)
    }

    #[inline]
    pub fn is_direct(&self) -> bool {
        self.channel_type == ChannelType::Direct
    }

    #[inline]
    pub fn is_public(&self) -> bool {
        self.channel_type == ChannelType::Public
    }

    #[inline]
    pub fn is_archived(&self) -> bool {
        self.archived_at.is_some()
    }

    pub fn archive(&mut self) {
        if self.archived_at.is_none() {
            self.archived_at = Some(crate::clock::now());
        }
    }
}

/// Organizational grouping of channels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: Snowflake,
    pub name: String,
    pub position: i32,
}

/// Role of a user within one channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    Admin,
    #[default]
    Member,
}

impl MemberRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Member => "member",
        }
    }

    pub fn parse(s: &str) -> Self {
        if s.eq_ignore_ascii_case("admin") {
            Self::Admin
        } else {
            Self::Member
        }
    }
}

/// Channel membership row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelMember {
    pub channel_id: Snowflake,
    pub user_id: Snowflake,
    pub role: MemberRole,
    pub display_name: String,
    pub joined_at: DateTime<Utc>,
}

impl ChannelMember {
    pub fn new(channel_id: Snowflake, user_id: Snowflake, role: MemberRole, display_name: String) -> Self {
        Self {
            channel_id,
            user_id,
            role,
            display_name,
            joined_at: crate::clock::now(),
        }
    }

    #[inline]
    pub fn is_admin(&self) -> bool {
        self.role == MemberRole::Admin
    }
}
