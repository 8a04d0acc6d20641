//! Presence - a user's single current status

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::Snowflake;

pub const MAX_STATUS_TEXT_LENGTH: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Online,
    Away,
    /// Do not disturb
    Dnd,
    #[default]
    Offline,
}

impl std::fmt::Display for UserStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Online => write!(f, "online"),
            Self::Away => write!(f, "away"),
            Self::Dnd => write!(f, "dnd"),
            Self::Offline => write!(f, "offline"),
        }
    }
}

impl std::str::FromStr for UserStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "online" => Ok(Self::Online),
            "away" | "idle" => Ok(Self::Away),
            "dnd" => Ok(Self::Dnd),
            "offline" => Ok(Self::Offline),
            _ => Err(format!("Invalid status: {s}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceStatus {
    pub user_id: Snowflake,
    pub status: UserStatus,
    pub status_text: Option<String>,
    pub status_emoji: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl PresenceStatus {
    pub fn new(user_id: Snowflake, status: UserStatus) -> Self {
        Self {
            user_id,
            status,
            status_text: None,
            status_emoji: None,
            updated_at: crate::clock::now(),
        }
    }

    /// Presence reported for users who never set one, or whose entry expired
    pub fn offline(user_id: Snowflake) -> Self {
        Self::new(user_id, UserStatus::Offline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip_through_str() {
        for status in [UserStatus::Online, UserStatus::Away, UserStatus::Dnd, UserStatus::Offline] {
            assert_eq!(status.to_string().parse::<UserStatus>().unwrap(), status);
        }
        assert_eq!("IDLE".parse::<UserStatus>().unwrap(), UserStatus::Away);
        assert!("busy".parse::<UserStatus>().is_err());
    }

    #[test]
    fn test_json_shape() {
        let presence = PresenceStatus::new(Snowflake::new(5), UserStatus::Dnd);
        let json = serde_json::to_value(&presence).unwrap();
        assert_eq!(json["status"], "dnd");
        assert_eq!(json["user_id"], "5");
    }
}
