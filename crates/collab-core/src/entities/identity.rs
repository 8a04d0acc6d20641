//! Callers and directory records supplied by external collaborators

use serde::{Deserialize, Serialize};

use crate::value_objects::Snowflake;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Organization admin; acts as admin of every channel
    Admin,
    Regular,
}

/// Authenticated caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: Snowflake,
    pub roles: Vec<Role>,
}

impl Principal {
    pub fn new(user_id: Snowflake) -> Self {
        Self {
            user_id,
            roles: vec![Role::Regular],
        }
    }

    pub fn admin(user_id: Snowflake) -> Self {
        Self {
            user_id,
            roles: vec![Role::Admin],
        }
    }

    #[inline]
    pub fn is_admin(&self) -> bool {
        self.roles.contains(&Role::Admin)
    }
}

/// Directory record used for member names and mention candidates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: Snowflake,
    pub name: String,
}

impl Employee {
    pub fn new(id: Snowflake, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}
