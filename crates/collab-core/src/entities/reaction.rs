//! Reaction entity - an emoji placed on a message by one user

use chrono::{DateTime, Utc};

use crate::value_objects::Snowflake;

/// Reaction row, unique per `(message_id, emoji, user_id)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reaction {
    pub message_id: Snowflake,
    pub user_id: Snowflake,
    pub emoji: String,
    pub created_at: DateTime<Utc>,
}

impl Reaction {
    pub fn new(message_id: Snowflake, user_id: Snowflake, emoji: String) -> Self {
        Self {
            message_id,
            user_id,
            emoji,
            created_at: crate::clock::now(),
        }
    }
}

/// Reactions on a message grouped by emoji
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionSummary {
    pub emoji: String,
    pub count: i64,
    pub user_ids: Vec<Snowflake>,
}

impl ReactionSummary {
    /// Groups reactions by emoji, keeping the order in which each emoji first appeared.
    pub fn group(mut reactions: Vec<Reaction>) -> Vec<Self> {
        reactions.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        let mut out: Vec<Self> = Vec::new();
        for reaction in reactions {
            match out.iter_mut().find(|s| s.emoji == reaction.emoji) {
                Some(summary) => {
                    summary.count += 1;
                    summary.user_ids.push(reaction.user_id);
                }
                None => out.push(Self {
                    emoji: reaction.emoji,
                    count: 1,
                    user_ids: vec![reaction.user_id],
                }),
            }
        }
        out
    }

    pub fn includes(&self, user_id: Snowflake) -> bool {
        self.user_ids.contains(&user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_group_keeps_first_seen_order() {
        let now = Utc::now();
        let mut a = Reaction::new(Snowflake::new(1), Snowflake::new(10), "👍".to_string());
        a.created_at = now;
        let mut b = Reaction::new(Snowflake::new(1), Snowflake::new(11), "🎉".to_string());
        b.created_at = now + Duration::seconds(1);
        let mut c = Reaction::new(Snowflake::new(1), Snowflake::new(12), "👍".to_string());
        c.created_at = now + Duration::seconds(2);

        let summary = ReactionSummary::group(vec![c, b, a]);
        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].emoji, "👍");
        assert_eq!(summary[0].count, 2);
        assert_eq!(summary[0].user_ids, vec![Snowflake::new(10), Snowflake::new(12)]);
        assert!(summary[1].includes(Snowflake::new(11)));
    }
}
