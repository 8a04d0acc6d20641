//! Poll entity - a question attached to exactly one message

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};

use crate::error::DomainError;
use crate::value_objects::Snowflake;

pub const MIN_POLL_OPTIONS: usize = 2;
pub const MAX_POLL_OPTIONS: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollOption {
    pub id: Snowflake,
    pub text: String,
    pub position: i32,
    /// Derived from vote rows when the poll is loaded
    pub vote_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Poll {
    pub id: Snowflake,
    pub message_id: Snowflake,
    pub question: String,
    pub options: Vec<PollOption>,
    pub allow_multiple: bool,
    pub is_anonymous: bool,
    pub created_by: Snowflake,
    pub created_at: DateTime<Utc>,
}

impl Poll {
    pub fn has_option(&self, option_id: Snowflake) -> bool {
        self.options.iter().any(|o| o.id == option_id)
    }

    pub fn total_votes(&self) -> i64 {
        self.options.iter().map(|o| o.vote_count).sum()
    }

    /// Checks a ballot against the poll's choice mode and option set.
    /// An empty ballot is valid and retracts the voter's selection.
    pub fn check_ballot(&self, option_ids: &BTreeSet<Snowflake>) -> Result<(), DomainError> {
        if !self.allow_multiple && option_ids.len() > 1 {
            return Err(DomainError::ValidationError(
                "this poll accepts a single choice".to_string(),
            ));
        }
        if let Some(unknown) = option_ids.iter().find(|id| !self.has_option(**id)) {
            return Err(DomainError::ValidationError(format!(
                "option {unknown} does not belong to poll {}",
                self.id
            )));
        }
        Ok(())
    }
}

/// Trims option texts, drops blanks, and enforces the option count bounds.
pub fn normalize_options(options: &[String]) -> Result<Vec<String>, DomainError> {
    let cleaned: Vec<String> = options
        .iter()
        .map(|o| o.trim())
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect();

    if cleaned.len() < MIN_POLL_OPTIONS {
        return Err(DomainError::TooFewPollOptions {
            min: MIN_POLL_OPTIONS,
        });
    }
    if cleaned.len() > MAX_POLL_OPTIONS {
        return Err(DomainError::ValidationError(format!(
            "a poll takes at most {MAX_POLL_OPTIONS} options"
        )));
    }
    Ok(cleaned)
}

/// A single vote row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollVote {
    pub poll_id: Snowflake,
    pub option_id: Snowflake,
    pub user_id: Snowflake,
    pub voted_at: DateTime<Utc>,
}

/// What a viewer is allowed to see of a poll
#[derive(Debug, Clone)]
pub struct PollResults {
    pub poll: Poll,
    /// Voters per option; `None` for anonymous polls
    pub voters: Option<BTreeMap<Snowflake, Vec<Snowflake>>>,
    pub my_votes: BTreeSet<Snowflake>,
}

impl PollResults {
    pub fn build(poll: Poll, votes: &[PollVote], viewer: Snowflake) -> Self {
        let my_votes = votes
            .iter()
            .filter(|v| v.user_id == viewer)
            .map(|v| v.option_id)
            .collect();

        let voters = if poll.is_anonymous {
            None
        } else {
            let mut by_option: BTreeMap<Snowflake, Vec<Snowflake>> =
                poll.options.iter().map(|o| (o.id, Vec::new())).collect();
            for vote in votes {
                if let Some(users) = by_option.get_mut(&vote.option_id) {
                    users.push(vote.user_id);
                }
            }
            Some(by_option)
        };

        Self {
            poll,
            voters,
            my_votes,
        }
    }
}
