//! Poll entity <-> model mapper

use collab_core::entities::{Poll, PollOption, PollVote};
use collab_core::value_objects::Snowflake;

use crate::models::{PollModel, PollOptionModel, PollVoteModel};

impl From<PollOptionModel> for PollOption {
    fn from(model: PollOptionModel) -> Self {
        PollOption {
            id: Snowflake::new(model.id),
            text: model.text,
            position: model.position,
            vote_count: model.vote_count,
        }
    }
}

impl From<PollVoteModel> for PollVote {
    fn from(model: PollVoteModel) -> Self {
        PollVote {
            poll_id: Snowflake::new(model.poll_id),
            option_id: Snowflake::new(model.option_id),
            user_id: Snowflake::new(model.user_id),
            voted_at: model.voted_at,
        }
    }
}

/// Join a poll row with its option rows
pub fn assemble_poll(model: PollModel, options: Vec<PollOptionModel>) -> Poll {
    let mut options: Vec<PollOption> = options.into_iter().map(PollOption::from).collect();
    options.sort_by_key(|o| o.position);

    Poll {
        id: Snowflake::new(model.id),
        message_id: Snowflake::new(model.message_id),
        question: model.question,
        options,
        allow_multiple: model.allow_multiple,
        is_anonymous: model.is_anonymous,
        created_by: Snowflake::new(model.created_by),
        created_at: model.created_at,
    }
}
