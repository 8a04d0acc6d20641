//! Poll service
//!
//! A poll hangs off one message. Voting replaces the caller's whole ballot
//! in a single repository call, so switching a single-choice vote never
//! leaves two rows behind.

use collab_core::entities::normalize_options;
use collab_core::{
    clock, DomainError, DomainEvent, Message, Poll, PollOption, PollResults, Principal, Snowflake,
};
use tracing::{info, instrument};
use validator::Validate;

use crate::dto::{CreatePollRequest, PollResponse, VoteRequest};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::permission::{ChannelAccess, PermissionService};

/// Poll service
pub struct PollService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> PollService<'a> {
    /// Create a new PollService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Attach a poll to a message the caller sent
    #[instrument(skip(self, actor, request), fields(user_id = %actor.user_id))]
    pub async fn create_poll(
        &self,
        actor: &Principal,
        message_id: Snowflake,
        request: CreatePollRequest,
    ) -> ServiceResult<PollResponse> {
        let question = request.question.trim();
        if question.is_empty() {
            return Err(ServiceError::validation("Question cannot be blank"));
        }
        let options = normalize_options(&request.options)?;
        request.validate()?;

        let (message, _) = PermissionService::new(self.ctx)
            .live_message(message_id, actor)
            .await?;
        if message.sender_id != actor.user_id {
            return Err(ServiceError::permission_denied(
                "only the sender may attach a poll to this message",
            ));
        }

        let poll = Poll {
            id: self.ctx.generate_id(),
            message_id,
            question: question.to_string(),
            options: options
                .into_iter()
                .enumerate()
                .map(|(position, text)| PollOption {
                    id: self.ctx.generate_id(),
                    text,
                    position: position as i32,
                    vote_count: 0,
                })
                .collect(),
            allow_multiple: request.allow_multiple,
            is_anonymous: request.is_anonymous,
            created_by: actor.user_id,
            created_at: clock::now(),
        };

        self.ctx.poll_repo().create(&poll).await?;

        info!(poll_id = %poll.id, message_id = %message_id, "Poll created");

        self.ctx
            .publish(DomainEvent::PollCreated {
                channel_id: message.channel_id,
                message_id,
                poll_id: poll.id,
            })
            .await;

        Ok(PollResponse::from(PollResults::build(poll, &[], actor.user_id)))
    }

    /// Replace the caller's ballot. An empty set retracts it.
    #[instrument(skip(self, actor, request), fields(user_id = %actor.user_id))]
    pub async fn vote(
        &self,
        actor: &Principal,
        poll_id: Snowflake,
        request: VoteRequest,
    ) -> ServiceResult<PollResponse> {
        let poll = self.find_poll(poll_id).await?;

        let (message, _) = self.poll_message(&poll, actor).await?;
        PermissionService::new(self.ctx)
            .writable(message.channel_id, actor)
            .await?;

        poll.check_ballot(&request.option_ids)?;

        self.ctx
            .poll_repo()
            .replace_votes(poll_id, actor.user_id, &request.option_ids, clock::now())
            .await?;

        info!(poll_id = %poll_id, choices = request.option_ids.len(), "Ballot replaced");

        self.ctx
            .publish(DomainEvent::PollVoted {
                channel_id: message.channel_id,
                poll_id,
            })
            .await;

        self.results(poll_id, actor).await
    }

    /// Poll with counts, voters unless anonymous, and the caller's own votes
    #[instrument(skip(self, actor), fields(user_id = %actor.user_id))]
    pub async fn get_poll(&self, actor: &Principal, poll_id: Snowflake) -> ServiceResult<PollResponse> {
        let poll = self.find_poll(poll_id).await?;
        self.poll_message(&poll, actor).await?;
        self.results(poll_id, actor).await
    }

    /// The poll carried by a message
    #[instrument(skip(self, actor), fields(user_id = %actor.user_id))]
    pub async fn get_poll_by_message(
        &self,
        actor: &Principal,
        message_id: Snowflake,
    ) -> ServiceResult<PollResponse> {
        PermissionService::new(self.ctx)
            .live_message(message_id, actor)
            .await?;

        let poll = self
            .ctx
            .poll_repo()
            .find_by_message(message_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Poll", format!("message {message_id}")))?;

        self.results(poll.id, actor).await
    }

    async fn find_poll(&self, poll_id: Snowflake) -> ServiceResult<Poll> {
        Ok(self
            .ctx
            .poll_repo()
            .find_by_id(poll_id)
            .await?
            .ok_or(DomainError::PollNotFound(poll_id))?)
    }

    /// The carrying message must be live and readable; otherwise the poll
    /// is reported missing
    async fn poll_message(
        &self,
        poll: &Poll,
        actor: &Principal,
    ) -> ServiceResult<(Message, ChannelAccess)> {
        match PermissionService::new(self.ctx)
            .live_message(poll.message_id, actor)
            .await
        {
            Ok(found) => Ok(found),
            Err(e) if e.is_not_found() => Err(DomainError::PollNotFound(poll.id).into()),
            Err(e) => Err(e),
        }
    }

    async fn results(&self, poll_id: Snowflake, actor: &Principal) -> ServiceResult<PollResponse> {
        let poll = self.find_poll(poll_id).await?;
        let votes = self.ctx.poll_repo().find_votes(poll_id).await?;
        Ok(PollResponse::from(PollResults::build(poll, &votes, actor.user_id)))
    }
}
