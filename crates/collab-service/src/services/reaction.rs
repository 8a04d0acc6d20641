//! Reaction service
//!
//! A reaction is a `(message, user, emoji)` row. Toggling flips it, so the
//! same request applied twice leaves the message as it was.

use collab_core::{DomainEvent, Principal, Reaction, ReactionSummary, Snowflake};
use tracing::{info, instrument};
use validator::Validate;

use crate::dto::{ReactionResponse, ToggleReactionRequest, ToggleReactionResponse};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::permission::PermissionService;

/// Reaction service
pub struct ReactionService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ReactionService<'a> {
    /// Create a new ReactionService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Add the reaction if absent, remove it otherwise
    #[instrument(skip(self, actor, request), fields(user_id = %actor.user_id))]
    pub async fn toggle_reaction(
        &self,
        actor: &Principal,
        message_id: Snowflake,
        request: ToggleReactionRequest,
    ) -> ServiceResult<ToggleReactionResponse> {
        request.validate()?;
        let emoji = request.emoji.trim();
        if emoji.is_empty() {
            return Err(ServiceError::validation("Emoji cannot be blank"));
        }

        let permissions = PermissionService::new(self.ctx);
        let (message, _) = permissions.live_message(message_id, actor).await?;
        permissions.writable(message.channel_id, actor).await?;

        let reaction = Reaction::new(message_id, actor.user_id, emoji.to_string());
        let added = self.ctx.reaction_repo().toggle(&reaction).await?;

        info!(message_id = %message_id, emoji = %emoji, added, "Reaction toggled");

        self.ctx
            .publish(DomainEvent::ReactionToggled {
                channel_id: message.channel_id,
                message_id,
                user_id: actor.user_id,
                emoji: reaction.emoji,
                added,
            })
            .await;

        Ok(ToggleReactionResponse { added })
    }

    /// Reactions grouped by emoji in first-reaction order
    #[instrument(skip(self, actor), fields(user_id = %actor.user_id))]
    pub async fn list_reactions(
        &self,
        actor: &Principal,
        message_id: Snowflake,
    ) -> ServiceResult<Vec<ReactionResponse>> {
        PermissionService::new(self.ctx)
            .live_message(message_id, actor)
            .await?;

        let reactions = self.ctx.reaction_repo().find_by_message(message_id).await?;
        Ok(ReactionSummary::group(reactions)
            .into_iter()
            .map(|summary| ReactionResponse::from_summary(summary, actor.user_id))
            .collect())
    }
}
