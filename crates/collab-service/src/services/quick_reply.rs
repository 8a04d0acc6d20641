//! Quick reply service

use collab_core::{clock, DomainError, Principal, QuickReply, Snowflake};
use tracing::{info, instrument};
use validator::Validate;

use crate::dto::{CreateQuickReplyRequest, QuickReplyResponse};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Canned replies owned by one user
pub struct QuickReplyService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> QuickReplyService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    #[instrument(skip(self, actor, request), fields(user_id = %actor.user_id))]
    pub async fn create_quick_reply(
        &self,
        actor: &Principal,
        request: CreateQuickReplyRequest,
    ) -> ServiceResult<QuickReplyResponse> {
        request.validate()?;
        let title = request.title.trim();
        if title.is_empty() || request.content.trim().is_empty() {
            return Err(ServiceError::validation("Title and content cannot be blank"));
        }

        let reply = QuickReply {
            id: self.ctx.generate_id(),
            user_id: actor.user_id,
            title: title.to_string(),
            content: request.content,
            created_at: clock::now(),
        };
        self.ctx.quick_reply_repo().create(&reply).await?;

        info!(quick_reply_id = %reply.id, "Quick reply created");

        Ok(QuickReplyResponse::from(&reply))
    }

    #[instrument(skip(self, actor), fields(user_id = %actor.user_id))]
    pub async fn list_quick_replies(&self, actor: &Principal) -> ServiceResult<Vec<QuickReplyResponse>> {
        let replies = self.ctx.quick_reply_repo().find_by_user(actor.user_id).await?;
        Ok(replies.iter().map(QuickReplyResponse::from).collect())
    }

    /// Another user's reply reads as missing
    #[instrument(skip(self, actor), fields(user_id = %actor.user_id))]
    pub async fn delete_quick_reply(&self, actor: &Principal, id: Snowflake) -> ServiceResult<()> {
        if !self.ctx.quick_reply_repo().delete(actor.user_id, id).await? {
            return Err(DomainError::QuickReplyNotFound(id).into());
        }
        info!(quick_reply_id = %id, "Quick reply deleted");
        Ok(())
    }
}
