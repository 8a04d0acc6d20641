//! DM (Direct Message) service
//!
//! Direct channels are created lazily and keyed by the unordered pair of
//! participants; the repository's uniqueness on that pair makes concurrent
//! requests from both sides converge on one channel.

use collab_core::{
    CanonicalPair, Channel, ChannelMember, DomainEvent, MemberRole, Principal, Snowflake,
};
use tracing::{debug, info, instrument};

use crate::dto::ChannelResponse;

use super::context::ServiceContext;
use super::error::ServiceResult;
use super::member::MemberService;

/// DM service
pub struct DmService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> DmService<'a> {
    /// Create a new DmService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Return the direct channel between the caller and `user_id`, creating it
    /// on first use
    #[instrument(skip(self, actor), fields(user_id = %actor.user_id))]
    pub async fn get_or_create_dm(
        &self,
        actor: &Principal,
        recipient_id: Snowflake,
    ) -> ServiceResult<ChannelResponse> {
        let pair = CanonicalPair::new(actor.user_id, recipient_id)?;

        if let Some(existing) = self.ctx.channel_repo().find_direct(pair).await? {
            debug!(channel_id = %existing.id, "Direct channel exists");
            return Ok(ChannelResponse::from(existing));
        }

        let members_service = MemberService::new(self.ctx);
        let recipient_name = members_service.employee_name(recipient_id).await?;
        let own_name = members_service.own_display_name(actor.user_id).await?;

        let channel = Channel::new_direct(self.ctx.generate_id(), pair.low(), pair.high(), actor.user_id);
        let member = |user_id: Snowflake| {
            let name = if user_id == actor.user_id {
                own_name.clone()
            } else {
                recipient_name.clone()
            };
            ChannelMember::new(channel.id, user_id, MemberRole::Member, name)
        };
        let members = [member(pair.low()), member(pair.high())];

        let stored = self
            .ctx
            .channel_repo()
            .create_direct(&channel, pair, members)
            .await?;

        if stored.id == channel.id {
            info!(channel_id = %stored.id, recipient_id = %recipient_id, "Direct channel created");
            self.ctx
                .publish(DomainEvent::ChannelCreated {
                    channel_id: stored.id,
                    created_by: actor.user_id,
                })
                .await;
        } else {
            debug!(channel_id = %stored.id, "Lost direct channel race, using existing");
        }

        Ok(ChannelResponse::from(stored))
    }
}
