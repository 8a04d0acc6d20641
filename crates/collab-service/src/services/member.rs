//! Member service
//!
//! Channel membership: listing with presence, joining, adding, leaving.

use std::collections::HashMap;

use collab_core::{
    ChannelMember, DomainError, DomainEvent, MemberRole, PresenceStatus, Principal, Snowflake,
};
use tracing::{info, instrument, warn};

use crate::dto::{MemberResponse, MemberWithPresence};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::permission::PermissionService;

/// Member service
pub struct MemberService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> MemberService<'a> {
    /// Create a new MemberService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Members of a channel, each with their current presence
    #[instrument(skip(self, actor), fields(user_id = %actor.user_id))]
    pub async fn list_members(
        &self,
        actor: &Principal,
        channel_id: Snowflake,
    ) -> ServiceResult<Vec<MemberResponse>> {
        PermissionService::new(self.ctx)
            .readable(channel_id, actor)
            .await?;

        let members = self.ctx.member_repo().find_by_channel(channel_id).await?;
        let user_ids: Vec<Snowflake> = members.iter().map(|m| m.user_id).collect();
        let mut presences: HashMap<Snowflake, PresenceStatus> = self
            .ctx
            .presence_repo()
            .get_many(&user_ids)
            .await?
            .into_iter()
            .map(|p| (p.user_id, p))
            .collect();

        Ok(members
            .into_iter()
            .map(|member| {
                let presence = presences
                    .remove(&member.user_id)
                    .unwrap_or_else(|| PresenceStatus::offline(member.user_id));
                MemberResponse::from(MemberWithPresence { member, presence })
            })
            .collect())
    }

    /// Join a public channel
    #[instrument(skip(self, actor), fields(user_id = %actor.user_id))]
    pub async fn join_channel(
        &self,
        actor: &Principal,
        channel_id: Snowflake,
    ) -> ServiceResult<MemberResponse> {
        let access = PermissionService::new(self.ctx)
            .access(channel_id, actor)
            .await?;
        let channel = access.channel;

        if channel.is_direct() {
            return Err(DomainError::ChannelNotFound(channel_id).into());
        }
        if !channel.is_public() {
            return Err(ServiceError::permission_denied(
                "private channels are joined by invitation",
            ));
        }
        if channel.is_archived() {
            return Err(DomainError::ChannelArchived(channel_id).into());
        }

        let display_name = self.own_display_name(actor.user_id).await?;
        let member = ChannelMember::new(channel_id, actor.user_id, MemberRole::Member, display_name);
        self.ctx.member_repo().add(&member).await?;

        info!(channel_id = %channel_id, "Joined channel");

        self.ctx
            .publish(DomainEvent::MemberJoined {
                channel_id,
                user_id: actor.user_id,
            })
            .await;

        self.with_presence(member).await
    }

    /// Add another user to a channel (admin)
    #[instrument(skip(self, actor), fields(user_id = %actor.user_id))]
    pub async fn add_member(
        &self,
        actor: &Principal,
        channel_id: Snowflake,
        user_id: Snowflake,
    ) -> ServiceResult<MemberResponse> {
        let channel = PermissionService::new(self.ctx)
            .administrable(channel_id, actor)
            .await?
            .channel;

        if channel.is_direct() {
            return Err(ServiceError::validation(
                "Direct channels have exactly two members",
            ));
        }
        if channel.is_archived() {
            return Err(DomainError::ChannelArchived(channel_id).into());
        }

        let display_name = self.employee_name(user_id).await?;
        let member = ChannelMember::new(channel_id, user_id, MemberRole::Member, display_name);
        self.ctx.member_repo().add(&member).await?;

        info!(channel_id = %channel_id, added = %user_id, "Member added");

        self.ctx
            .publish(DomainEvent::MemberJoined { channel_id, user_id })
            .await;

        self.with_presence(member).await
    }

    /// Leave a channel. Direct channels cannot be left.
    #[instrument(skip(self, actor), fields(user_id = %actor.user_id))]
    pub async fn leave_channel(&self, actor: &Principal, channel_id: Snowflake) -> ServiceResult<()> {
        let channel = PermissionService::new(self.ctx)
            .readable(channel_id, actor)
            .await?
            .channel;

        if channel.is_direct() {
            return Err(ServiceError::validation("Direct channels cannot be left"));
        }

        self.ctx
            .member_repo()
            .remove(channel_id, actor.user_id)
            .await?;

        info!(channel_id = %channel_id, "Left channel");

        self.ctx
            .publish(DomainEvent::MemberLeft {
                channel_id,
                user_id: actor.user_id,
            })
            .await;

        Ok(())
    }

    /// Directory name of another user; unknown users are `NotFound`
    pub(crate) async fn employee_name(&self, user_id: Snowflake) -> ServiceResult<String> {
        self.ctx
            .directory()
            .find_employee(user_id)
            .await?
            .map(|e| e.name)
            .ok_or_else(|| ServiceError::not_found("Employee", user_id.to_string()))
    }

    /// Directory name of the caller. An authenticated user the directory
    /// does not know yet is named by their id.
    pub(crate) async fn own_display_name(&self, user_id: Snowflake) -> ServiceResult<String> {
        match self.ctx.directory().find_employee(user_id).await {
            Ok(Some(employee)) => Ok(employee.name),
            Ok(None) => Ok(user_id.to_string()),
            Err(e) => {
                warn!(error = %e, user_id = %user_id, "Directory lookup failed");
                Ok(user_id.to_string())
            }
        }
    }

    async fn with_presence(&self, member: ChannelMember) -> ServiceResult<MemberResponse> {
        let presence = self
            .ctx
            .presence_repo()
            .get(member.user_id)
            .await?
            .unwrap_or_else(|| PresenceStatus::offline(member.user_id));
        Ok(MemberResponse::from(MemberWithPresence { member, presence }))
    }
}
