//! Permission service
//!
//! Channel access rules shared by every channel-scoped operation:
//!
//! - a non-member of a private or direct channel sees `NotFound`, so the
//!   channel's existence does not leak
//! - a non-member of a public channel may read but not write
//! - an organization admin acts as admin of every public and private
//!   channel; direct channels stay visible to their two participants only

use collab_core::{Channel, ChannelMember, DomainError, Message, Principal, Snowflake};
use tracing::{debug, instrument};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// What the caller may do in one channel
#[derive(Debug, Clone)]
pub struct ChannelAccess {
    pub channel: Channel,
    /// The caller's membership row, if any
    pub member: Option<ChannelMember>,
    org_admin: bool,
}

impl ChannelAccess {
    pub fn is_member(&self) -> bool {
        self.member.is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.org_admin || self.member.as_ref().is_some_and(ChannelMember::is_admin)
    }

    pub fn can_read(&self) -> bool {
        self.is_member() || self.channel.is_public() || self.org_admin
    }

    pub fn can_write(&self) -> bool {
        self.is_member() || self.org_admin
    }
}

/// Permission service for access control
pub struct PermissionService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> PermissionService<'a> {
    /// Create a new PermissionService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Resolve the caller's standing in a channel without enforcing anything
    /// beyond existence
    #[instrument(skip(self, actor), fields(user_id = %actor.user_id))]
    pub async fn access(&self, channel_id: Snowflake, actor: &Principal) -> ServiceResult<ChannelAccess> {
        let channel = self
            .ctx
            .channel_repo()
            .find_by_id(channel_id)
            .await?
            .ok_or(DomainError::ChannelNotFound(channel_id))?;

        let member = self.ctx.member_repo().find(channel_id, actor.user_id).await?;
        let org_admin = actor.is_admin() && !channel.is_direct();

        Ok(ChannelAccess {
            channel,
            member,
            org_admin,
        })
    }

    /// Channel the caller may read
    pub async fn readable(&self, channel_id: Snowflake, actor: &Principal) -> ServiceResult<ChannelAccess> {
        let access = self.access(channel_id, actor).await?;
        if !access.can_read() {
            debug!(channel_id = %channel_id, "Hiding channel from non-member");
            return Err(DomainError::ChannelNotFound(channel_id).into());
        }
        Ok(access)
    }

    /// Channel the caller may write to
    pub async fn writable(&self, channel_id: Snowflake, actor: &Principal) -> ServiceResult<ChannelAccess> {
        let access = self.readable(channel_id, actor).await?;
        if !access.can_write() {
            return Err(ServiceError::permission_denied(
                "only channel members may do this",
            ));
        }
        Ok(access)
    }

    /// Channel the caller administers
    pub async fn administrable(
        &self,
        channel_id: Snowflake,
        actor: &Principal,
    ) -> ServiceResult<ChannelAccess> {
        let access = self.readable(channel_id, actor).await?;
        if !access.is_admin() {
            return Err(DomainError::NotChannelAdmin.into());
        }
        Ok(access)
    }

    /// A message (deleted ones included) in a channel the caller may read.
    /// An unreadable channel reports the message as missing.
    pub async fn readable_message(
        &self,
        message_id: Snowflake,
        actor: &Principal,
    ) -> ServiceResult<(Message, ChannelAccess)> {
        let message = self
            .ctx
            .message_repo()
            .find_by_id(message_id)
            .await?
            .ok_or(DomainError::MessageNotFound(message_id))?;

        match self.readable(message.channel_id, actor).await {
            Ok(access) => Ok((message, access)),
            Err(e) if e.is_not_found() => Err(DomainError::MessageNotFound(message_id).into()),
            Err(e) => Err(e),
        }
    }

    /// Like [`Self::readable_message`], rejecting deleted messages
    pub async fn live_message(
        &self,
        message_id: Snowflake,
        actor: &Principal,
    ) -> ServiceResult<(Message, ChannelAccess)> {
        let (message, access) = self.readable_message(message_id, actor).await?;
        if message.is_deleted {
            return Err(DomainError::MessageNotFound(message_id).into());
        }
        Ok((message, access))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use collab_core::{ChannelType, MemberRole};

    fn access(channel_type: ChannelType, role: Option<MemberRole>, org_admin: bool) -> ChannelAccess {
        let channel = Channel::new(
            Snowflake::new(1),
            "team".to_string(),
            channel_type,
            Snowflake::new(9),
        );
        ChannelAccess {
            member: role.map(|r| ChannelMember::new(channel.id, Snowflake::new(2), r, "Bob".to_string())),
            channel,
            org_admin,
        }
    }

    #[test]
    fn test_public_channel_readable_by_everyone() {
        let a = access(ChannelType::Public, None, false);
        assert!(a.can_read());
        assert!(!a.can_write());
        assert!(!a.is_admin());
    }

    #[test]
    fn test_private_channel_hidden_from_outsiders() {
        let a = access(ChannelType::Private, None, false);
        assert!(!a.can_read());

        let a = access(ChannelType::Private, Some(MemberRole::Member), false);
        assert!(a.can_read() && a.can_write());
        assert!(!a.is_admin());
    }

    #[test]
    fn test_org_admin_is_channel_admin() {
        let a = access(ChannelType::Private, None, true);
        assert!(a.can_read() && a.can_write() && a.is_admin());
    }

    #[test]
    fn test_member_admin_role() {
        let a = access(ChannelType::Public, Some(MemberRole::Admin), false);
        assert!(a.is_admin());
    }
}
