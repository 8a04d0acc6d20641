//! Presence service
//!
//! One current status per user. Stored entries expire, so a client that
//! stops refreshing decays to offline.

use collab_core::{DomainEvent, PresenceStatus, Principal, Snowflake};
use tracing::{info, instrument};
use validator::Validate;

use crate::dto::{PresenceQueryRequest, PresenceResponse, UpdatePresenceRequest};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Presence service
pub struct PresenceService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> PresenceService<'a> {
    /// Create a new PresenceService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Replace the caller's presence and tell every channel they are in
    #[instrument(skip(self, actor, request), fields(user_id = %actor.user_id))]
    pub async fn set_presence(
        &self,
        actor: &Principal,
        request: UpdatePresenceRequest,
    ) -> ServiceResult<PresenceResponse> {
        request.validate()?;

        let mut presence = PresenceStatus::new(actor.user_id, request.status);
        presence.status_text = non_blank(request.status_text);
        presence.status_emoji = non_blank(request.status_emoji);

        self.ctx.presence_repo().set(&presence).await?;

        info!(status = %presence.status, "Presence updated");

        let channel_ids = self
            .ctx
            .member_repo()
            .channel_ids_for_user(actor.user_id)
            .await?;
        for channel_id in channel_ids {
            self.ctx
                .publish(DomainEvent::PresenceUpdated {
                    channel_id,
                    user_id: actor.user_id,
                    status: presence.status,
                })
                .await;
        }

        Ok(PresenceResponse::from(&presence))
    }

    /// A user's presence; unknown users read as offline
    #[instrument(skip(self))]
    pub async fn get_presence(&self, user_id: Snowflake) -> ServiceResult<PresenceResponse> {
        let presence = self
            .ctx
            .presence_repo()
            .get(user_id)
            .await?
            .unwrap_or_else(|| PresenceStatus::offline(user_id));
        Ok(PresenceResponse::from(&presence))
    }

    /// Presence for several users, in request order
    #[instrument(skip(self, request), fields(count = request.user_ids.len()))]
    pub async fn get_presences(
        &self,
        request: PresenceQueryRequest,
    ) -> ServiceResult<Vec<PresenceResponse>> {
        request.validate()?;
        let presences = self.ctx.presence_repo().get_many(&request.user_ids).await?;
        Ok(presences.iter().map(PresenceResponse::from).collect())
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some("  in a meeting ".into())), Some("in a meeting".into()));
        assert_eq!(non_blank(Some("   ".into())), None);
        assert_eq!(non_blank(None), None);
    }
}
