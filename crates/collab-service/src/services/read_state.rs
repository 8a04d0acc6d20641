//! Read-state service
//!
//! Markers only move forward; unread counts and mention badges are derived
//! from them at read time.

use collab_core::{clock, Principal, ReadMarker, Snowflake};
use tracing::{debug, instrument};

use crate::dto::{MarkReadRequest, MentionResponse, ReadMarkerResponse, UnreadCountResponse};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::permission::PermissionService;

/// Read-state service
pub struct ReadStateService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ReadStateService<'a> {
    /// Create a new ReadStateService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Move the caller's marker to `message_id` when given, else to `at`
    /// (default now). Moving backwards keeps the stored marker.
    #[instrument(skip(self, actor, request), fields(user_id = %actor.user_id))]
    pub async fn mark_read(
        &self,
        actor: &Principal,
        channel_id: Snowflake,
        request: MarkReadRequest,
    ) -> ServiceResult<ReadMarkerResponse> {
        if let Some(message_id) = request.message_id {
            let (message, _) = PermissionService::new(self.ctx)
                .readable_message(message_id, actor)
                .await?;
            if message.channel_id != channel_id {
                return Err(ServiceError::validation(format!(
                    "message {message_id} is not in channel {channel_id}"
                )));
            }
            return self.advance(ReadMarker {
                user_id: actor.user_id,
                channel_id,
                last_read_at: message.created_at,
                last_read_message_id: Some(message.id),
            })
            .await;
        }

        PermissionService::new(self.ctx)
            .readable(channel_id, actor)
            .await?;

        let now = clock::now();
        let at = request.at.map_or(now, |at| at.min(now));
        let marker = ReadMarker {
            user_id: actor.user_id,
            channel_id,
            last_read_at: at,
            last_read_message_id: None,
        };
        self.advance(marker).await
    }

    /// Move the caller's marker to a message's position
    #[instrument(skip(self, actor), fields(user_id = %actor.user_id))]
    pub async fn mark_read_up_to(
        &self,
        actor: &Principal,
        message_id: Snowflake,
    ) -> ServiceResult<ReadMarkerResponse> {
        let (message, _) = PermissionService::new(self.ctx)
            .readable_message(message_id, actor)
            .await?;

        let marker = ReadMarker {
            user_id: actor.user_id,
            channel_id: message.channel_id,
            last_read_at: message.created_at,
            last_read_message_id: Some(message.id),
        };
        self.advance(marker).await
    }

    /// Live messages from others after the caller's marker
    #[instrument(skip(self, actor), fields(user_id = %actor.user_id))]
    pub async fn unread_count(
        &self,
        actor: &Principal,
        channel_id: Snowflake,
    ) -> ServiceResult<UnreadCountResponse> {
        PermissionService::new(self.ctx)
            .readable(channel_id, actor)
            .await?;

        let unread_count = self
            .ctx
            .read_state_repo()
            .unread_count(actor.user_id, channel_id)
            .await?;

        Ok(UnreadCountResponse {
            channel_id,
            unread_count,
        })
    }

    /// Unread mentions of the caller across their channels, oldest first
    #[instrument(skip(self, actor), fields(user_id = %actor.user_id))]
    pub async fn pending_mentions(&self, actor: &Principal) -> ServiceResult<Vec<MentionResponse>> {
        let channel_ids = self
            .ctx
            .member_repo()
            .channel_ids_for_user(actor.user_id)
            .await?;

        let records = self
            .ctx
            .read_state_repo()
            .pending_mentions(actor.user_id, &channel_ids)
            .await?;

        Ok(records.iter().map(MentionResponse::from).collect())
    }

    async fn advance(&self, marker: ReadMarker) -> ServiceResult<ReadMarkerResponse> {
        let stored = self.ctx.read_state_repo().advance_marker(&marker).await?;
        if stored != marker {
            debug!(channel_id = %marker.channel_id, "Marker already ahead, kept");
        }

        let unread_count = self
            .ctx
            .read_state_repo()
            .unread_count(stored.user_id, stored.channel_id)
            .await?;

        Ok(ReadMarkerResponse {
            channel_id: stored.channel_id,
            last_read_at: stored.last_read_at,
            last_read_message_id: stored.last_read_message_id,
            unread_count,
        })
    }
}
