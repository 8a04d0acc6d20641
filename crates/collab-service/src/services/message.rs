//! Message service
//!
//! Posting, editing, deleting and reading messages, threads and pins.
//! Mentions are resolved here, once, when content is persisted.

use std::collections::BTreeSet;

use collab_core::entities::validate_content;
use collab_core::{
    clock, extract_mentions, Channel, DomainError, DomainEvent, MentionCandidate, Message,
    MessageQuery, Notification, NotificationKind, Principal, Snowflake, Thread,
};
use serde_json::json;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

use crate::directory::name_index;
use crate::dto::{CreateMessageRequest, MessageResponse, ThreadResponse, UpdateMessageRequest};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::permission::PermissionService;

/// Largest page a timeline request may ask for
pub const MAX_PAGE_SIZE: i64 = 100;

/// Message service
pub struct MessageService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> MessageService<'a> {
    /// Create a new MessageService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Post a message or thread reply.
    ///
    /// A retry carrying an idempotency key the sender already used in this
    /// channel returns the original message and repeats no side effects.
    #[instrument(skip(self, actor, request), fields(user_id = %actor.user_id))]
    pub async fn post_message(
        &self,
        actor: &Principal,
        channel_id: Snowflake,
        request: CreateMessageRequest,
    ) -> ServiceResult<MessageResponse> {
        request.validate()?;

        let channel = PermissionService::new(self.ctx)
            .writable(channel_id, actor)
            .await?
            .channel;
        if channel.is_archived() {
            return Err(DomainError::ChannelArchived(channel_id).into());
        }

        validate_content(&request.content, !request.attachments.is_empty())?;

        if let Some(parent_id) = request.parent_id {
            self.check_parent(channel_id, parent_id).await?;
        }

        let mentions = self
            .resolve_mentions(channel_id, &request.content)
            .await?;

        let mut message = Message::new(self.ctx.generate_id(), channel_id, actor.user_id, request.content);
        message.content_type = request.content_type;
        message.parent_id = request.parent_id;
        message.attachments = request.attachments;
        message.mentions = mentions;
        message.idempotency_key = request
            .idempotency_key
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());

        let stored = self.ctx.message_repo().insert(&message).await?;
        if stored.id != message.id {
            debug!(message_id = %stored.id, "Idempotent retry, returning original message");
            return Ok(MessageResponse::from(stored));
        }

        info!(message_id = %stored.id, channel_id = %channel_id, "Message posted");

        self.ctx
            .publish(DomainEvent::MessageCreated {
                channel_id,
                message_id: stored.id,
                sender_id: stored.sender_id,
                parent_id: stored.parent_id,
            })
            .await;
        self.notify_mentions(&stored, &stored.mentions).await;
        if channel.is_direct() {
            self.notify_direct_recipient(&channel, &stored).await;
        }

        Ok(MessageResponse::from(stored))
    }

    /// Edit a message (sender only). Only newly added mentions are notified.
    #[instrument(skip(self, actor, request), fields(user_id = %actor.user_id))]
    pub async fn edit_message(
        &self,
        actor: &Principal,
        message_id: Snowflake,
        request: UpdateMessageRequest,
    ) -> ServiceResult<MessageResponse> {
        request.validate()?;

        let (mut message, _) = PermissionService::new(self.ctx)
            .live_message(message_id, actor)
            .await?;
        if message.sender_id != actor.user_id {
            return Err(DomainError::NotMessageSender.into());
        }

        validate_content(&request.content, message.has_attachments())?;

        let mentions = self
            .resolve_mentions(message.channel_id, &request.content)
            .await?;
        let added: BTreeSet<Snowflake> = mentions.difference(&message.mentions).copied().collect();
        let edited_at = clock::now();

        self.ctx
            .message_repo()
            .update_content(message_id, &request.content, &mentions, edited_at)
            .await?;

        message.content = request.content;
        message.mentions = mentions;
        message.edited_at = Some(edited_at);

        info!(message_id = %message_id, new_mentions = added.len(), "Message edited");

        self.ctx
            .publish(DomainEvent::MessageUpdated {
                channel_id: message.channel_id,
                message_id,
            })
            .await;
        self.notify_mentions(&message, &added).await;

        Ok(MessageResponse::from(message))
    }

    /// Soft-delete a message (sender or channel admin). Deleting twice is a no-op.
    #[instrument(skip(self, actor), fields(user_id = %actor.user_id))]
    pub async fn delete_message(&self, actor: &Principal, message_id: Snowflake) -> ServiceResult<()> {
        let (message, access) = PermissionService::new(self.ctx)
            .readable_message(message_id, actor)
            .await?;

        if message.sender_id != actor.user_id && !access.is_admin() {
            return Err(ServiceError::permission_denied(
                "only the sender or a channel admin may delete this message",
            ));
        }

        if !self.ctx.message_repo().soft_delete(message_id).await? {
            debug!(message_id = %message_id, "Message already deleted");
            return Ok(());
        }

        info!(message_id = %message_id, "Message deleted");

        self.ctx
            .publish(DomainEvent::MessageDeleted {
                channel_id: message.channel_id,
                message_id,
            })
            .await;

        Ok(())
    }

    /// Get a live message
    #[instrument(skip(self, actor), fields(user_id = %actor.user_id))]
    pub async fn get_message(
        &self,
        actor: &Principal,
        message_id: Snowflake,
    ) -> ServiceResult<MessageResponse> {
        let (message, _) = PermissionService::new(self.ctx)
            .live_message(message_id, actor)
            .await?;
        Ok(MessageResponse::from(message))
    }

    /// Thread roots of a channel with their reply counts, oldest first
    #[instrument(skip(self, actor), fields(user_id = %actor.user_id))]
    pub async fn list_messages(
        &self,
        actor: &Principal,
        channel_id: Snowflake,
        query: MessageQuery,
    ) -> ServiceResult<Vec<MessageResponse>> {
        PermissionService::new(self.ctx)
            .readable(channel_id, actor)
            .await?;

        let query = MessageQuery {
            limit: query.limit.clamp(1, MAX_PAGE_SIZE),
            ..query
        };
        let roots = self.ctx.message_repo().list_roots(channel_id, query).await?;
        Ok(roots.into_iter().map(MessageResponse::from).collect())
    }

    /// A root with its live replies. A deleted root comes back redacted.
    #[instrument(skip(self, actor), fields(user_id = %actor.user_id))]
    pub async fn fetch_thread(
        &self,
        actor: &Principal,
        parent_id: Snowflake,
    ) -> ServiceResult<ThreadResponse> {
        let (parent, _) = PermissionService::new(self.ctx)
            .readable_message(parent_id, actor)
            .await?;
        if parent.is_reply() {
            return Err(DomainError::InvalidThread(format!(
                "message {parent_id} is a reply, not a thread root"
            ))
            .into());
        }

        let replies = self.ctx.message_repo().find_replies(parent_id).await?;
        let parent = if parent.is_deleted {
            parent.redacted()
        } else {
            parent
        };

        Ok(ThreadResponse::from(Thread { parent, replies }))
    }

    /// Pinned live messages of a channel
    #[instrument(skip(self, actor), fields(user_id = %actor.user_id))]
    pub async fn list_pinned(
        &self,
        actor: &Principal,
        channel_id: Snowflake,
    ) -> ServiceResult<Vec<MessageResponse>> {
        PermissionService::new(self.ctx)
            .readable(channel_id, actor)
            .await?;
        let pinned = self.ctx.message_repo().find_pinned(channel_id).await?;
        Ok(pinned.into_iter().map(MessageResponse::from).collect())
    }

    /// Pin or unpin (sender or channel admin). Idempotent.
    #[instrument(skip(self, actor), fields(user_id = %actor.user_id))]
    pub async fn set_pinned(
        &self,
        actor: &Principal,
        message_id: Snowflake,
        pinned: bool,
    ) -> ServiceResult<MessageResponse> {
        let (mut message, access) = PermissionService::new(self.ctx)
            .live_message(message_id, actor)
            .await?;

        if message.sender_id != actor.user_id && !access.is_admin() {
            return Err(ServiceError::permission_denied(
                "only the sender or a channel admin may pin this message",
            ));
        }

        if message.is_pinned == pinned {
            return Ok(MessageResponse::from(message));
        }

        self.ctx.message_repo().set_pinned(message_id, pinned).await?;
        message.is_pinned = pinned;

        info!(message_id = %message_id, pinned, "Pin state changed");

        self.ctx
            .publish(DomainEvent::MessagePinned {
                channel_id: message.channel_id,
                message_id,
                pinned,
            })
            .await;

        Ok(MessageResponse::from(message))
    }

    /// Parent must be a live root of the same channel
    async fn check_parent(&self, channel_id: Snowflake, parent_id: Snowflake) -> ServiceResult<()> {
        let parent = self
            .ctx
            .message_repo()
            .find_by_id(parent_id)
            .await?
            .filter(|p| !p.is_deleted)
            .ok_or(DomainError::MessageNotFound(parent_id))?;

        if parent.is_reply() {
            return Err(DomainError::InvalidThread(
                "replies cannot have replies".to_string(),
            )
            .into());
        }
        if parent.channel_id != channel_id {
            return Err(DomainError::InvalidThread(
                "parent belongs to another channel".to_string(),
            )
            .into());
        }
        Ok(())
    }

    /// Members mentioned in `content`. The sender can mention themselves.
    ///
    /// Names come from the directory; members it does not list fall back to
    /// the name recorded when they joined.
    async fn resolve_mentions(
        &self,
        channel_id: Snowflake,
        content: &str,
    ) -> ServiceResult<BTreeSet<Snowflake>> {
        if !content.contains('@') {
            return Ok(BTreeSet::new());
        }

        let members = self.ctx.member_repo().find_by_channel(channel_id).await?;
        let names = match name_index(self.ctx.directory()).await {
            Ok(names) => names,
            Err(e) => {
                warn!(error = %e, "Directory unavailable, resolving mentions from member names");
                Default::default()
            }
        };

        let candidates: Vec<MentionCandidate> = members
            .into_iter()
            .map(|m| {
                let name = names.get(&m.user_id).cloned().unwrap_or(m.display_name);
                MentionCandidate::new(m.user_id, name)
            })
            .collect();

        Ok(extract_mentions(
            content,
            &candidates,
            self.ctx.settings().mention_policy,
        ))
    }

    /// One notification per mentioned user other than the sender
    async fn notify_mentions(&self, message: &Message, users: &BTreeSet<Snowflake>) {
        for &user_id in users.iter().filter(|id| **id != message.sender_id) {
            self.ctx
                .notify(Notification {
                    user_id,
                    kind: NotificationKind::Mention,
                    payload: json!({
                        "message_id": message.id,
                        "channel_id": message.channel_id,
                        "sender_id": message.sender_id,
                    }),
                })
                .await;
        }
    }

    async fn notify_direct_recipient(&self, channel: &Channel, message: &Message) {
        let members = match self.ctx.member_repo().find_by_channel(channel.id).await {
            Ok(members) => members,
            Err(e) => {
                warn!(error = %e, channel_id = %channel.id, "Could not load direct channel members");
                return;
            }
        };

        for member in members {
            if member.user_id == message.sender_id || message.mentions.contains(&member.user_id) {
                continue;
            }
            self.ctx
                .notify(Notification {
                    user_id: member.user_id,
                    kind: NotificationKind::DirectMessage,
                    payload: json!({
                        "message_id": message.id,
                        "channel_id": channel.id,
                        "sender_id": message.sender_id,
                    }),
                })
                .await;
        }
    }
}
