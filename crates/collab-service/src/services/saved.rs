//! Saved items service
//!
//! Bookmarks outlive their targets. Listing drops entries whose message is
//! gone or whose channel the user can no longer read; nothing is cleaned up
//! eagerly.

use std::collections::HashMap;

use collab_core::{clock, DomainError, ItemType, Message, Principal, SavedItem, Snowflake};
use tracing::{debug, info, instrument};

use crate::dto::{SaveItemRequest, SavedItemResponse};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::permission::PermissionService;

/// Saved items service
pub struct SavedItemService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> SavedItemService<'a> {
    /// Create a new SavedItemService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Bookmark a message, file or poll. Saving the same target twice
    /// returns the first bookmark.
    #[instrument(skip(self, actor, request), fields(user_id = %actor.user_id))]
    pub async fn save_item(
        &self,
        actor: &Principal,
        request: SaveItemRequest,
    ) -> ServiceResult<SavedItemResponse> {
        let message = self
            .target_message(request.item_type, request.item_id)
            .await?
            .ok_or_else(|| {
                ServiceError::not_found(request.item_type.as_str(), request.item_id.to_string())
            })?;

        let message = match PermissionService::new(self.ctx)
            .live_message(message.id, actor)
            .await
        {
            Ok((message, _)) => message,
            Err(e) if e.is_not_found() => {
                return Err(ServiceError::not_found(
                    request.item_type.as_str(),
                    request.item_id.to_string(),
                ))
            }
            Err(e) => return Err(e),
        };

        if request.item_type == ItemType::File && !message.has_attachments() {
            return Err(ServiceError::validation(format!(
                "message {} has no attachments",
                message.id
            )));
        }

        let item = SavedItem {
            id: self.ctx.generate_id(),
            user_id: actor.user_id,
            item_type: request.item_type,
            item_id: request.item_id,
            channel_id: message.channel_id,
            saved_at: clock::now(),
        };
        let stored = self.ctx.saved_item_repo().save(&item).await?;

        info!(saved_id = %stored.id, item_type = stored.item_type.as_str(), "Item saved");

        Ok(SavedItemResponse::new(&stored, &message))
    }

    /// Remove one of the caller's bookmarks
    #[instrument(skip(self, actor), fields(user_id = %actor.user_id))]
    pub async fn unsave_item(&self, actor: &Principal, saved_id: Snowflake) -> ServiceResult<()> {
        if !self.ctx.saved_item_repo().delete(actor.user_id, saved_id).await? {
            return Err(DomainError::SavedItemNotFound(saved_id).into());
        }
        info!(saved_id = %saved_id, "Item unsaved");
        Ok(())
    }

    /// The caller's bookmarks, newest first, without dangling or
    /// inaccessible targets
    #[instrument(skip(self, actor), fields(user_id = %actor.user_id))]
    pub async fn list_saved_items(&self, actor: &Principal) -> ServiceResult<Vec<SavedItemResponse>> {
        let items = self.ctx.saved_item_repo().find_by_user(actor.user_id).await?;
        let permissions = PermissionService::new(self.ctx);
        let mut readable: HashMap<Snowflake, bool> = HashMap::new();
        let mut responses = Vec::with_capacity(items.len());

        for item in &items {
            let Some(message) = self.target_message(item.item_type, item.item_id).await? else {
                debug!(saved_id = %item.id, "Dropping bookmark with missing target");
                continue;
            };
            if message.is_deleted {
                continue;
            }

            let can_read = match readable.get(&message.channel_id) {
                Some(can_read) => *can_read,
                None => {
                    let can_read = match permissions.readable(message.channel_id, actor).await {
                        Ok(_) => true,
                        Err(e) if e.is_not_found() => false,
                        Err(e) => return Err(e),
                    };
                    readable.insert(message.channel_id, can_read);
                    can_read
                }
            };
            if !can_read {
                debug!(saved_id = %item.id, "Dropping bookmark in unreadable channel");
                continue;
            }

            responses.push(SavedItemResponse::new(item, &message));
        }

        Ok(responses)
    }

    /// The message a bookmark points at; a poll resolves through its message
    async fn target_message(
        &self,
        item_type: ItemType,
        item_id: Snowflake,
    ) -> ServiceResult<Option<Message>> {
        let message_id = match item_type {
            ItemType::Message | ItemType::File => item_id,
            ItemType::Poll => match self.ctx.poll_repo().find_by_id(item_id).await? {
                Some(poll) => poll.message_id,
                None => return Ok(None),
            },
        };
        Ok(self.ctx.message_repo().find_by_id(message_id).await?)
    }
}
