//! Channel service
//!
//! Channel and category lifecycle: create, read, list with badges, update,
//! archive.

use std::collections::HashMap;

use collab_core::{
    Category, Channel, ChannelMember, ChannelType, DomainError, DomainEvent, MemberRole, Principal,
    Snowflake, UnreadState,
};
use tracing::{info, instrument};
use validator::Validate;

use crate::dto::{
    CategoryResponse, ChannelResponse, ChannelSummaryResponse, CreateCategoryRequest,
    CreateChannelRequest, UpdateChannelRequest,
};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::member::MemberService;
use super::permission::PermissionService;

const MAX_CHANNEL_NAME_LENGTH: usize = 100;

/// Trimmed channel name, 1-100 characters
fn channel_name(raw: &str) -> ServiceResult<String> {
    let name = raw.trim();
    if name.is_empty() || name.chars().count() > MAX_CHANNEL_NAME_LENGTH {
        return Err(ServiceError::validation(format!(
            "Channel name must be 1-{MAX_CHANNEL_NAME_LENGTH} characters"
        )));
    }
    Ok(name.to_string())
}

/// Channel service
pub struct ChannelService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ChannelService<'a> {
    /// Create a new ChannelService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Create a public or private channel; the creator joins as admin
    #[instrument(skip(self, actor, request), fields(user_id = %actor.user_id))]
    pub async fn create_channel(
        &self,
        actor: &Principal,
        request: CreateChannelRequest,
    ) -> ServiceResult<ChannelResponse> {
        request.validate()?;

        if request.channel_type == ChannelType::Direct {
            return Err(ServiceError::validation(
                "Direct channels are opened with a user, not created",
            ));
        }
        let name = channel_name(&request.name)?;

        if let Some(category_id) = request.category_id {
            self.require_category(category_id).await?;
        }

        let mut channel = Channel::new(self.ctx.generate_id(), name, request.channel_type, actor.user_id);
        channel.description = request.description;
        channel.icon = request.icon;
        channel.color = request.color;
        channel.category_id = request.category_id;

        let display_name = MemberService::new(self.ctx)
            .own_display_name(actor.user_id)
            .await?;
        let owner = ChannelMember::new(channel.id, actor.user_id, MemberRole::Admin, display_name);

        self.ctx.channel_repo().create(&channel, &owner).await?;

        info!(channel_id = %channel.id, channel_type = %channel.channel_type, "Channel created");

        self.ctx
            .publish(DomainEvent::ChannelCreated {
                channel_id: channel.id,
                created_by: actor.user_id,
            })
            .await;

        Ok(ChannelResponse::from(channel))
    }

    /// Get a channel the caller may read
    #[instrument(skip(self, actor), fields(user_id = %actor.user_id))]
    pub async fn get_channel(
        &self,
        actor: &Principal,
        channel_id: Snowflake,
    ) -> ServiceResult<ChannelResponse> {
        let access = PermissionService::new(self.ctx)
            .readable(channel_id, actor)
            .await?;
        Ok(ChannelResponse::from(access.channel))
    }

    /// Channels the caller belongs to, each with unread and mention badges
    #[instrument(skip(self, actor), fields(user_id = %actor.user_id))]
    pub async fn list_channels(&self, actor: &Principal) -> ServiceResult<Vec<ChannelSummaryResponse>> {
        let channels = self.ctx.channel_repo().find_by_member(actor.user_id).await?;
        let channel_ids: Vec<Snowflake> = channels.iter().map(|c| c.id).collect();

        let mut mention_counts: HashMap<Snowflake, i64> = HashMap::new();
        for mention in self
            .ctx
            .read_state_repo()
            .pending_mentions(actor.user_id, &channel_ids)
            .await?
        {
            *mention_counts.entry(mention.channel_id).or_default() += 1;
        }

        let mut summaries = Vec::with_capacity(channels.len());
        for channel in channels {
            let badges = UnreadState {
                unread_count: self
                    .ctx
                    .read_state_repo()
                    .unread_count(actor.user_id, channel.id)
                    .await?,
                mention_count: mention_counts.get(&channel.id).copied().unwrap_or_default(),
            };
            summaries.push(ChannelSummaryResponse {
                channel: ChannelResponse::from(channel),
                unread_count: badges.unread_count,
                mention_count: badges.mention_count,
            });
        }
        Ok(summaries)
    }

    /// Public channels that are not archived, by name
    #[instrument(skip(self))]
    pub async fn list_public_channels(&self) -> ServiceResult<Vec<ChannelResponse>> {
        let channels = self.ctx.channel_repo().find_public().await?;
        Ok(channels.into_iter().map(ChannelResponse::from).collect())
    }

    /// Update name, description, icon, color or category (admin)
    #[instrument(skip(self, actor, request), fields(user_id = %actor.user_id))]
    pub async fn update_channel(
        &self,
        actor: &Principal,
        channel_id: Snowflake,
        request: UpdateChannelRequest,
    ) -> ServiceResult<ChannelResponse> {
        request.validate()?;

        let mut channel = PermissionService::new(self.ctx)
            .administrable(channel_id, actor)
            .await?
            .channel;
        if channel.is_direct() {
            return Err(ServiceError::validation("Direct channels cannot be edited"));
        }

        if let Some(name) = request.name {
            channel.name = channel_name(&name)?;
        }
        if let Some(description) = request.description {
            channel.description = Some(description);
        }
        if let Some(icon) = request.icon {
            channel.icon = Some(icon);
        }
        if let Some(color) = request.color {
            channel.color = Some(color);
        }
        if let Some(category_id) = request.category_id {
            self.require_category(category_id).await?;
            channel.category_id = Some(category_id);
        }

        self.ctx.channel_repo().update(&channel).await?;

        info!(channel_id = %channel_id, "Channel updated");

        self.ctx
            .publish(DomainEvent::ChannelUpdated { channel_id })
            .await;

        Ok(ChannelResponse::from(channel))
    }

    /// Archive a channel (admin). Archiving twice is a no-op.
    #[instrument(skip(self, actor), fields(user_id = %actor.user_id))]
    pub async fn archive_channel(
        &self,
        actor: &Principal,
        channel_id: Snowflake,
    ) -> ServiceResult<ChannelResponse> {
        let mut channel = PermissionService::new(self.ctx)
            .administrable(channel_id, actor)
            .await?
            .channel;
        if channel.is_direct() {
            return Err(ServiceError::validation("Direct channels cannot be archived"));
        }
        if channel.is_archived() {
            return Ok(ChannelResponse::from(channel));
        }

        channel.archive();
        let archived_at = channel
            .archived_at
            .ok_or_else(|| ServiceError::internal("archive left no timestamp"))?;
        self.ctx.channel_repo().archive(channel_id, archived_at).await?;

        info!(channel_id = %channel_id, "Channel archived");

        self.ctx
            .publish(DomainEvent::ChannelArchived { channel_id })
            .await;

        Ok(ChannelResponse::from(channel))
    }

    /// Create a category (organization admin)
    #[instrument(skip(self, actor, request), fields(user_id = %actor.user_id))]
    pub async fn create_category(
        &self,
        actor: &Principal,
        request: CreateCategoryRequest,
    ) -> ServiceResult<CategoryResponse> {
        request.validate()?;
        if !actor.is_admin() {
            return Err(ServiceError::permission_denied(
                "only organization admins manage categories",
            ));
        }

        let name = request.name.trim();
        if name.is_empty() {
            return Err(ServiceError::validation("Category name must not be blank"));
        }

        let category = Category {
            id: self.ctx.generate_id(),
            name: name.to_string(),
            position: request.position,
        };
        self.ctx.category_repo().create(&category).await?;

        info!(category_id = %category.id, "Category created");

        Ok(CategoryResponse::from(&category))
    }

    /// Categories by position, then id
    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> ServiceResult<Vec<CategoryResponse>> {
        let categories = self.ctx.category_repo().list().await?;
        Ok(categories.iter().map(CategoryResponse::from).collect())
    }

    async fn require_category(&self, category_id: Snowflake) -> ServiceResult<Category> {
        self.ctx
            .category_repo()
            .find_by_id(category_id)
            .await?
            .ok_or_else(|| DomainError::CategoryNotFound(category_id).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_name_rules() {
        assert_eq!(channel_name("  general ").unwrap(), "general");
        assert!(channel_name("   ").is_err());
        assert!(channel_name(&"x".repeat(101)).is_err());
        assert!(channel_name(&"é".repeat(100)).is_ok());
    }
}
