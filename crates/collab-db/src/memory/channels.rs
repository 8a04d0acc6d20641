//! Channels, categories and membership

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;

use collab_core::entities::{Category, Channel, ChannelMember};
use collab_core::error::DomainError;
use collab_core::traits::{CategoryRepository, ChannelRepository, MemberRepository, RepoResult};
use collab_core::value_objects::{CanonicalPair, Snowflake};

use super::InMemoryStore;

#[async_trait]
impl ChannelRepository for InMemoryStore {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Channel>> {
        Ok(self.channels.get(&id).map(|c| c.clone()))
    }

    async fn create(&self, channel: &Channel, owner: &ChannelMember) -> RepoResult<()> {
        self.channels.insert(channel.id, channel.clone());
        self.members
            .insert((owner.channel_id, owner.user_id), owner.clone());
        Ok(())
    }

    async fn create_direct(
        &self,
        channel: &Channel,
        pair: CanonicalPair,
        members: [ChannelMember; 2],
    ) -> RepoResult<Channel> {
        match self.direct_pairs.entry(pair) {
            Entry::Occupied(existing) => {
                let id = *existing.get();
                drop(existing);
                self.channels
                    .get(&id)
                    .map(|c| c.clone())
                    .ok_or(DomainError::ChannelNotFound(id))
            }
            Entry::Vacant(slot) => {
                self.channels.insert(channel.id, channel.clone());
                for member in members {
                    self.members
                        .insert((member.channel_id, member.user_id), member);
                }
                slot.insert(channel.id);
                Ok(channel.clone())
            }
        }
    }

    async fn find_direct(&self, pair: CanonicalPair) -> RepoResult<Option<Channel>> {
        let id = match self.direct_pairs.get(&pair) {
            Some(id) => *id,
            None => return Ok(None),
        };
        Ok(self.channels.get(&id).map(|c| c.clone()))
    }

    async fn update(&self, channel: &Channel) -> RepoResult<()> {
        let mut stored = self
            .channels
            .get_mut(&channel.id)
            .ok_or(DomainError::ChannelNotFound(channel.id))?;
        stored.name.clone_from(&channel.name);
        stored.description.clone_from(&channel.description);
        stored.icon.clone_from(&channel.icon);
        stored.color.clone_from(&channel.color);
        stored.category_id = channel.category_id;
        Ok(())
    }

    async fn archive(&self, id: Snowflake, at: DateTime<Utc>) -> RepoResult<()> {
        let mut stored = self
            .channels
            .get_mut(&id)
            .ok_or(DomainError::ChannelNotFound(id))?;
        stored.archived_at.get_or_insert(at);
        Ok(())
    }

    async fn find_by_member(&self, user_id: Snowflake) -> RepoResult<Vec<Channel>> {
        let ids = MemberRepository::channel_ids_for_user(self, user_id).await?;
        Ok(ids
            .into_iter()
            .filter_map(|id| self.channels.get(&id).map(|c| c.clone()))
            .collect())
    }

    async fn find_public(&self) -> RepoResult<Vec<Channel>> {
        let mut channels: Vec<Channel> = self
            .channels
            .iter()
            .filter(|c| c.is_public() && !c.is_archived())
            .map(|c| c.clone())
            .collect();
        channels.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(channels)
    }
}

#[async_trait]
impl CategoryRepository for InMemoryStore {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Category>> {
        Ok(self.categories.get(&id).map(|c| c.clone()))
    }

    async fn create(&self, category: &Category) -> RepoResult<()> {
        self.categories.insert(category.id, category.clone());
        Ok(())
    }

    async fn list(&self) -> RepoResult<Vec<Category>> {
        let mut categories: Vec<Category> = self.categories.iter().map(|c| c.clone()).collect();
        categories.sort_by_key(|c| (c.position, c.id));
        Ok(categories)
    }
}

#[async_trait]
impl MemberRepository for InMemoryStore {
    async fn find(
        &self,
        channel_id: Snowflake,
        user_id: Snowflake,
    ) -> RepoResult<Option<ChannelMember>> {
        Ok(self.members.get(&(channel_id, user_id)).map(|m| m.clone()))
    }

    async fn find_by_channel(&self, channel_id: Snowflake) -> RepoResult<Vec<ChannelMember>> {
        let mut members: Vec<ChannelMember> = self
            .members
            .iter()
            .filter(|m| m.channel_id == channel_id)
            .map(|m| m.clone())
            .collect();
        members.sort_by_key(|m| (m.joined_at, m.user_id));
        Ok(members)
    }

    async fn add(&self, member: &ChannelMember) -> RepoResult<()> {
        match self.members.entry((member.channel_id, member.user_id)) {
            Entry::Occupied(_) => Err(DomainError::AlreadyMember),
            Entry::Vacant(slot) => {
                slot.insert(member.clone());
                Ok(())
            }
        }
    }

    async fn remove(&self, channel_id: Snowflake, user_id: Snowflake) -> RepoResult<()> {
        self.members
            .remove(&(channel_id, user_id))
            .map(|_| ())
            .ok_or(DomainError::MemberNotFound {
                channel_id,
                user_id,
            })
    }

    async fn channel_ids_for_user(&self, user_id: Snowflake) -> RepoResult<Vec<Snowflake>> {
        let mut ids: Vec<Snowflake> = self
            .members
            .iter()
            .filter(|m| m.user_id == user_id)
            .map(|m| m.channel_id)
            .collect();
        ids.sort();
        Ok(ids)
    }
}
