//! Read markers, bookmarks, quick replies and presence

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;

use collab_core::entities::{
    MentionRecord, PresenceStatus, QuickReply, ReadMarker, SavedItem,
};
use collab_core::traits::{
    PresenceRepository, QuickReplyRepository, ReadStateRepository, RepoResult,
    SavedItemRepository,
};
use collab_core::value_objects::Snowflake;

use super::InMemoryStore;

#[async_trait]
impl ReadStateRepository for InMemoryStore {
    async fn find_marker(
        &self,
        user_id: Snowflake,
        channel_id: Snowflake,
    ) -> RepoResult<Option<ReadMarker>> {
        Ok(self.markers.get(&(user_id, channel_id)).map(|m| *m))
    }

    async fn advance_marker(&self, marker: &ReadMarker) -> RepoResult<ReadMarker> {
        Ok(match self.markers.entry((marker.user_id, marker.channel_id)) {
            Entry::Occupied(mut existing) => {
                if marker.position() > existing.get().position() {
                    existing.insert(*marker);
                }
                *existing.get()
            }
            Entry::Vacant(slot) => *slot.insert(*marker),
        })
    }

    async fn unread_count(&self, user_id: Snowflake, channel_id: Snowflake) -> RepoResult<i64> {
        let marker = self.find_marker(user_id, channel_id).await?;
        let unread = self.messages_where(|m| {
            m.channel_id == channel_id
                && !m.is_deleted
                && m.sender_id != user_id
                && marker.map_or(true, |mk| mk.is_before(m.created_at, m.id))
        });
        Ok(unread.len() as i64)
    }

    async fn pending_mentions(
        &self,
        user_id: Snowflake,
        channel_ids: &[Snowflake],
    ) -> RepoResult<Vec<MentionRecord>> {
        let mut records = Vec::new();
        for channel_id in channel_ids {
            let marker = self.find_marker(user_id, *channel_id).await?;
            let mentioned = self.messages_where(|m| {
                m.channel_id == *channel_id
                    && !m.is_deleted
                    && m.sender_id != user_id
                    && m.mentions.contains(&user_id)
                    && marker.map_or(true, |mk| mk.is_before(m.created_at, m.id))
            });
            records.extend(mentioned.into_iter().map(|m| MentionRecord {
                message_id: m.id,
                channel_id: m.channel_id,
                user_id,
                created_at: m.created_at,
            }));
        }
        records.sort_by_key(|r| (r.created_at, r.message_id));
        Ok(records)
    }
}

#[async_trait]
impl SavedItemRepository for InMemoryStore {
    async fn save(&self, item: &SavedItem) -> RepoResult<SavedItem> {
        let mut saved = self.saved.lock();
        if let Some(existing) = saved.iter().find(|s| {
            s.user_id == item.user_id && s.item_type == item.item_type && s.item_id == item.item_id
        }) {
            return Ok(existing.clone());
        }
        saved.push(item.clone());
        Ok(item.clone())
    }

    async fn delete(&self, user_id: Snowflake, id: Snowflake) -> RepoResult<bool> {
        let mut saved = self.saved.lock();
        let before = saved.len();
        saved.retain(|s| !(s.id == id && s.user_id == user_id));
        Ok(saved.len() < before)
    }

    async fn find_by_user(&self, user_id: Snowflake) -> RepoResult<Vec<SavedItem>> {
        let mut items: Vec<SavedItem> = self
            .saved
            .lock()
            .iter()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| (b.saved_at, b.id).cmp(&(a.saved_at, a.id)));
        Ok(items)
    }
}

#[async_trait]
impl QuickReplyRepository for InMemoryStore {
    async fn create(&self, reply: &QuickReply) -> RepoResult<()> {
        self.quick_replies.insert(reply.id, reply.clone());
        Ok(())
    }

    async fn find_by_user(&self, user_id: Snowflake) -> RepoResult<Vec<QuickReply>> {
        let mut replies: Vec<QuickReply> = self
            .quick_replies
            .iter()
            .filter(|r| r.user_id == user_id)
            .map(|r| r.clone())
            .collect();
        replies.sort_by_key(|r| (r.created_at, r.id));
        Ok(replies)
    }

    async fn delete(&self, user_id: Snowflake, id: Snowflake) -> RepoResult<bool> {
        Ok(self
            .quick_replies
            .remove_if(&id, |_, reply| reply.user_id == user_id)
            .is_some())
    }
}

#[async_trait]
impl PresenceRepository for InMemoryStore {
    async fn set(&self, presence: &PresenceStatus) -> RepoResult<()> {
        self.presence.insert(presence.user_id, presence.clone());
        Ok(())
    }

    async fn get(&self, user_id: Snowflake) -> RepoResult<Option<PresenceStatus>> {
        Ok(self.presence.get(&user_id).map(|p| p.clone()))
    }

    async fn get_many(&self, user_ids: &[Snowflake]) -> RepoResult<Vec<PresenceStatus>> {
        Ok(user_ids
            .iter()
            .map(|id| {
                self.presence
                    .get(id)
                    .map_or_else(|| PresenceStatus::offline(*id), |p| p.clone())
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use collab_core::entities::{ItemType, Message};
    use collab_core::traits::MessageRepository;

    #[tokio::test]
    async fn test_marker_never_moves_backwards() {
        let store = InMemoryStore::new();
        let now = Utc::now();
        let later = ReadMarker {
            user_id: Snowflake::new(1),
            channel_id: Snowflake::new(2),
            last_read_at: now,
            last_read_message_id: Some(Snowflake::new(50)),
        };
        let earlier = ReadMarker {
            last_read_at: now - Duration::minutes(5),
            ..later
        };

        store.advance_marker(&later).await.unwrap();
        let stored = store.advance_marker(&earlier).await.unwrap();
        assert_eq!(stored, later);
    }

    #[tokio::test]
    async fn test_unread_excludes_own_and_deleted_messages() {
        let store = InMemoryStore::new();
        let channel = Snowflake::new(10);
        let me = Snowflake::new(1);
        let other = Snowflake::new(2);

        store
            .insert(&Message::new(Snowflake::new(100), channel, other, "a".into()))
            .await
            .unwrap();
        store
            .insert(&Message::new(Snowflake::new(101), channel, me, "b".into()))
            .await
            .unwrap();
        store
            .insert(&Message::new(Snowflake::new(102), channel, other, "c".into()))
            .await
            .unwrap();
        store.soft_delete(Snowflake::new(102)).await.unwrap();

        assert_eq!(store.unread_count(me, channel).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_save_twice_returns_first() {
        let store = InMemoryStore::new();
        let item = SavedItem {
            id: Snowflake::new(1),
            user_id: Snowflake::new(2),
            item_type: ItemType::Message,
            item_id: Snowflake::new(3),
            channel_id: Snowflake::new(4),
            saved_at: Utc::now(),
        };
        let again = SavedItem {
            id: Snowflake::new(9),
            ..item.clone()
        };

        store.save(&item).await.unwrap();
        let stored = store.save(&again).await.unwrap();
        assert_eq!(stored.id, item.id);
        assert_eq!(SavedItemRepository::find_by_user(&store, item.user_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_presence_reads_offline() {
        let store = InMemoryStore::new();
        let statuses = store.get_many(&[Snowflake::new(7)]).await.unwrap();
        assert_eq!(statuses.len(), 1);
        assert_eq!(statuses[0].user_id, Snowflake::new(7));
        assert_eq!(statuses[0].status, collab_core::entities::UserStatus::Offline);
    }
}
