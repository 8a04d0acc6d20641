//! User presence storage in Redis.
//!
//! Each status lives under its own key with a TTL; an expired entry reads as
//! offline, so a client that stops refreshing drops off on its own.

use async_trait::async_trait;
use collab_core::entities::PresenceStatus;
use collab_core::traits::{PresenceRepository, RepoResult};
use collab_core::Snowflake;

use crate::pool::RedisPool;

/// Key prefix for user presence
const PRESENCE_PREFIX: &str = "presence:";

fn presence_key(user_id: Snowflake) -> String {
    format!("{PRESENCE_PREFIX}{user_id}")
}

/// Presence store backed by Redis
#[derive(Debug, Clone)]
pub struct RedisPresenceStore {
    pool: RedisPool,
    ttl_secs: u64,
}

impl RedisPresenceStore {
    #[must_use]
    pub fn new(pool: RedisPool, ttl_secs: u64) -> Self {
        Self { pool, ttl_secs }
    }
}

#[async_trait]
impl PresenceRepository for RedisPresenceStore {
    async fn set(&self, presence: &PresenceStatus) -> RepoResult<()> {
        self.pool
            .set(&presence_key(presence.user_id), presence, Some(self.ttl_secs))
            .await?;
        tracing::debug!(user_id = %presence.user_id, status = %presence.status, "Presence stored");
        Ok(())
    }

    async fn get(&self, user_id: Snowflake) -> RepoResult<Option<PresenceStatus>> {
        Ok(self.pool.get_value(&presence_key(user_id)).await?)
    }

    async fn get_many(&self, user_ids: &[Snowflake]) -> RepoResult<Vec<PresenceStatus>> {
        let keys: Vec<String> = user_ids.iter().copied().map(presence_key).collect();
        let found: Vec<Option<PresenceStatus>> = self.pool.get_values(&keys).await?;

        Ok(user_ids
            .iter()
            .zip(found)
            .map(|(id, status)| status.unwrap_or_else(|| PresenceStatus::offline(*id)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presence_key() {
        assert_eq!(presence_key(Snowflake::new(42)), "presence:42");
    }

    #[test]
    fn test_store_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RedisPresenceStore>();
    }
}
