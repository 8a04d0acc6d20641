//! PostgreSQL implementations of SavedItemRepository and QuickReplyRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use collab_core::entities::{QuickReply, SavedItem};
use collab_core::traits::{QuickReplyRepository, RepoResult, SavedItemRepository};
use collab_core::value_objects::Snowflake;

use crate::models::{QuickReplyModel, SavedItemModel};

use super::error::map_db_error;

/// PostgreSQL implementation of SavedItemRepository
#[derive(Clone)]
pub struct PgSavedItemRepository {
    pool: PgPool,
}

impl PgSavedItemRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SavedItemRepository for PgSavedItemRepository {
    #[instrument(skip(self, item), fields(user_id = %item.user_id, item_id = %item.item_id))]
    async fn save(&self, item: &SavedItem) -> RepoResult<SavedItem> {
        // The no-op update makes RETURNING yield the existing row on conflict
        let result = sqlx::query_as::<_, SavedItemModel>(
            r"
            INSERT INTO saved_items (id, user_id, item_type, item_id, channel_id, saved_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (user_id, item_type, item_id)
                DO UPDATE SET user_id = EXCLUDED.user_id
            RETURNING id, user_id, item_type, item_id, channel_id, saved_at
            ",
        )
        .bind(item.id.into_inner())
        .bind(item.user_id.into_inner())
        .bind(item.item_type.as_str())
        .bind(item.item_id.into_inner())
        .bind(item.channel_id.into_inner())
        .bind(item.saved_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(SavedItem::from(result))
    }

    #[instrument(skip(self))]
    async fn delete(&self, user_id: Snowflake, id: Snowflake) -> RepoResult<bool> {
        let result = sqlx::query(r"DELETE FROM saved_items WHERE id = $1 AND user_id = $2")
            .bind(id.into_inner())
            .bind(user_id.into_inner())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn find_by_user(&self, user_id: Snowflake) -> RepoResult<Vec<SavedItem>> {
        let results = sqlx::query_as::<_, SavedItemModel>(
            r"
            SELECT id, user_id, item_type, item_id, channel_id, saved_at
            FROM saved_items
            WHERE user_id = $1
            ORDER BY saved_at DESC, id DESC
            ",
        )
        .bind(user_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(SavedItem::from).collect())
    }
}

/// PostgreSQL implementation of QuickReplyRepository
#[derive(Clone)]
pub struct PgQuickReplyRepository {
    pool: PgPool,
}

impl PgQuickReplyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl QuickReplyRepository for PgQuickReplyRepository {
    #[instrument(skip(self, reply), fields(user_id = %reply.user_id))]
    async fn create(&self, reply: &QuickReply) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO quick_replies (id, user_id, title, content, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(reply.id.into_inner())
        .bind(reply.user_id.into_inner())
        .bind(&reply.title)
        .bind(&reply.content)
        .bind(reply.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_by_user(&self, user_id: Snowflake) -> RepoResult<Vec<QuickReply>> {
        let results = sqlx::query_as::<_, QuickReplyModel>(
            r"
            SELECT id, user_id, title, content, created_at
            FROM quick_replies
            WHERE user_id = $1
            ORDER BY created_at, id
            ",
        )
        .bind(user_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(QuickReply::from).collect())
    }

    #[instrument(skip(self))]
    async fn delete(&self, user_id: Snowflake, id: Snowflake) -> RepoResult<bool> {
        let result = sqlx::query(r"DELETE FROM quick_replies WHERE id = $1 AND user_id = $2")
            .bind(id.into_inner())
            .bind(user_id.into_inner())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PgSavedItemRepository>();
        assert_send_sync::<PgQuickReplyRepository>();
    }
}
