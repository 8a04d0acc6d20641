//! PostgreSQL implementation of ReadStateRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use collab_core::entities::{MentionRecord, ReadMarker};
use collab_core::traits::{ReadStateRepository, RepoResult};
use collab_core::value_objects::Snowflake;

use crate::mappers::ids;
use crate::models::{MentionModel, ReadMarkerModel};

use super::error::{channel_not_found, map_db_error};

/// PostgreSQL implementation of ReadStateRepository
///
/// Marker positions compare as `(last_read_at, last_read_message_id)` with a
/// missing id sorting after every real one at the same instant.
#[derive(Clone)]
pub struct PgReadStateRepository {
    pool: PgPool,
}

impl PgReadStateRepository {
    /// Create a new PgReadStateRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReadStateRepository for PgReadStateRepository {
    #[instrument(skip(self))]
    async fn find_marker(
        &self,
        user_id: Snowflake,
        channel_id: Snowflake,
    ) -> RepoResult<Option<ReadMarker>> {
        let result = sqlx::query_as::<_, ReadMarkerModel>(
            r"
            SELECT user_id, channel_id, last_read_at, last_read_message_id
            FROM read_markers
            WHERE user_id = $1 AND channel_id = $2
            ",
        )
        .bind(user_id.into_inner())
        .bind(channel_id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(ReadMarker::from))
    }

    #[instrument(skip(self, marker), fields(user_id = %marker.user_id, channel_id = %marker.channel_id))]
    async fn advance_marker(&self, marker: &ReadMarker) -> RepoResult<ReadMarker> {
        sqlx::query(
            r"
            INSERT INTO read_markers (user_id, channel_id, last_read_at, last_read_message_id)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, channel_id) DO UPDATE
            SET last_read_at = EXCLUDED.last_read_at,
                last_read_message_id = EXCLUDED.last_read_message_id
            WHERE (EXCLUDED.last_read_at,
                   COALESCE(EXCLUDED.last_read_message_id, 9223372036854775807))
                > (read_markers.last_read_at,
                   COALESCE(read_markers.last_read_message_id, 9223372036854775807))
            ",
        )
        .bind(marker.user_id.into_inner())
        .bind(marker.channel_id.into_inner())
        .bind(marker.last_read_at)
        .bind(marker.last_read_message_id.map(Snowflake::into_inner))
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        self.find_marker(marker.user_id, marker.channel_id)
            .await?
            .ok_or_else(|| channel_not_found(marker.channel_id))
    }

    #[instrument(skip(self))]
    async fn unread_count(&self, user_id: Snowflake, channel_id: Snowflake) -> RepoResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            r"
            SELECT COUNT(*)
            FROM messages m
            LEFT JOIN read_markers r ON r.user_id = $1 AND r.channel_id = m.channel_id
            WHERE m.channel_id = $2
              AND m.deleted_at IS NULL
              AND m.sender_id <> $1
              AND (r.user_id IS NULL
                   OR (m.created_at, m.id)
                      > (r.last_read_at, COALESCE(r.last_read_message_id, 9223372036854775807)))
            ",
        )
        .bind(user_id.into_inner())
        .bind(channel_id.into_inner())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(count)
    }

    #[instrument(skip(self, channel_ids), fields(channels = channel_ids.len()))]
    async fn pending_mentions(
        &self,
        user_id: Snowflake,
        channel_ids: &[Snowflake],
    ) -> RepoResult<Vec<MentionRecord>> {
        let results = sqlx::query_as::<_, MentionModel>(
            r"
            SELECT mm.message_id, mm.channel_id, mm.user_id, mm.created_at
            FROM message_mentions mm
            INNER JOIN messages m ON m.id = mm.message_id
            LEFT JOIN read_markers r ON r.user_id = mm.user_id AND r.channel_id = mm.channel_id
            WHERE mm.user_id = $1
              AND mm.channel_id = ANY($2)
              AND m.deleted_at IS NULL
              AND m.sender_id <> $1
              AND (r.user_id IS NULL
                   OR (m.created_at, m.id)
                      > (r.last_read_at, COALESCE(r.last_read_message_id, 9223372036854775807)))
            ORDER BY m.created_at, m.id
            ",
        )
        .bind(user_id.into_inner())
        .bind(ids(channel_ids))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(MentionRecord::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PgReadStateRepository>();
    }
}
