//! PostgreSQL implementation of ReactionRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use collab_core::entities::Reaction;
use collab_core::traits::{ReactionRepository, RepoResult};
use collab_core::value_objects::Snowflake;

use crate::models::ReactionModel;

use super::error::map_db_error;

/// PostgreSQL implementation of ReactionRepository
#[derive(Clone)]
pub struct PgReactionRepository {
    pool: PgPool,
}

impl PgReactionRepository {
    /// Create a new PgReactionRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReactionRepository for PgReactionRepository {
    #[instrument(skip(self, reaction), fields(message_id = %reaction.message_id, user_id = %reaction.user_id))]
    async fn toggle(&self, reaction: &Reaction) -> RepoResult<bool> {
        // Delete and insert share one snapshot: exactly one of them applies.
        let added = sqlx::query_scalar::<_, bool>(
            r"
            WITH removed AS (
                DELETE FROM reactions
                WHERE message_id = $1 AND emoji = $2 AND user_id = $3
                RETURNING 1
            ), added AS (
                INSERT INTO reactions (message_id, emoji, user_id, created_at)
                SELECT $1, $2, $3, $4
                WHERE NOT EXISTS (SELECT 1 FROM removed)
                ON CONFLICT (message_id, emoji, user_id) DO NOTHING
                RETURNING 1
            )
            SELECT EXISTS (SELECT 1 FROM added)
            ",
        )
        .bind(reaction.message_id.into_inner())
        .bind(&reaction.emoji)
        .bind(reaction.user_id.into_inner())
        .bind(reaction.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(added)
    }

    #[instrument(skip(self))]
    async fn find_by_message(&self, message_id: Snowflake) -> RepoResult<Vec<Reaction>> {
        let results = sqlx::query_as::<_, ReactionModel>(
            r"
            SELECT message_id, user_id, emoji, created_at
            FROM reactions
            WHERE message_id = $1
            ORDER BY created_at, emoji, user_id
            ",
        )
        .bind(message_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Reaction::from).collect())
    }
}
