//! PostgreSQL implementation of PollRepository

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use collab_core::entities::{Poll, PollVote};
use collab_core::error::DomainError;
use collab_core::traits::{PollRepository, RepoResult};
use collab_core::value_objects::Snowflake;

use crate::mappers::{assemble_poll, ids};
use crate::models::{PollModel, PollOptionModel, PollVoteModel};

use super::error::{map_db_error, map_foreign_key_violation, map_unique_violation, poll_not_found};

/// PostgreSQL implementation of PollRepository
#[derive(Clone)]
pub struct PgPollRepository {
    pool: PgPool,
}

impl PgPollRepository {
    /// Create a new PgPollRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn with_options(&self, model: Option<PollModel>) -> RepoResult<Option<Poll>> {
        let Some(model) = model else {
            return Ok(None);
        };

        let options = sqlx::query_as::<_, PollOptionModel>(
            r"
            SELECT o.id, o.poll_id, o.text, o.position,
                   (SELECT COUNT(*) FROM poll_votes v WHERE v.option_id = o.id) AS vote_count
            FROM poll_options o
            WHERE o.poll_id = $1
            ORDER BY o.position
            ",
        )
        .bind(model.id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(Some(assemble_poll(model, options)))
    }
}

#[async_trait]
impl PollRepository for PgPollRepository {
    #[instrument(skip(self, poll), fields(poll_id = %poll.id, message_id = %poll.message_id))]
    async fn create(&self, poll: &Poll) -> RepoResult<()> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        sqlx::query(
            r"
            INSERT INTO polls (id, message_id, question, allow_multiple, is_anonymous, created_by, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(poll.id.into_inner())
        .bind(poll.message_id.into_inner())
        .bind(&poll.question)
        .bind(poll.allow_multiple)
        .bind(poll.is_anonymous)
        .bind(poll.created_by.into_inner())
        .bind(poll.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_unique_violation(e, || DomainError::PollAlreadyExists(poll.message_id)))?;

        for option in &poll.options {
            sqlx::query(
                r"INSERT INTO poll_options (id, poll_id, text, position) VALUES ($1, $2, $3, $4)",
            )
            .bind(option.id.into_inner())
            .bind(poll.id.into_inner())
            .bind(&option.text)
            .bind(option.position)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;
        }

        tx.commit().await.map_err(map_db_error)?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Poll>> {
        let model = sqlx::query_as::<_, PollModel>(
            r"
            SELECT id, message_id, question, allow_multiple, is_anonymous, created_by, created_at
            FROM polls
            WHERE id = $1
            ",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        self.with_options(model).await
    }

    #[instrument(skip(self))]
    async fn find_by_message(&self, message_id: Snowflake) -> RepoResult<Option<Poll>> {
        let model = sqlx::query_as::<_, PollModel>(
            r"
            SELECT id, message_id, question, allow_multiple, is_anonymous, created_by, created_at
            FROM polls
            WHERE message_id = $1
            ",
        )
        .bind(message_id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        self.with_options(model).await
    }

    #[instrument(skip(self))]
    async fn find_votes(&self, poll_id: Snowflake) -> RepoResult<Vec<PollVote>> {
        let results = sqlx::query_as::<_, PollVoteModel>(
            r"
            SELECT poll_id, option_id, user_id, voted_at
            FROM poll_votes
            WHERE poll_id = $1
            ORDER BY voted_at, user_id, option_id
            ",
        )
        .bind(poll_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(PollVote::from).collect())
    }

    #[instrument(skip(self, option_ids))]
    async fn replace_votes(
        &self,
        poll_id: Snowflake,
        user_id: Snowflake,
        option_ids: &BTreeSet<Snowflake>,
        at: DateTime<Utc>,
    ) -> RepoResult<()> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        // Serializes ballots on this poll so single-choice holds under races
        let locked = sqlx::query_scalar::<_, i64>(r"SELECT id FROM polls WHERE id = $1 FOR UPDATE")
            .bind(poll_id.into_inner())
            .fetch_optional(&mut *tx)
            .await
            .map_err(map_db_error)?;

        if locked.is_none() {
            return Err(poll_not_found(poll_id));
        }

        sqlx::query(r"DELETE FROM poll_votes WHERE poll_id = $1 AND user_id = $2")
            .bind(poll_id.into_inner())
            .bind(user_id.into_inner())
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

        if !option_ids.is_empty() {
            sqlx::query(
                r"
                INSERT INTO poll_votes (poll_id, option_id, user_id, voted_at)
                SELECT $1, o.option_id, $2, $4
                FROM UNNEST($3::BIGINT[]) AS o(option_id)
                ",
            )
            .bind(poll_id.into_inner())
            .bind(user_id.into_inner())
            .bind(ids(option_ids))
            .bind(at)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                map_foreign_key_violation(e, || {
                    DomainError::Conflict("poll option no longer exists".to_string())
                })
            })?;
        }

        tx.commit().await.map_err(map_db_error)?;
        Ok(())
    }
}
