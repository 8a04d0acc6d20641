//! PostgreSQL implementation of MemberRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use collab_core::entities::ChannelMember;
use collab_core::error::DomainError;
use collab_core::traits::{MemberRepository, RepoResult};
use collab_core::value_objects::Snowflake;

use crate::mappers::MemberInsert;
use crate::models::ChannelMemberModel;

use super::error::{map_db_error, map_unique_violation, member_not_found};

/// PostgreSQL implementation of MemberRepository
#[derive(Clone)]
pub struct PgMemberRepository {
    pool: PgPool,
}

impl PgMemberRepository {
    /// Create a new PgMemberRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MemberRepository for PgMemberRepository {
    #[instrument(skip(self))]
    async fn find(
        &self,
        channel_id: Snowflake,
        user_id: Snowflake,
    ) -> RepoResult<Option<ChannelMember>> {
        let result = sqlx::query_as::<_, ChannelMemberModel>(
            r"
            SELECT channel_id, user_id, role, display_name, joined_at
            FROM channel_members
            WHERE channel_id = $1 AND user_id = $2
            ",
        )
        .bind(channel_id.into_inner())
        .bind(user_id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(ChannelMember::from))
    }

    #[instrument(skip(self))]
    async fn find_by_channel(&self, channel_id: Snowflake) -> RepoResult<Vec<ChannelMember>> {
        let results = sqlx::query_as::<_, ChannelMemberModel>(
            r"
            SELECT channel_id, user_id, role, display_name, joined_at
            FROM channel_members
            WHERE channel_id = $1
            ORDER BY joined_at, user_id
            ",
        )
        .bind(channel_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(ChannelMember::from).collect())
    }

    #[instrument(skip(self, member), fields(channel_id = %member.channel_id, user_id = %member.user_id))]
    async fn add(&self, member: &ChannelMember) -> RepoResult<()> {
        let insert = MemberInsert::new(member);
        sqlx::query(
            r"
            INSERT INTO channel_members (channel_id, user_id, role, display_name, joined_at)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(insert.channel_id)
        .bind(insert.user_id)
        .bind(insert.role)
        .bind(insert.display_name)
        .bind(member.joined_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, || DomainError::AlreadyMember))?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn remove(&self, channel_id: Snowflake, user_id: Snowflake) -> RepoResult<()> {
        let result = sqlx::query(
            r"DELETE FROM channel_members WHERE channel_id = $1 AND user_id = $2",
        )
        .bind(channel_id.into_inner())
        .bind(user_id.into_inner())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(member_not_found(channel_id, user_id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn channel_ids_for_user(&self, user_id: Snowflake) -> RepoResult<Vec<Snowflake>> {
        let results = sqlx::query_scalar::<_, i64>(
            r"SELECT channel_id FROM channel_members WHERE user_id = $1 ORDER BY channel_id",
        )
        .bind(user_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Snowflake::new).collect())
    }
}
