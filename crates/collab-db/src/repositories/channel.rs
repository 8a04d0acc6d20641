//! PostgreSQL implementation of ChannelRepository and CategoryRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use collab_core::entities::{Category, Channel, ChannelMember};
use collab_core::error::DomainError;
use collab_core::traits::{CategoryRepository, ChannelRepository, RepoResult};
use collab_core::value_objects::{CanonicalPair, Snowflake};

use crate::mappers::{ChannelInsert, MemberInsert};
use crate::models::{CategoryModel, ChannelModel};

use super::error::{channel_not_found, map_db_error};

/// PostgreSQL implementation of ChannelRepository
#[derive(Clone)]
pub struct PgChannelRepository {
    pool: PgPool,
}

impl PgChannelRepository {
    /// Create a new PgChannelRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

async fn insert_channel(
    conn: &mut sqlx::PgConnection,
    channel: &Channel,
) -> Result<(), sqlx::Error> {
    let insert = ChannelInsert::new(channel);
    sqlx::query(
        r"
        INSERT INTO channels (id, name, description, type, icon, color, category_id, created_by, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        ",
    )
    .bind(insert.id)
    .bind(insert.name)
    .bind(insert.description)
    .bind(insert.channel_type)
    .bind(insert.icon)
    .bind(insert.color)
    .bind(insert.category_id)
    .bind(insert.created_by)
    .bind(channel.created_at)
    .execute(conn)
    .await?;
    Ok(())
}

async fn insert_member(
    conn: &mut sqlx::PgConnection,
    member: &ChannelMember,
) -> Result<(), sqlx::Error> {
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
    .execute(conn)
    .await?;
    Ok(())
}

#[async_trait]
impl ChannelRepository for PgChannelRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Channel>> {
        let result = sqlx::query_as::<_, ChannelModel>(
            r"
            SELECT id, name, description, type, icon, color, category_id,
                   created_by, created_at, archived_at
            FROM channels
            WHERE id = $1
            ",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Channel::from))
    }

    #[instrument(skip(self, channel, owner), fields(channel_id = %channel.id))]
    async fn create(&self, channel: &Channel, owner: &ChannelMember) -> RepoResult<()> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        insert_channel(&mut tx, channel).await.map_err(map_db_error)?;
        insert_member(&mut tx, owner).await.map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;
        Ok(())
    }

    #[instrument(skip(self, channel, members), fields(channel_id = %channel.id))]
    async fn create_direct(
        &self,
        channel: &Channel,
        pair: CanonicalPair,
        members: [ChannelMember; 2],
    ) -> RepoResult<Channel> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        insert_channel(&mut tx, channel).await.map_err(map_db_error)?;

        // A concurrent insert of the same pair blocks here until the other
        // transaction settles, then claims nothing.
        let claimed = sqlx::query(
            r"
            INSERT INTO direct_channels (user_low, user_high, channel_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_low, user_high) DO NOTHING
            ",
        )
        .bind(pair.low().into_inner())
        .bind(pair.high().into_inner())
        .bind(channel.id.into_inner())
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?
        .rows_affected();

        if claimed == 0 {
            tx.rollback().await.map_err(map_db_error)?;
            return self.find_direct(pair).await?.ok_or_else(|| {
                DomainError::Conflict("direct channel vanished during creation".to_string())
            });
        }

        for member in &members {
            insert_member(&mut tx, member).await.map_err(map_db_error)?;
        }

        tx.commit().await.map_err(map_db_error)?;
        Ok(channel.clone())
    }

    #[instrument(skip(self))]
    async fn find_direct(&self, pair: CanonicalPair) -> RepoResult<Option<Channel>> {
        let result = sqlx::query_as::<_, ChannelModel>(
            r"
            SELECT c.id, c.name, c.description, c.type, c.icon, c.color,
                   c.category_id, c.created_by, c.created_at, c.archived_at
            FROM direct_channels d
            INNER JOIN channels c ON c.id = d.channel_id
            WHERE d.user_low = $1 AND d.user_high = $2
            ",
        )
        .bind(pair.low().into_inner())
        .bind(pair.high().into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Channel::from))
    }

    #[instrument(skip(self, channel), fields(channel_id = %channel.id))]
    async fn update(&self, channel: &Channel) -> RepoResult<()> {
        let update = ChannelInsert::new(channel);
        let result = sqlx::query(
            r"
            UPDATE channels
            SET name = $2, description = $3, icon = $4, color = $5, category_id = $6
            WHERE id = $1
            ",
        )
        .bind(update.id)
        .bind(update.name)
        .bind(update.description)
        .bind(update.icon)
        .bind(update.color)
        .bind(update.category_id)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(channel_not_found(channel.id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn archive(&self, id: Snowflake, at: DateTime<Utc>) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE channels
            SET archived_at = COALESCE(archived_at, $2)
            WHERE id = $1
            ",
        )
        .bind(id.into_inner())
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(channel_not_found(id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_by_member(&self, user_id: Snowflake) -> RepoResult<Vec<Channel>> {
        let results = sqlx::query_as::<_, ChannelModel>(
            r"
            SELECT c.id, c.name, c.description, c.type, c.icon, c.color,
                   c.category_id, c.created_by, c.created_at, c.archived_at
            FROM channels c
            INNER JOIN channel_members m ON m.channel_id = c.id
            WHERE m.user_id = $1
            ORDER BY c.id
            ",
        )
        .bind(user_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Channel::from).collect())
    }

    #[instrument(skip(self))]
    async fn find_public(&self) -> RepoResult<Vec<Channel>> {
        let results = sqlx::query_as::<_, ChannelModel>(
            r"
            SELECT id, name, description, type, icon, color, category_id,
                   created_by, created_at, archived_at
            FROM channels
            WHERE type = 'public' AND archived_at IS NULL
            ORDER BY name, id
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Channel::from).collect())
    }
}

/// PostgreSQL implementation of CategoryRepository
#[derive(Clone)]
pub struct PgCategoryRepository {
    pool: PgPool,
}

impl PgCategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CategoryRepository for PgCategoryRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Category>> {
        let result = sqlx::query_as::<_, CategoryModel>(
            r"SELECT id, name, position FROM categories WHERE id = $1",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Category::from))
    }

    #[instrument(skip(self))]
    async fn create(&self, category: &Category) -> RepoResult<()> {
        sqlx::query(r"INSERT INTO categories (id, name, position) VALUES ($1, $2, $3)")
            .bind(category.id.into_inner())
            .bind(&category.name)
            .bind(category.position)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn list(&self) -> RepoResult<Vec<Category>> {
        let results = sqlx::query_as::<_, CategoryModel>(
            r"SELECT id, name, position FROM categories ORDER BY position, id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Category::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PgChannelRepository>();
        assert_send_sync::<PgCategoryRepository>();
    }
}
