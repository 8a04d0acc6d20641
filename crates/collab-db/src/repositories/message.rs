//! PostgreSQL implementation of MessageRepository

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use tracing::instrument;

use collab_core::entities::{Message, RootMessage};
use collab_core::traits::{MessageQuery, MessageRepository, RepoResult, SearchQuery};
use collab_core::value_objects::Snowflake;

use crate::mappers::{ids, MessageInsert};
use crate::models::{MessageModel, RootMessageModel};

use super::error::{map_db_error, message_not_found};

/// Message columns plus the aggregated mention ids, optionally followed by
/// extra select expressions.
macro_rules! select_messages {
    ($($extra:literal)?) => {
        concat!(
            r"
            SELECT m.id, m.channel_id, m.sender_id, m.content, m.content_type, m.created_at,
                   m.edited_at, m.parent_id, m.attachments, m.is_pinned, m.deleted_at,
                   m.idempotency_key,
                   ARRAY(SELECT mm.user_id FROM message_mentions mm
                         WHERE mm.message_id = m.id ORDER BY mm.user_id) AS mentions",
            $(", ", $extra,)?
            r"
            FROM messages m
            "
        )
    };
}

/// `%term%` with LIKE wildcards in the term escaped
fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

async fn insert_mentions(
    conn: &mut PgConnection,
    message_id: i64,
    mentions: &[i64],
) -> Result<(), sqlx::Error> {
    if mentions.is_empty() {
        return Ok(());
    }
    sqlx::query(
        r"
        INSERT INTO message_mentions (message_id, user_id, channel_id, created_at)
        SELECT m.id, u.user_id, m.channel_id, m.created_at
        FROM messages m
        CROSS JOIN UNNEST($2::BIGINT[]) AS u(user_id)
        WHERE m.id = $1
        ON CONFLICT DO NOTHING
        ",
    )
    .bind(message_id)
    .bind(mentions)
    .execute(conn)
    .await?;
    Ok(())
}

/// PostgreSQL implementation of MessageRepository
#[derive(Clone)]
pub struct PgMessageRepository {
    pool: PgPool,
}

impl PgMessageRepository {
    /// Create a new PgMessageRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_by_idempotency_key(
        &self,
        channel_id: Snowflake,
        sender_id: Snowflake,
        key: &str,
    ) -> RepoResult<Option<Message>> {
        let result = sqlx::query_as::<_, MessageModel>(concat!(
            select_messages!(),
            "WHERE m.channel_id = $1 AND m.sender_id = $2 AND m.idempotency_key = $3"
        ))
        .bind(channel_id.into_inner())
        .bind(sender_id.into_inner())
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Message::from))
    }
}

#[async_trait]
impl MessageRepository for PgMessageRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Message>> {
        let result = sqlx::query_as::<_, MessageModel>(concat!(select_messages!(), "WHERE m.id = $1"))
            .bind(id.into_inner())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.map(Message::from))
    }

    #[instrument(skip(self, message), fields(message_id = %message.id, channel_id = %message.channel_id))]
    async fn insert(&self, message: &Message) -> RepoResult<Message> {
        let insert = MessageInsert::new(message);
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let inserted = sqlx::query(
            r"
            INSERT INTO messages (id, channel_id, sender_id, content, content_type, created_at,
                                  parent_id, attachments, idempotency_key)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (channel_id, sender_id, idempotency_key)
                WHERE idempotency_key IS NOT NULL
                DO NOTHING
            ",
        )
        .bind(insert.id)
        .bind(insert.channel_id)
        .bind(insert.sender_id)
        .bind(insert.content)
        .bind(insert.content_type)
        .bind(message.created_at)
        .bind(insert.parent_id)
        .bind(insert.attachments)
        .bind(insert.idempotency_key)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?
        .rows_affected();

        if inserted == 0 {
            tx.rollback().await.map_err(map_db_error)?;
            let key = insert.idempotency_key.unwrap_or_default();
            return self
                .find_by_idempotency_key(message.channel_id, message.sender_id, key)
                .await?
                .ok_or_else(|| message_not_found(message.id));
        }

        insert_mentions(&mut tx, insert.id, &insert.mentions)
            .await
            .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;
        Ok(message.clone())
    }

    #[instrument(skip(self, content, mentions))]
    async fn update_content(
        &self,
        id: Snowflake,
        content: &str,
        mentions: &BTreeSet<Snowflake>,
        edited_at: DateTime<Utc>,
    ) -> RepoResult<()> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let result = sqlx::query(
            r"
            UPDATE messages
            SET content = $2, edited_at = $3
            WHERE id = $1 AND deleted_at IS NULL
            ",
        )
        .bind(id.into_inner())
        .bind(content)
        .bind(edited_at)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(message_not_found(id));
        }

        sqlx::query(r"DELETE FROM message_mentions WHERE message_id = $1")
            .bind(id.into_inner())
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

        insert_mentions(&mut tx, id.into_inner(), &ids(mentions))
            .await
            .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn soft_delete(&self, id: Snowflake) -> RepoResult<bool> {
        let result = sqlx::query(
            r"
            UPDATE messages
            SET deleted_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            ",
        )
        .bind(id.into_inner())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn set_pinned(&self, id: Snowflake, pinned: bool) -> RepoResult<()> {
        let result = sqlx::query(
            r"UPDATE messages SET is_pinned = $2 WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id.into_inner())
        .bind(pinned)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(message_not_found(id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_roots(
        &self,
        channel_id: Snowflake,
        query: MessageQuery,
    ) -> RepoResult<Vec<RootMessage>> {
        let limit = query.limit.clamp(1, 100);

        let results = match (query.before, query.after) {
            (None, Some(after)) => {
                // Scrolling down: oldest first after the cursor
                sqlx::query_as::<_, RootMessageModel>(concat!(
                    select_messages!(
                        "(SELECT COUNT(*) FROM messages r WHERE r.parent_id = m.id AND r.deleted_at IS NULL) AS reply_count"
                    ),
                    r"
                    WHERE m.channel_id = $1 AND m.parent_id IS NULL AND m.deleted_at IS NULL
                      AND (m.created_at, m.id) > (SELECT created_at, id FROM messages WHERE id = $2)
                    ORDER BY m.created_at ASC, m.id ASC
                    LIMIT $3
                    "
                ))
                .bind(channel_id.into_inner())
                .bind(after.into_inner())
                .bind(limit)
                .fetch_all(&self.pool)
                .await
            }
            (before, _) => {
                // Latest page, or the page just before the cursor
                let mut rows = sqlx::query_as::<_, RootMessageModel>(concat!(
                    select_messages!(
                        "(SELECT COUNT(*) FROM messages r WHERE r.parent_id = m.id AND r.deleted_at IS NULL) AS reply_count"
                    ),
                    r"
                    WHERE m.channel_id = $1 AND m.parent_id IS NULL AND m.deleted_at IS NULL
                      AND ($2::BIGINT IS NULL
                           OR (m.created_at, m.id) < (SELECT created_at, id FROM messages WHERE id = $2))
                    ORDER BY m.created_at DESC, m.id DESC
                    LIMIT $3
                    "
                ))
                .bind(channel_id.into_inner())
                .bind(before.map(Snowflake::into_inner))
                .bind(limit)
                .fetch_all(&self.pool)
                .await;
                if let Ok(rows) = rows.as_mut() {
                    rows.reverse();
                }
                rows
            }
        }
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(RootMessage::from).collect())
    }

    #[instrument(skip(self))]
    async fn find_replies(&self, parent_id: Snowflake) -> RepoResult<Vec<Message>> {
        let results = sqlx::query_as::<_, MessageModel>(concat!(
            select_messages!(),
            r"
            WHERE m.parent_id = $1 AND m.deleted_at IS NULL
            ORDER BY m.created_at, m.id
            "
        ))
        .bind(parent_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Message::from).collect())
    }

    #[instrument(skip(self))]
    async fn find_pinned(&self, channel_id: Snowflake) -> RepoResult<Vec<Message>> {
        let results = sqlx::query_as::<_, MessageModel>(concat!(
            select_messages!(),
            r"
            WHERE m.channel_id = $1 AND m.is_pinned AND m.deleted_at IS NULL
            ORDER BY m.created_at, m.id
            "
        ))
        .bind(channel_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Message::from).collect())
    }

    #[instrument(skip(self, query), fields(channels = query.channel_ids.len()))]
    async fn search(&self, query: &SearchQuery) -> RepoResult<Vec<Message>> {
        if query.channel_ids.is_empty() {
            return Ok(Vec::new());
        }

        let patterns: Vec<String> = query.terms().iter().map(|t| like_pattern(t)).collect();
        let phrase = query.phrase().map(|p| like_pattern(&p));
        let filters = &query.filters;

        let results = sqlx::query_as::<_, MessageModel>(concat!(
            select_messages!(),
            r"
            WHERE m.channel_id = ANY($1)
              AND m.deleted_at IS NULL
              AND lower(m.content) LIKE ALL($2)
              AND ($3::BIGINT IS NULL OR m.sender_id = $3)
              AND ($4::TIMESTAMPTZ IS NULL OR m.created_at >= $4)
              AND ($5::TIMESTAMPTZ IS NULL OR m.created_at <= $5)
              AND ($6::BOOLEAN IS NULL OR (jsonb_array_length(m.attachments) > 0) = $6)
              AND ($7::BOOLEAN IS NULL OR m.is_pinned = $7)
              AND ($8::BIGINT IS NULL OR m.channel_id = $8)
              AND ($9::TEXT IS NULL
                   OR ($9 = 'file' AND jsonb_array_length(m.attachments) > 0)
                   OR ($9 = 'poll' AND EXISTS (SELECT 1 FROM polls p WHERE p.message_id = m.id))
                   OR ($9 = 'message' AND jsonb_array_length(m.attachments) = 0
                       AND NOT EXISTS (SELECT 1 FROM polls p WHERE p.message_id = m.id)))
            ORDER BY ($10::TEXT IS NOT NULL AND lower(m.content) LIKE $10) DESC,
                     m.created_at DESC, m.id DESC
            LIMIT $11
            "
        ))
        .bind(ids(&query.channel_ids))
        .bind(patterns)
        .bind(filters.sender_id.map(Snowflake::into_inner))
        .bind(filters.date_from)
        .bind(filters.date_to)
        .bind(filters.has_attachments)
        .bind(filters.is_pinned)
        .bind(filters.channel_id.map(Snowflake::into_inner))
        .bind(filters.item_type.map(|t| t.as_str()))
        .bind(phrase)
        .bind(query.limit.clamp(1, 100))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Message::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PgMessageRepository>();
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("deploy"), "%deploy%");
        assert_eq!(like_pattern("100%"), "%100\\%%");
        assert_eq!(like_pattern("a_b"), "%a\\_b%");
    }

    #[test]
    fn test_select_includes_extra_columns() {
        let sql = select_messages!("1 AS one");
        assert!(sql.contains("AS mentions, 1 AS one"));
        assert!(sql.contains("FROM messages m"));
    }
}
