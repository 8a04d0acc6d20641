//! Search service
//!
//! Queries run over the channels the caller belongs to; filters only ever
//! narrow that set.

use collab_core::{Principal, SearchFilters, SearchQuery};
use tracing::{debug, instrument};
use validator::Validate;

use crate::dto::{MessageResponse, SearchRequest};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

pub const DEFAULT_SEARCH_LIMIT: i64 = 50;
pub const MAX_SEARCH_LIMIT: i64 = 100;

/// Search service
pub struct SearchService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> SearchService<'a> {
    /// Create a new SearchService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Phrase matches first, newest first within each group
    #[instrument(skip(self, actor, request), fields(user_id = %actor.user_id))]
    pub async fn search(
        &self,
        actor: &Principal,
        request: SearchRequest,
    ) -> ServiceResult<Vec<MessageResponse>> {
        request.validate()?;
        if let (Some(from), Some(to)) = (request.date_from, request.date_to) {
            if from > to {
                return Err(ServiceError::validation("date_from must not be after date_to"));
            }
        }

        let mut channel_ids = self
            .ctx
            .member_repo()
            .channel_ids_for_user(actor.user_id)
            .await?;
        if let Some(channel_id) = request.channel_id {
            channel_ids.retain(|id| *id == channel_id);
        }
        if channel_ids.is_empty() {
            debug!("No channels in scope");
            return Ok(Vec::new());
        }

        let query = SearchQuery {
            channel_ids,
            text: request.q.filter(|q| !q.trim().is_empty()),
            filters: SearchFilters {
                item_type: request.item_type,
                sender_id: request.sender_id,
                date_from: request.date_from,
                date_to: request.date_to,
                has_attachments: request.has_attachments,
                is_pinned: request.is_pinned,
                channel_id: request.channel_id,
            },
            limit: request
                .limit
                .unwrap_or(DEFAULT_SEARCH_LIMIT)
                .clamp(1, MAX_SEARCH_LIMIT),
        };

        let hits = self.ctx.message_repo().search(&query).await?;
        debug!(hits = hits.len(), "Search finished");

        Ok(hits.into_iter().map(MessageResponse::from).collect())
    }
}
