//! Search handler

use axum::extract::{Query, State};
use axum::Json;
use collab_service::{MessageResponse, SearchRequest, SearchService};

use crate::extractors::AuthUser;
use crate::response::{ApiError, ApiResult};
use crate::state::AppState;

/// Messages in the caller's channels matching the query and filters
///
/// GET /search?q=..&type=..&sender_id=..&date_from=..&date_to=..&channel_id=..
pub async fn search(
    State(state): State<AppState>,
    auth: AuthUser,
    query: Result<Query<SearchRequest>, axum::extract::rejection::QueryRejection>,
) -> ApiResult<Json<Vec<MessageResponse>>> {
    let Query(request) = query.map_err(|e| ApiError::invalid_query(e.body_text()))?;
    let service = SearchService::new(state.service_context());
    Ok(Json(service.search(&auth.principal, request).await?))
}
