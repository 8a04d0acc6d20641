//! Read marker and mention handlers

use axum::{extract::State, Json};
use collab_core::Snowflake;
use collab_service::{
    MarkReadRequest, MentionResponse, ReadMarkerResponse, ReadStateService, UnreadCountResponse,
};

use crate::extractors::{AuthUser, IdPath, ValidatedJson};
use crate::response::ApiResult;
use crate::state::AppState;

/// Move the caller's marker forward, to now by default
///
/// POST /channels/{channel_id}/read
pub async fn mark_read(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(channel_id): IdPath<Snowflake>,
    ValidatedJson(request): ValidatedJson<MarkReadRequest>,
) -> ApiResult<Json<ReadMarkerResponse>> {
    let service = ReadStateService::new(state.service_context());
    let marker = service
        .mark_read(&auth.principal, channel_id, request)
        .await?;
    Ok(Json(marker))
}

/// POST /messages/{message_id}/read
pub async fn mark_read_up_to(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(message_id): IdPath<Snowflake>,
) -> ApiResult<Json<ReadMarkerResponse>> {
    let service = ReadStateService::new(state.service_context());
    Ok(Json(
        service.mark_read_up_to(&auth.principal, message_id).await?,
    ))
}

/// GET /channels/{channel_id}/unread
pub async fn unread_count(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(channel_id): IdPath<Snowflake>,
) -> ApiResult<Json<UnreadCountResponse>> {
    let service = ReadStateService::new(state.service_context());
    Ok(Json(service.unread_count(&auth.principal, channel_id).await?))
}

/// Mentions of the caller not yet read, oldest first
///
/// GET /mentions
pub async fn pending_mentions(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<MentionResponse>>> {
    let service = ReadStateService::new(state.service_context());
    Ok(Json(service.pending_mentions(&auth.principal).await?))
}
