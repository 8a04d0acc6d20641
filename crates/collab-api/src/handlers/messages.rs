//! Message handlers
//!
//! Posting, editing and deleting messages, threads and pins.

use axum::{extract::State, Json};
use collab_core::Snowflake;
use collab_service::{
    CreateMessageRequest, MessageResponse, MessageService, SetPinnedRequest, ThreadResponse,
    UpdateMessageRequest,
};

use crate::extractors::{AuthUser, IdPath, Pagination, ValidatedJson};
use crate::response::{ApiResult, Created, NoContent};
use crate::state::AppState;

/// Thread roots in a channel with their reply counts
///
/// GET /channels/{channel_id}/messages
pub async fn list_messages(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(channel_id): IdPath<Snowflake>,
    pagination: Pagination,
) -> ApiResult<Json<Vec<MessageResponse>>> {
    let service = MessageService::new(state.service_context());
    let messages = service
        .list_messages(&auth.principal, channel_id, pagination.into())
        .await?;
    Ok(Json(messages))
}

/// Post a message or a thread reply (`parent_id`)
///
/// POST /channels/{channel_id}/messages
pub async fn post_message(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(channel_id): IdPath<Snowflake>,
    ValidatedJson(request): ValidatedJson<CreateMessageRequest>,
) -> ApiResult<Created<Json<MessageResponse>>> {
    let service = MessageService::new(state.service_context());
    let message = service
        .post_message(&auth.principal, channel_id, request)
        .await?;
    Ok(Created(Json(message)))
}

/// GET /messages/{message_id}
pub async fn get_message(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(message_id): IdPath<Snowflake>,
) -> ApiResult<Json<MessageResponse>> {
    let service = MessageService::new(state.service_context());
    Ok(Json(service.get_message(&auth.principal, message_id).await?))
}

/// Edit message content; sender only
///
/// PATCH /messages/{message_id}
pub async fn edit_message(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(message_id): IdPath<Snowflake>,
    ValidatedJson(request): ValidatedJson<UpdateMessageRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let service = MessageService::new(state.service_context());
    let message = service
        .edit_message(&auth.principal, message_id, request)
        .await?;
    Ok(Json(message))
}

/// Soft delete; sender or channel admin
///
/// DELETE /messages/{message_id}
pub async fn delete_message(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(message_id): IdPath<Snowflake>,
) -> ApiResult<NoContent> {
    let service = MessageService::new(state.service_context());
    service.delete_message(&auth.principal, message_id).await?;
    Ok(NoContent)
}

/// GET /messages/{message_id}/thread
pub async fn get_thread(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(message_id): IdPath<Snowflake>,
) -> ApiResult<Json<ThreadResponse>> {
    let service = MessageService::new(state.service_context());
    Ok(Json(service.fetch_thread(&auth.principal, message_id).await?))
}

/// GET /channels/{channel_id}/pins
pub async fn list_pinned(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(channel_id): IdPath<Snowflake>,
) -> ApiResult<Json<Vec<MessageResponse>>> {
    let service = MessageService::new(state.service_context());
    Ok(Json(service.list_pinned(&auth.principal, channel_id).await?))
}

/// PUT /messages/{message_id}/pin
pub async fn set_pinned(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(message_id): IdPath<Snowflake>,
    ValidatedJson(request): ValidatedJson<SetPinnedRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let service = MessageService::new(state.service_context());
    let message = service
        .set_pinned(&auth.principal, message_id, request.pinned)
        .await?;
    Ok(Json(message))
}
