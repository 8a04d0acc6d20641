//! Poll handlers

use axum::{extract::State, Json};
use collab_core::Snowflake;
use collab_service::{CreatePollRequest, PollResponse, PollService, VoteRequest};

use crate::extractors::{AuthUser, IdPath, ValidatedJson};
use crate::response::{ApiResult, Created};
use crate::state::AppState;

/// Attach a poll to a message the caller sent
///
/// POST /messages/{message_id}/poll
pub async fn create_poll(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(message_id): IdPath<Snowflake>,
    ValidatedJson(request): ValidatedJson<CreatePollRequest>,
) -> ApiResult<Created<Json<PollResponse>>> {
    let service = PollService::new(state.service_context());
    let poll = service
        .create_poll(&auth.principal, message_id, request)
        .await?;
    Ok(Created(Json(poll)))
}

/// GET /messages/{message_id}/poll
pub async fn get_message_poll(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(message_id): IdPath<Snowflake>,
) -> ApiResult<Json<PollResponse>> {
    let service = PollService::new(state.service_context());
    Ok(Json(
        service
            .get_poll_by_message(&auth.principal, message_id)
            .await?,
    ))
}

/// GET /polls/{poll_id}
pub async fn get_poll(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(poll_id): IdPath<Snowflake>,
) -> ApiResult<Json<PollResponse>> {
    let service = PollService::new(state.service_context());
    Ok(Json(service.get_poll(&auth.principal, poll_id).await?))
}

/// Replace the caller's ballot; an empty ballot retracts it
///
/// PUT /polls/{poll_id}/votes
pub async fn vote(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(poll_id): IdPath<Snowflake>,
    ValidatedJson(request): ValidatedJson<VoteRequest>,
) -> ApiResult<Json<PollResponse>> {
    let service = PollService::new(state.service_context());
    Ok(Json(service.vote(&auth.principal, poll_id, request).await?))
}
