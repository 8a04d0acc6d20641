//! Reaction handlers

use axum::{extract::State, Json};
use collab_core::Snowflake;
use collab_service::{
    ReactionResponse, ReactionService, ToggleReactionRequest, ToggleReactionResponse,
};

use crate::extractors::{AuthUser, IdPath, ValidatedJson};
use crate::response::ApiResult;
use crate::state::AppState;

/// Reactions grouped by emoji
///
/// GET /messages/{message_id}/reactions
pub async fn list_reactions(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(message_id): IdPath<Snowflake>,
) -> ApiResult<Json<Vec<ReactionResponse>>> {
    let service = ReactionService::new(state.service_context());
    Ok(Json(service.list_reactions(&auth.principal, message_id).await?))
}

/// Add the reaction, or remove it when the caller already has it
///
/// POST /messages/{message_id}/reactions
pub async fn toggle_reaction(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(message_id): IdPath<Snowflake>,
    ValidatedJson(request): ValidatedJson<ToggleReactionRequest>,
) -> ApiResult<Json<ToggleReactionResponse>> {
    let service = ReactionService::new(state.service_context());
    let result = service
        .toggle_reaction(&auth.principal, message_id, request)
        .await?;
    Ok(Json(result))
}
