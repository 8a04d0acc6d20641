//! Presence handlers

use axum::{extract::State, Json};
use collab_core::Snowflake;
use collab_service::{
    PresenceQueryRequest, PresenceResponse, PresenceService, UpdatePresenceRequest,
};

use crate::extractors::{AuthUser, IdPath, ValidatedJson};
use crate::response::ApiResult;
use crate::state::AppState;

/// Set the caller's own status
///
/// PUT /presence
pub async fn set_presence(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<UpdatePresenceRequest>,
) -> ApiResult<Json<PresenceResponse>> {
    let service = PresenceService::new(state.service_context());
    Ok(Json(service.set_presence(&auth.principal, request).await?))
}

/// GET /presence/{user_id}
pub async fn get_presence(
    State(state): State<AppState>,
    _auth: AuthUser,
    IdPath(user_id): IdPath<Snowflake>,
) -> ApiResult<Json<PresenceResponse>> {
    let service = PresenceService::new(state.service_context());
    Ok(Json(service.get_presence(user_id).await?))
}

/// Bulk lookup; unknown users read as offline
///
/// POST /presences
pub async fn query_presences(
    State(state): State<AppState>,
    _auth: AuthUser,
    ValidatedJson(request): ValidatedJson<PresenceQueryRequest>,
) -> ApiResult<Json<Vec<PresenceResponse>>> {
    let service = PresenceService::new(state.service_context());
    Ok(Json(service.get_presences(request).await?))
}
