//! Channel membership handlers

use axum::{extract::State, Json};
use collab_core::Snowflake;
use collab_service::{AddMemberRequest, MemberResponse, MemberService};

use crate::extractors::{AuthUser, IdPath, ValidatedJson};
use crate::response::{ApiResult, Created, NoContent};
use crate::state::AppState;

/// Members with their presence
///
/// GET /channels/{channel_id}/members
pub async fn list_members(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(channel_id): IdPath<Snowflake>,
) -> ApiResult<Json<Vec<MemberResponse>>> {
    let service = MemberService::new(state.service_context());
    Ok(Json(service.list_members(&auth.principal, channel_id).await?))
}

/// Add someone else; channel admins only
///
/// POST /channels/{channel_id}/members
pub async fn add_member(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(channel_id): IdPath<Snowflake>,
    ValidatedJson(request): ValidatedJson<AddMemberRequest>,
) -> ApiResult<Created<Json<MemberResponse>>> {
    let service = MemberService::new(state.service_context());
    let member = service
        .add_member(&auth.principal, channel_id, request.user_id)
        .await?;
    Ok(Created(Json(member)))
}

/// POST /channels/{channel_id}/join
pub async fn join_channel(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(channel_id): IdPath<Snowflake>,
) -> ApiResult<Created<Json<MemberResponse>>> {
    let service = MemberService::new(state.service_context());
    let member = service.join_channel(&auth.principal, channel_id).await?;
    Ok(Created(Json(member)))
}

/// POST /channels/{channel_id}/leave
pub async fn leave_channel(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(channel_id): IdPath<Snowflake>,
) -> ApiResult<NoContent> {
    let service = MemberService::new(state.service_context());
    service.leave_channel(&auth.principal, channel_id).await?;
    Ok(NoContent)
}
