//! Quick reply handlers

use axum::{extract::State, Json};
use collab_core::Snowflake;
use collab_service::{CreateQuickReplyRequest, QuickReplyResponse, QuickReplyService};

use crate::extractors::{AuthUser, IdPath, ValidatedJson};
use crate::response::{ApiResult, Created, NoContent};
use crate::state::AppState;

/// GET /quick-replies
pub async fn list_quick_replies(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<QuickReplyResponse>>> {
    let service = QuickReplyService::new(state.service_context());
    Ok(Json(service.list_quick_replies(&auth.principal).await?))
}

/// POST /quick-replies
pub async fn create_quick_reply(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<CreateQuickReplyRequest>,
) -> ApiResult<Created<Json<QuickReplyResponse>>> {
    let service = QuickReplyService::new(state.service_context());
    let reply = service.create_quick_reply(&auth.principal, request).await?;
    Ok(Created(Json(reply)))
}

/// DELETE /quick-replies/{id}
pub async fn delete_quick_reply(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath<Snowflake>,
) -> ApiResult<NoContent> {
    let service = QuickReplyService::new(state.service_context());
    service.delete_quick_reply(&auth.principal, id).await?;
    Ok(NoContent)
}
