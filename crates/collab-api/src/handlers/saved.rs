//! Saved item handlers

use axum::{extract::State, Json};
use collab_core::Snowflake;
use collab_service::{SaveItemRequest, SavedItemResponse, SavedItemService};

use crate::extractors::{AuthUser, IdPath, ValidatedJson};
use crate::response::{ApiResult, Created, NoContent};
use crate::state::AppState;

/// Bookmarks whose targets the caller can still read, newest first
///
/// GET /saved
pub async fn list_saved_items(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<SavedItemResponse>>> {
    let service = SavedItemService::new(state.service_context());
    Ok(Json(service.list_saved_items(&auth.principal).await?))
}

/// POST /saved
pub async fn save_item(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<SaveItemRequest>,
) -> ApiResult<Created<Json<SavedItemResponse>>> {
    let service = SavedItemService::new(state.service_context());
    Ok(Created(Json(service.save_item(&auth.principal, request).await?)))
}

/// DELETE /saved/{saved_id}
pub async fn unsave_item(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(saved_id): IdPath<Snowflake>,
) -> ApiResult<NoContent> {
    let service = SavedItemService::new(state.service_context());
    service.unsave_item(&auth.principal, saved_id).await?;
    Ok(NoContent)
}
