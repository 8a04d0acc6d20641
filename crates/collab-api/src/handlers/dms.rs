//! Direct message handlers

use axum::{extract::State, Json};
use collab_service::{ChannelResponse, CreateDmRequest, DmService};

use crate::extractors::{AuthUser, ValidatedJson};
use crate::response::ApiResult;
use crate::state::AppState;

/// Open the DM with another user, creating it on first use
///
/// POST /dms
pub async fn open_dm(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<CreateDmRequest>,
) -> ApiResult<Json<ChannelResponse>> {
    let service = DmService::new(state.service_context());
    let channel = service
        .get_or_create_dm(&auth.principal, request.user_id)
        .await?;
    Ok(Json(channel))
}
