//! Channel and category handlers

use axum::{extract::State, Json};
use collab_core::Snowflake;
use collab_service::{
    CategoryResponse, ChannelResponse, ChannelService, ChannelSummaryResponse,
    CreateCategoryRequest, CreateChannelRequest, UpdateChannelRequest,
};

use crate::extractors::{AuthUser, IdPath, ValidatedJson};
use crate::response::{ApiResult, Created};
use crate::state::AppState;

/// Channels the caller belongs to, with unread and mention badges
///
/// GET /channels
pub async fn list_channels(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<ChannelSummaryResponse>>> {
    let service = ChannelService::new(state.service_context());
    Ok(Json(service.list_channels(&auth.principal).await?))
}

/// Create a public or private channel
///
/// POST /channels
pub async fn create_channel(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<CreateChannelRequest>,
) -> ApiResult<Created<Json<ChannelResponse>>> {
    let service = ChannelService::new(state.service_context());
    let channel = service.create_channel(&auth.principal, request).await?;
    Ok(Created(Json(channel)))
}

/// Browse joinable channels
///
/// GET /public-channels
pub async fn list_public_channels(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> ApiResult<Json<Vec<ChannelResponse>>> {
    let service = ChannelService::new(state.service_context());
    Ok(Json(service.list_public_channels().await?))
}

/// GET /channels/{channel_id}
pub async fn get_channel(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(channel_id): IdPath<Snowflake>,
) -> ApiResult<Json<ChannelResponse>> {
    let service = ChannelService::new(state.service_context());
    Ok(Json(service.get_channel(&auth.principal, channel_id).await?))
}

/// PATCH /channels/{channel_id}
pub async fn update_channel(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(channel_id): IdPath<Snowflake>,
    ValidatedJson(request): ValidatedJson<UpdateChannelRequest>,
) -> ApiResult<Json<ChannelResponse>> {
    let service = ChannelService::new(state.service_context());
    let channel = service
        .update_channel(&auth.principal, channel_id, request)
        .await?;
    Ok(Json(channel))
}

/// Archive a channel; it stays readable
///
/// POST /channels/{channel_id}/archive
pub async fn archive_channel(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(channel_id): IdPath<Snowflake>,
) -> ApiResult<Json<ChannelResponse>> {
    let service = ChannelService::new(state.service_context());
    Ok(Json(service.archive_channel(&auth.principal, channel_id).await?))
}

/// GET /categories
pub async fn list_categories(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> ApiResult<Json<Vec<CategoryResponse>>> {
    let service = ChannelService::new(state.service_context());
    Ok(Json(service.list_categories().await?))
}

/// POST /categories
pub async fn create_category(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<CreateCategoryRequest>,
) -> ApiResult<Created<Json<CategoryResponse>>> {
    let service = ChannelService::new(state.service_context());
    let category = service.create_category(&auth.principal, request).await?;
    Ok(Created(Json(category)))
}
