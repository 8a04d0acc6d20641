//! File upload handler
//!
//! The request body is the raw file; the name comes from the query string and
//! the MIME type from `Content-Type`.

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{header, HeaderMap},
    Json,
};
use collab_core::FileRef;
use collab_service::FileService;
use serde::Deserialize;

use crate::extractors::AuthUser;
use crate::response::{ApiError, ApiResult, Created};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UploadParams {
    pub name: String,
}

/// Store a file and return the reference to attach to a message
///
/// POST /files?name=report.pdf
pub async fn upload_file(
    State(state): State<AppState>,
    auth: AuthUser,
    params: Result<Query<UploadParams>, axum::extract::rejection::QueryRejection>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Created<Json<FileRef>>> {
    let Query(params) = params.map_err(|e| ApiError::invalid_query(e.body_text()))?;
    let mime = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    let service = FileService::new(state.service_context());
    let file = service
        .upload(&auth.principal, body.to_vec(), &params.name, mime)
        .await?;
    Ok(Created(Json(file)))
}
