//! Employee directory handler

use axum::{extract::State, Json};
use collab_service::{DirectoryQueryService, EmployeeResponse};

use crate::extractors::AuthUser;
use crate::response::ApiResult;
use crate::state::AppState;

/// GET /employees
pub async fn list_employees(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> ApiResult<Json<Vec<EmployeeResponse>>> {
    let service = DirectoryQueryService::new(state.service_context());
    Ok(Json(service.list_employees().await?))
}
