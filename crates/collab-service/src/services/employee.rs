//! Directory queries exposed to clients

use tracing::instrument;

use crate::dto::EmployeeResponse;

use super::context::ServiceContext;
use super::error::ServiceResult;

pub struct DirectoryQueryService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> DirectoryQueryService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Everyone in the organization, ordered by name
    #[instrument(skip(self))]
    pub async fn list_employees(&self) -> ServiceResult<Vec<EmployeeResponse>> {
        let mut employees = self.ctx.directory().list_employees().await?;
        employees.sort_by_cached_key(|e| (e.name.to_lowercase(), e.id));
        Ok(employees.iter().map(EmployeeResponse::from).collect())
    }
}
