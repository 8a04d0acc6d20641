//! Directory service backed by the `employees` table

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use collab_core::entities::Employee;
use collab_core::traits::{DirectoryService, RepoResult};
use collab_core::value_objects::Snowflake;

use crate::models::EmployeeModel;

use super::error::map_db_error;

#[derive(Clone)]
pub struct PgDirectoryService {
    pool: PgPool,
}

impl PgDirectoryService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DirectoryService for PgDirectoryService {
    #[instrument(skip(self))]
    async fn list_employees(&self) -> RepoResult<Vec<Employee>> {
        let results = sqlx::query_as::<_, EmployeeModel>(
            r"SELECT id, name FROM employees WHERE active ORDER BY name, id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Employee::from).collect())
    }

    #[instrument(skip(self))]
    async fn find_employee(&self, id: Snowflake) -> RepoResult<Option<Employee>> {
        let result = sqlx::query_as::<_, EmployeeModel>(
            r"SELECT id, name FROM employees WHERE id = $1 AND active",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Employee::from))
    }
}
