//! Directory mirror model

use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct EmployeeModel {
    pub id: i64,
    pub name: String,
}
