//! Postgres-backed employee directory.
//!
//! Read-only adapter over the employees mirror table; ownership of the
//! roster stays with the user-management subsystem.

use async_trait::async_trait;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QuerySelect};
use staffline_core::leave::directory::EmployeeDirectory;
use staffline_core::leave::store::StoreError;
use staffline_shared::types::EmployeeId;

use crate::entities::employees;

/// Postgres implementation of the employee directory port.
#[derive(Debug, Clone)]
pub struct SqlEmployeeDirectory {
    db: DatabaseConnection,
}

impl SqlEmployeeDirectory {
    /// Creates a directory over the given connection pool.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl EmployeeDirectory for SqlEmployeeDirectory {
    async fn active_employees(&self) -> Result<Vec<EmployeeId>, StoreError> {
        let ids: Vec<uuid::Uuid> = employees::Entity::find()
            .filter(employees::Column::IsActive.eq(true))
            .select_only()
            .column(employees::Column::Id)
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        Ok(ids.into_iter().map(EmployeeId::from_uuid).collect())
    }

    async fn is_active(&self, employee_id: EmployeeId) -> Result<bool, StoreError> {
        let employee = employees::Entity::find_by_id(employee_id.into_inner())
            .one(&self.db)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        Ok(employee.is_some_and(|e| e.is_active))
    }
}
