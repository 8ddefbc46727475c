//! Employee directory port.
//!
//! The roster is owned by the user-management subsystem; the ledger only
//! reads it to resolve eligibility and the accrual roster.

use async_trait::async_trait;
use staffline_shared::types::EmployeeId;

use super::store::StoreError;

/// Read-only view of the employee roster.
#[async_trait]
pub trait EmployeeDirectory: Send + Sync {
    /// Returns the ids of all active employees.
    async fn active_employees(&self) -> Result<Vec<EmployeeId>, StoreError>;

    /// Returns true if the employee exists and is active. Unknown employees
    /// are reported inactive.
    async fn is_active(&self, employee_id: EmployeeId) -> Result<bool, StoreError>;
}
