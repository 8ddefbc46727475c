//! Balance store contract.
//!
//! The ledger service reaches durable storage only through this trait, so
//! tests can substitute an in-memory store and the database layer stays
//! swappable. The store owns atomicity: balance update, audit append, and
//! accrual marker all commit or roll back together.

use async_trait::async_trait;
use rust_decimal::Decimal;
use staffline_shared::types::EmployeeId;
use thiserror::Error;

use super::types::{AccrualPeriod, AdjustmentReason, AuditEntry, LeaveType};

/// Errors surfaced by a [`BalanceStore`] implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The optimistic version check failed; the caller should re-read and
    /// retry.
    #[error("balance row version conflict")]
    Conflict,

    /// The accrual marker for this employee and period already exists.
    #[error("accrual already recorded for this period")]
    AlreadyRecorded,

    /// The store could not be reached or the transaction failed.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Durable balance row as read from the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoredBalance {
    /// Employee key.
    pub employee_id: EmployeeId,
    /// Casual leave balance.
    pub casual: Decimal,
    /// Sick leave balance.
    pub sick: Decimal,
    /// Loss-of-pay balance.
    pub lop: Decimal,
    /// Optimistic concurrency counter, starting at 1 for a fresh row.
    pub version: i64,
}

/// One field-level change inside a mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldChange {
    /// Which leave type changes.
    pub field: LeaveType,
    /// Signed delta applied.
    pub delta: Decimal,
    /// Balance for `field` after the change. The store persists this value
    /// and records it in the audit row.
    pub resulting_balance: Decimal,
}

/// An atomic mutation of one employee's balance row.
///
/// All parts (field updates, audit rows, optional accrual marker) are
/// committed in a single transaction.
#[derive(Debug, Clone)]
pub struct BalanceMutation {
    /// Employee whose row is mutated.
    pub employee_id: EmployeeId,
    /// Version observed when the caller read the row; `0` means the row did
    /// not exist and must be created.
    pub expected_version: i64,
    /// Field-level changes. May be empty for a marker-only mutation.
    pub changes: Vec<FieldChange>,
    /// Actor recorded in `updated_by` and the audit rows.
    pub actor_id: EmployeeId,
    /// Reason recorded in the audit rows.
    pub reason: AdjustmentReason,
    /// Idempotence marker inserted with the mutation, if this is an accrual.
    pub accrual_marker: Option<AccrualPeriod>,
}

/// Durable, transactional store for leave balances and their audit trail.
#[async_trait]
pub trait BalanceStore: Send + Sync {
    /// Reads the balance row for an employee, if it exists.
    async fn fetch(&self, employee_id: EmployeeId) -> Result<Option<StoredBalance>, StoreError>;

    /// Applies a mutation atomically.
    ///
    /// Implementations must:
    /// - create the row (with the mutation applied) when
    ///   `expected_version == 0`, failing with [`StoreError::Conflict`] if a
    ///   concurrent creator won;
    /// - otherwise update only when the stored version still equals
    ///   `expected_version`, failing with [`StoreError::Conflict`] on a
    ///   stale read;
    /// - append one audit row per [`FieldChange`];
    /// - insert the accrual marker when present, failing with
    ///   [`StoreError::AlreadyRecorded`] if it already exists;
    /// - roll everything back if any part fails.
    async fn apply(&self, mutation: BalanceMutation) -> Result<(), StoreError>;

    /// Returns true if an accrual marker exists for the employee and period.
    async fn accrual_recorded(
        &self,
        employee_id: EmployeeId,
        period: AccrualPeriod,
    ) -> Result<bool, StoreError>;

    /// Reads the audit trail for an employee, newest first.
    async fn audit_trail(
        &self,
        employee_id: EmployeeId,
        limit: Option<u64>,
    ) -> Result<Vec<AuditEntry>, StoreError>;
}
