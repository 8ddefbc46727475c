//! Leave balance ledger.
//!
//! This module implements the leave balance subsystem:
//! - Per-employee casual/sick/loss-of-pay balances
//! - Pure adjustment validation (caps, granularity, sign rules)
//! - Monthly accrual engine with idempotent batch processing
//! - LOP to casual conversion
//! - Manual HR adjustments and consumption debits
//! - Append-only audit trail contract
//! - Domain types and error taxonomy

pub mod directory;
pub mod error;
pub mod policy;
pub mod service;
pub mod store;
pub mod types;
pub mod validator;

#[cfg(test)]
pub(crate) mod testing;

#[cfg(test)]
mod service_props;

pub use directory::EmployeeDirectory;
pub use error::{LedgerError, LedgerOperation};
pub use service::LeaveLedger;
pub use store::{BalanceMutation, BalanceStore, FieldChange, StoreError, StoredBalance};
pub use types::{
    AccrualPeriod, AccrualSummary, Actor, ActorRole, AdjustmentReason, AuditEntry,
    BalanceSnapshot, LeaveType, OperationKind,
};
pub use validator::validate_adjustment;
