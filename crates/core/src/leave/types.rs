//! Leave ledger domain types.
//!
//! This module defines the types used for reading and mutating leave
//! balances: leave categories, actor identity, adjustment reasons, balance
//! snapshots, and accrual batch bookkeeping.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use staffline_shared::types::{AuditEntryId, EmployeeId};

/// Leave categories tracked by the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeaveType {
    /// Casual leave. Capped, never negative.
    Casual,
    /// Sick leave. Capped, never negative.
    Sick,
    /// Loss-of-pay leave. Uncapped, explicitly allowed to go negative.
    Lop,
}

impl LeaveType {
    /// Returns true if this category is subject to the balance cap and the
    /// non-negative rule.
    #[must_use]
    pub fn is_capped(self) -> bool {
        matches!(self, Self::Casual | Self::Sick)
    }
}

impl std::fmt::Display for LeaveType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Casual => "casual",
            Self::Sick => "sick",
            Self::Lop => "lop",
        };
        write!(f, "{s}")
    }
}

/// The kind of mutation being validated.
///
/// The validator applies different sign and bound rules per kind; see
/// [`crate::leave::validator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    /// Positive credit (accrual or HR "Add Leaves").
    Credit,
    /// HR-issued debit correcting an over-credit.
    ManualDebit,
    /// Credit side of a LOP to casual conversion.
    Conversion,
    /// Debit applied when an approved leave request settles.
    Consumption,
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Credit => "credit",
            Self::ManualDebit => "manual_debit",
            Self::Conversion => "conversion",
            Self::Consumption => "consumption",
        };
        write!(f, "{s}")
    }
}

/// Why a balance changed, as recorded in the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentReason {
    /// Monthly accrual credit.
    Accrual,
    /// Ad-hoc HR adjustment.
    ManualAdjustment,
    /// LOP to casual conversion.
    Conversion,
    /// Deduction for an approved leave request.
    Consumption,
}

/// Role of the actor performing a mutation.
///
/// Role resolution itself is an external collaborator concern (the
/// user-management subsystem); the ledger only enforces which roles may
/// touch which leave types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorRole {
    /// Regular employee. May not mutate balances directly.
    Employee,
    /// HR staff. May adjust casual and sick balances and run conversions.
    Hr,
    /// Super admin. May additionally adjust LOP balances.
    SuperAdmin,
    /// Internal system identity (scheduled jobs, approval workflow).
    System,
}

/// An authenticated actor performing a ledger operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// Employee id of the HR/admin/system actor.
    pub id: EmployeeId,
    /// Resolved role, supplied by the caller.
    pub role: ActorRole,
}

impl Actor {
    /// Creates an actor.
    #[must_use]
    pub const fn new(id: EmployeeId, role: ActorRole) -> Self {
        Self { id, role }
    }

    /// The well-known system actor used by scheduled jobs.
    #[must_use]
    pub const fn system() -> Self {
        Self {
            id: EmployeeId::SYSTEM,
            role: ActorRole::System,
        }
    }

    /// Leave types this actor may manually adjust.
    #[must_use]
    pub fn adjustable_leave_types(&self) -> &'static [LeaveType] {
        match self.role {
            ActorRole::Employee => &[],
            ActorRole::Hr => &[LeaveType::Casual, LeaveType::Sick],
            ActorRole::SuperAdmin | ActorRole::System => {
                &[LeaveType::Casual, LeaveType::Sick, LeaveType::Lop]
            }
        }
    }

    /// Returns true if this actor may run LOP to casual conversions.
    #[must_use]
    pub fn may_convert(&self) -> bool {
        matches!(self.role, ActorRole::Hr | ActorRole::SuperAdmin)
    }

    /// Returns true if this actor may apply consumption debits.
    #[must_use]
    pub fn may_consume(&self) -> bool {
        matches!(
            self.role,
            ActorRole::Hr | ActorRole::SuperAdmin | ActorRole::System
        )
    }
}

/// Read-only view of an employee's balances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSnapshot {
    /// The employee this snapshot belongs to.
    pub employee_id: EmployeeId,
    /// Casual leave balance.
    pub casual: Decimal,
    /// Sick leave balance.
    pub sick: Decimal,
    /// Loss-of-pay balance. May be negative.
    pub lop: Decimal,
}

impl BalanceSnapshot {
    /// A zeroed snapshot for an employee without a balance row yet.
    #[must_use]
    pub fn empty(employee_id: EmployeeId) -> Self {
        Self {
            employee_id,
            casual: Decimal::ZERO,
            sick: Decimal::ZERO,
            lop: Decimal::ZERO,
        }
    }

    /// Returns the balance for one leave type.
    #[must_use]
    pub fn get(&self, leave_type: LeaveType) -> Decimal {
        match leave_type {
            LeaveType::Casual => self.casual,
            LeaveType::Sick => self.sick,
            LeaveType::Lop => self.lop,
        }
    }

    /// Returns a copy with one leave type replaced.
    #[must_use]
    pub fn with(&self, leave_type: LeaveType, value: Decimal) -> Self {
        let mut next = *self;
        match leave_type {
            LeaveType::Casual => next.casual = value,
            LeaveType::Sick => next.sick = value,
            LeaveType::Lop => next.lop = value,
        }
        next
    }
}

/// A month targeted by an accrual run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccrualPeriod {
    /// Calendar year.
    pub year: i32,
    /// Calendar month, 1-12.
    pub month: u32,
}

impl AccrualPeriod {
    /// Creates a period, validating the month.
    #[must_use]
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    /// The period containing the given instant.
    #[must_use]
    pub fn containing(at: DateTime<Utc>) -> Self {
        use chrono::Datelike;
        Self {
            year: at.year(),
            month: at.month(),
        }
    }
}

impl std::fmt::Display for AccrualPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl std::str::FromStr for AccrualPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, month) = s
            .split_once('-')
            .ok_or_else(|| format!("expected YYYY-MM, got {s:?}"))?;
        let year: i32 = year.parse().map_err(|_| format!("invalid year in {s:?}"))?;
        let month: u32 = month
            .parse()
            .map_err(|_| format!("invalid month in {s:?}"))?;
        Self::new(year, month).ok_or_else(|| format!("month out of range in {s:?}"))
    }
}

/// Outcome counters for one accrual batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccrualSummary {
    /// Employees credited this run.
    pub credited: usize,
    /// Employees skipped (already credited for the period, or at cap).
    pub skipped: usize,
    /// Employees whose credit failed and was isolated.
    pub errors: usize,
}

/// One append-only audit trail record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Entry id.
    pub id: AuditEntryId,
    /// Employee whose balance changed.
    pub employee_id: EmployeeId,
    /// Which leave type changed.
    pub field: LeaveType,
    /// Signed change applied.
    pub delta: Decimal,
    /// Balance for `field` after the change.
    pub resulting_balance: Decimal,
    /// Who made the change.
    pub actor_id: EmployeeId,
    /// Why the change was made.
    pub reason: AdjustmentReason,
    /// When the change was made.
    pub occurred_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_leave_type_capped() {
        assert!(LeaveType::Casual.is_capped());
        assert!(LeaveType::Sick.is_capped());
        assert!(!LeaveType::Lop.is_capped());
    }

    #[test]
    fn test_snapshot_get_with() {
        let base = BalanceSnapshot::empty(EmployeeId::new());
        let updated = base
            .with(LeaveType::Casual, dec!(4))
            .with(LeaveType::Lop, dec!(-2.5));
        assert_eq!(updated.get(LeaveType::Casual), dec!(4));
        assert_eq!(updated.get(LeaveType::Sick), dec!(0));
        assert_eq!(updated.get(LeaveType::Lop), dec!(-2.5));
    }

    #[test]
    fn test_period_parse_and_display() {
        let period: AccrualPeriod = "2025-06".parse().unwrap();
        assert_eq!(period, AccrualPeriod::new(2025, 6).unwrap());
        assert_eq!(period.to_string(), "2025-06");
    }

    #[test]
    fn test_period_rejects_bad_month() {
        assert!(AccrualPeriod::new(2025, 0).is_none());
        assert!(AccrualPeriod::new(2025, 13).is_none());
        assert!("2025-13".parse::<AccrualPeriod>().is_err());
        assert!("202506".parse::<AccrualPeriod>().is_err());
    }

    #[test]
    fn test_hr_may_not_touch_lop() {
        let hr = Actor::new(EmployeeId::new(), ActorRole::Hr);
        assert!(!hr.adjustable_leave_types().contains(&LeaveType::Lop));
        assert!(hr.may_convert());

        let admin = Actor::new(EmployeeId::new(), ActorRole::SuperAdmin);
        assert!(admin.adjustable_leave_types().contains(&LeaveType::Lop));
    }

    #[test]
    fn test_employee_may_not_adjust() {
        let employee = Actor::new(EmployeeId::new(), ActorRole::Employee);
        assert!(employee.adjustable_leave_types().is_empty());
        assert!(!employee.may_convert());
        assert!(!employee.may_consume());
    }
}
