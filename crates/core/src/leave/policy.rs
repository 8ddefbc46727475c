//! Fixed leave policy constants and accrual arithmetic.
//!
//! These are product policy values, not runtime configuration; tests assert
//! on them directly.

use rust_decimal::Decimal;

use super::types::BalanceSnapshot;

/// Casual leave credited to every active employee each month.
pub const MONTHLY_CASUAL_ACCRUAL: Decimal = Decimal::from_parts(10, 0, 0, false, 1);

/// Sick leave credited to every active employee each month.
pub const MONTHLY_SICK_ACCRUAL: Decimal = Decimal::from_parts(5, 0, 0, false, 1);

/// Upper cap for casual and sick balances at rest.
pub const BALANCE_CAP: Decimal = Decimal::from_parts(99, 0, 0, false, 0);

/// Smallest unit of leave. All deltas must be multiples of this.
pub const HALF_DAY_GRANULARITY: Decimal = Decimal::from_parts(5, 0, 0, false, 1);

/// Deltas at or beyond this magnitude are rejected outright (fat-finger guard).
pub const MAX_DELTA_MAGNITUDE: Decimal = Decimal::from_parts(100, 0, 0, false, 0);

/// Bounded retry attempts for optimistic-concurrency conflicts.
pub const MAX_STORE_ATTEMPTS: u32 = 3;

/// Base backoff between store retry attempts, in milliseconds.
pub const STORE_RETRY_BACKOFF_MS: u64 = 25;

/// Monthly accrual deltas for one employee, clamped to the balance cap.
///
/// Returns `(casual_delta, sick_delta)`. A field already at the cap yields a
/// zero delta; an employee with zero deltas on both fields is skipped by the
/// engine.
#[must_use]
pub fn accrual_deltas(balance: &BalanceSnapshot) -> (Decimal, Decimal) {
    let clamp = |current: Decimal, increment: Decimal| {
        let headroom = (BALANCE_CAP - current).max(Decimal::ZERO);
        increment.min(headroom)
    };
    (
        clamp(balance.casual, MONTHLY_CASUAL_ACCRUAL),
        clamp(balance.sick, MONTHLY_SICK_ACCRUAL),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use staffline_shared::types::EmployeeId;

    use crate::leave::types::LeaveType;

    fn snapshot(casual: Decimal, sick: Decimal, lop: Decimal) -> BalanceSnapshot {
        BalanceSnapshot::empty(EmployeeId::new())
            .with(LeaveType::Casual, casual)
            .with(LeaveType::Sick, sick)
            .with(LeaveType::Lop, lop)
    }

    #[test]
    fn test_policy_constants() {
        assert_eq!(MONTHLY_CASUAL_ACCRUAL, dec!(1.0));
        assert_eq!(MONTHLY_SICK_ACCRUAL, dec!(0.5));
        assert_eq!(BALANCE_CAP, dec!(99));
        assert_eq!(HALF_DAY_GRANULARITY, dec!(0.5));
        assert_eq!(MAX_DELTA_MAGNITUDE, dec!(100));
    }

    #[test]
    fn test_full_accrual_below_cap() {
        let (casual, sick) = accrual_deltas(&snapshot(dec!(4), dec!(4), dec!(4)));
        assert_eq!(casual, dec!(1.0));
        assert_eq!(sick, dec!(0.5));
    }

    #[test]
    fn test_accrual_clamps_at_cap() {
        let (casual, sick) = accrual_deltas(&snapshot(dec!(98.5), dec!(99), dec!(0)));
        assert_eq!(casual, dec!(0.5));
        assert_eq!(sick, dec!(0));
    }

    #[test]
    fn test_accrual_at_cap_yields_zero() {
        let (casual, sick) = accrual_deltas(&snapshot(dec!(99), dec!(99), dec!(-3)));
        assert_eq!(casual, dec!(0));
        assert_eq!(sick, dec!(0));
    }
}
