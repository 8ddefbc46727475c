//! Adjustment validation for leave balance mutations.
//!
//! Every mutating path consults this module before touching the store, so
//! the numeric rule set has one authoritative definition and is testable in
//! isolation from storage.

use rust_decimal::Decimal;

use super::error::LedgerError;
use super::policy::{BALANCE_CAP, HALF_DAY_GRANULARITY, MAX_DELTA_MAGNITUDE};
use super::types::{LeaveType, OperationKind};

/// Validates a single-field adjustment and returns the resulting balance.
///
/// Rules, in evaluation order:
/// 1. `delta` must be non-zero and below 100 in magnitude, with the sign
///    matching the operation kind (credits positive, debits negative) -
///    else `InvalidMagnitude`.
/// 2. `delta` must be a multiple of 0.5 - else `InvalidGranularity`.
/// 3. Credits to casual/sick must not push the balance above 99 - else
///    `CapExceeded`. LOP has no upper cap.
/// 4. Debits to casual/sick must not push the balance below zero - else
///    `NegativeBalanceDisallowed`. LOP may go arbitrarily negative (a
///    conversion may overdraw it on purpose).
///
/// # Errors
///
/// Returns a validation variant of [`LedgerError`]; the caller must not
/// mutate state on any error.
pub fn validate_adjustment(
    current: Decimal,
    leave_type: LeaveType,
    delta: Decimal,
    operation: OperationKind,
) -> Result<Decimal, LedgerError> {
    if delta.is_zero() || delta.abs() >= MAX_DELTA_MAGNITUDE {
        return Err(LedgerError::InvalidMagnitude { delta });
    }

    let sign_ok = match operation {
        OperationKind::Credit | OperationKind::Conversion => delta > Decimal::ZERO,
        OperationKind::ManualDebit | OperationKind::Consumption => delta < Decimal::ZERO,
    };
    if !sign_ok {
        return Err(LedgerError::InvalidMagnitude { delta });
    }

    if delta % HALF_DAY_GRANULARITY != Decimal::ZERO {
        return Err(LedgerError::InvalidGranularity { delta });
    }

    let new_balance = current + delta;

    if delta > Decimal::ZERO {
        if leave_type.is_capped() && new_balance > BALANCE_CAP {
            return Err(LedgerError::CapExceeded {
                leave_type,
                current,
                delta,
            });
        }
    } else if leave_type.is_capped() && new_balance < Decimal::ZERO {
        return Err(LedgerError::NegativeBalanceDisallowed {
            leave_type,
            current,
            delta,
        });
    }

    Ok(new_balance)
}
