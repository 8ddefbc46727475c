//! Leave ledger error taxonomy.
//!
//! Validation failures never reach the store; store failures are wrapped
//! with the employee id and operation kind for diagnosability.

use rust_decimal::Decimal;
use staffline_shared::types::EmployeeId;
use thiserror::Error;

use super::types::LeaveType;

/// The ledger operation in flight when an error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerOperation {
    /// Read-only balance fetch.
    GetBalance,
    /// Ad-hoc HR adjustment.
    ManualAdjust,
    /// LOP to casual conversion.
    Conversion,
    /// Approval-workflow deduction.
    Consumption,
    /// Monthly accrual batch.
    Accrual,
    /// Audit trail read.
    AuditTrail,
}

impl std::fmt::Display for LedgerOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::GetBalance => "get_balance",
            Self::ManualAdjust => "manual_adjust",
            Self::Conversion => "conversion",
            Self::Consumption => "consumption",
            Self::Accrual => "accrual",
            Self::AuditTrail => "audit_trail",
        };
        write!(f, "{s}")
    }
}

/// Errors that can occur during leave ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// Delta is not a multiple of the half-day granularity.
    #[error("Delta {delta} is not a multiple of 0.5 days")]
    InvalidGranularity {
        /// The rejected delta.
        delta: Decimal,
    },

    /// Delta is zero, has the wrong sign for the operation, or is
    /// implausibly large.
    #[error("Delta {delta} is out of the allowed range")]
    InvalidMagnitude {
        /// The rejected delta.
        delta: Decimal,
    },

    /// Credit would push a capped balance above the cap.
    #[error("{leave_type} balance {current} + {delta} would exceed the cap of 99")]
    CapExceeded {
        /// The capped leave type.
        leave_type: LeaveType,
        /// Balance before the rejected credit.
        current: Decimal,
        /// The rejected delta.
        delta: Decimal,
    },

    /// Debit would push a casual or sick balance below zero.
    #[error("{leave_type} balance {current} + {delta} would go negative")]
    NegativeBalanceDisallowed {
        /// The protected leave type.
        leave_type: LeaveType,
        /// Balance before the rejected debit.
        current: Decimal,
        /// The rejected delta.
        delta: Decimal,
    },

    // ========== Business Rule Errors ==========
    /// Target employee is inactive or unknown.
    #[error("Employee {0} is not eligible for leave adjustments")]
    EmployeeNotEligible(EmployeeId),

    // ========== Authorization Errors ==========
    /// Actor is not authorized for this operation.
    #[error("Actor {actor_id} is not authorized to perform {operation}")]
    Forbidden {
        /// The rejected actor.
        actor_id: EmployeeId,
        /// The attempted operation.
        operation: LedgerOperation,
    },

    // ========== Store Errors ==========
    /// Optimistic concurrency retries exhausted.
    #[error("Concurrent modification of employee {employee_id} during {operation}, retries exhausted")]
    StoreConflict {
        /// The contended employee row.
        employee_id: EmployeeId,
        /// The operation that lost the race.
        operation: LedgerOperation,
    },

    /// The store could not be reached or failed fatally.
    #[error("Store unavailable during {operation}: {message}")]
    StoreUnavailable {
        /// The operation that failed.
        operation: LedgerOperation,
        /// Underlying store message.
        message: String,
    },
}

impl LedgerError {
    /// Returns the error code for collaborator-facing responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidGranularity { .. } => "INVALID_GRANULARITY",
            Self::InvalidMagnitude { .. } => "INVALID_MAGNITUDE",
            Self::CapExceeded { .. } => "CAP_EXCEEDED",
            Self::NegativeBalanceDisallowed { .. } => "NEGATIVE_BALANCE_DISALLOWED",
            Self::EmployeeNotEligible(_) => "EMPLOYEE_NOT_ELIGIBLE",
            Self::Forbidden { .. } => "FORBIDDEN",
            Self::StoreConflict { .. } => "STORE_CONFLICT",
            Self::StoreUnavailable { .. } => "STORE_UNAVAILABLE",
        }
    }

    /// Returns true if the caller may retry the operation as-is.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StoreConflict { .. })
    }

    /// Returns true if this is a validation failure (no state was touched).
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidGranularity { .. }
                | Self::InvalidMagnitude { .. }
                | Self::CapExceeded { .. }
                | Self::NegativeBalanceDisallowed { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            LedgerError::InvalidGranularity { delta: dec!(0.3) }.error_code(),
            "INVALID_GRANULARITY"
        );
        assert_eq!(
            LedgerError::CapExceeded {
                leave_type: LeaveType::Casual,
                current: dec!(98),
                delta: dec!(2),
            }
            .error_code(),
            "CAP_EXCEEDED"
        );
        assert_eq!(
            LedgerError::Forbidden {
                actor_id: EmployeeId::new(),
                operation: LedgerOperation::Conversion,
            }
            .error_code(),
            "FORBIDDEN"
        );
    }

    #[test]
    fn test_retryable_errors() {
        assert!(
            LedgerError::StoreConflict {
                employee_id: EmployeeId::new(),
                operation: LedgerOperation::ManualAdjust,
            }
            .is_retryable()
        );
        assert!(!LedgerError::InvalidMagnitude { delta: dec!(100) }.is_retryable());
    }

    #[test]
    fn test_validation_flags() {
        assert!(LedgerError::InvalidGranularity { delta: dec!(0.3) }.is_validation());
        assert!(
            !LedgerError::StoreUnavailable {
                operation: LedgerOperation::Accrual,
                message: "down".into(),
            }
            .is_validation()
        );
    }

    #[test]
    fn test_error_display() {
        let err = LedgerError::CapExceeded {
            leave_type: LeaveType::Sick,
            current: dec!(98.5),
            delta: dec!(1),
        };
        assert_eq!(
            err.to_string(),
            "sick balance 98.5 + 1 would exceed the cap of 99"
        );
    }
}
