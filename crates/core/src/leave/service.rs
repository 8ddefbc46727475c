//! Leave ledger service.
//!
//! Composes the adjustment validator and the injected balance store into
//! the collaborator-facing operations: balance reads, manual adjustments,
//! LOP conversion, consumption debits, and the monthly accrual batch.

use std::sync::Arc;
use std::time::Duration;

use futures::{StreamExt, stream};
use rust_decimal::Decimal;
use staffline_shared::types::EmployeeId;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::directory::EmployeeDirectory;
use super::error::{LedgerError, LedgerOperation};
use super::policy::{self, MAX_STORE_ATTEMPTS, STORE_RETRY_BACKOFF_MS};
use super::store::{BalanceMutation, BalanceStore, FieldChange, StoreError};
use super::types::{
    AccrualPeriod, AccrualSummary, Actor, AdjustmentReason, AuditEntry, BalanceSnapshot,
    LeaveType, OperationKind,
};
use super::validator::validate_adjustment;

/// Default number of employees the accrual batch processes concurrently.
const DEFAULT_ACCRUAL_CONCURRENCY: usize = 8;

/// Outcome of processing one employee inside the accrual batch.
enum AccrualOutcome {
    Credited,
    Skipped,
    Failed,
    Cancelled,
    /// The store itself is down; aborts the whole run.
    Fatal(String),
}

/// Leave balance ledger.
///
/// All mutating operations validate first (fail fast, no partial writes),
/// then apply an atomic mutation through the injected [`BalanceStore`] with
/// bounded optimistic-concurrency retries.
#[derive(Clone)]
pub struct LeaveLedger {
    store: Arc<dyn BalanceStore>,
    directory: Arc<dyn EmployeeDirectory>,
    accrual_concurrency: usize,
}

impl LeaveLedger {
    /// Creates a ledger over the given store and employee directory.
    #[must_use]
    pub fn new(store: Arc<dyn BalanceStore>, directory: Arc<dyn EmployeeDirectory>) -> Self {
        Self {
            store,
            directory,
            accrual_concurrency: DEFAULT_ACCRUAL_CONCURRENCY,
        }
    }

    /// Sets the accrual batch worker-pool size.
    #[must_use]
    pub fn with_accrual_concurrency(mut self, concurrency: usize) -> Self {
        self.accrual_concurrency = concurrency.max(1);
        self
    }

    /// Reads an employee's balances. Employees without a balance row yet
    /// read as all zeros; no row is created.
    pub async fn get_balance(
        &self,
        employee_id: EmployeeId,
    ) -> Result<BalanceSnapshot, LedgerError> {
        let stored = self
            .store
            .fetch(employee_id)
            .await
            .map_err(|e| Self::unavailable(LedgerOperation::GetBalance, &e))?;

        Ok(stored.map_or_else(
            || BalanceSnapshot::empty(employee_id),
            |row| BalanceSnapshot {
                employee_id,
                casual: row.casual,
                sick: row.sick,
                lop: row.lop,
            },
        ))
    }

    /// Ad-hoc HR credit or debit of a single leave type.
    ///
    /// The actor's role decides which leave types it may touch (HR:
    /// casual/sick; Super Admin: all). Inactive or unknown employees are
    /// rejected with `EmployeeNotEligible`. Returns the new balance of the
    /// adjusted leave type.
    pub async fn manual_adjust(
        &self,
        employee_id: EmployeeId,
        leave_type: LeaveType,
        delta: Decimal,
        actor: &Actor,
    ) -> Result<Decimal, LedgerError> {
        if !actor.adjustable_leave_types().contains(&leave_type) {
            return Err(LedgerError::Forbidden {
                actor_id: actor.id,
                operation: LedgerOperation::ManualAdjust,
            });
        }

        let active = self
            .directory
            .is_active(employee_id)
            .await
            .map_err(|e| Self::unavailable(LedgerOperation::ManualAdjust, &e))?;
        if !active {
            return Err(LedgerError::EmployeeNotEligible(employee_id));
        }

        let kind = if delta > Decimal::ZERO {
            OperationKind::Credit
        } else {
            OperationKind::ManualDebit
        };

        let result = self
            .mutate(
                employee_id,
                actor.id,
                AdjustmentReason::ManualAdjustment,
                LedgerOperation::ManualAdjust,
                |snapshot| {
                    let new_balance =
                        validate_adjustment(snapshot.get(leave_type), leave_type, delta, kind)?;
                    Ok(vec![FieldChange {
                        field: leave_type,
                        delta,
                        resulting_balance: new_balance,
                    }])
                },
            )
            .await?;

        Ok(result.get(leave_type))
    }

    /// Atomically moves `amount` from the LOP balance to the casual balance.
    ///
    /// The LOP side may be overdrawn into negative territory; the only hard
    /// constraint is the casual cap. Returns `(new_casual, new_lop)`.
    pub async fn convert_lop_to_casual(
        &self,
        employee_id: EmployeeId,
        amount: Decimal,
        actor: &Actor,
    ) -> Result<(Decimal, Decimal), LedgerError> {
        if !actor.may_convert() {
            return Err(LedgerError::Forbidden {
                actor_id: actor.id,
                operation: LedgerOperation::Conversion,
            });
        }

        let result = self
            .mutate(
                employee_id,
                actor.id,
                AdjustmentReason::Conversion,
                LedgerOperation::Conversion,
                |snapshot| {
                    let new_casual = validate_adjustment(
                        snapshot.casual,
                        LeaveType::Casual,
                        amount,
                        OperationKind::Conversion,
                    )?;
                    let new_lop = snapshot.lop - amount;
                    Ok(vec![
                        FieldChange {
                            field: LeaveType::Casual,
                            delta: amount,
                            resulting_balance: new_casual,
                        },
                        FieldChange {
                            field: LeaveType::Lop,
                            delta: -amount,
                            resulting_balance: new_lop,
                        },
                    ])
                },
            )
            .await?;

        Ok((result.casual, result.lop))
    }

    /// Deducts leave when an approved request settles.
    ///
    /// Collaborator contract for the external approval workflow: same
    /// granularity and magnitude rules as every other mutation; casual and
    /// sick may not go negative, LOP may. Returns the new balance of the
    /// consumed leave type.
    pub async fn consume(
        &self,
        employee_id: EmployeeId,
        leave_type: LeaveType,
        amount: Decimal,
        actor: &Actor,
    ) -> Result<Decimal, LedgerError> {
        if !actor.may_consume() {
            return Err(LedgerError::Forbidden {
                actor_id: actor.id,
                operation: LedgerOperation::Consumption,
            });
        }

        let delta = -amount;
        let result = self
            .mutate(
                employee_id,
                actor.id,
                AdjustmentReason::Consumption,
                LedgerOperation::Consumption,
                |snapshot| {
                    let new_balance = validate_adjustment(
                        snapshot.get(leave_type),
                        leave_type,
                        delta,
                        OperationKind::Consumption,
                    )?;
                    Ok(vec![FieldChange {
                        field: leave_type,
                        delta,
                        resulting_balance: new_balance,
                    }])
                },
            )
            .await?;

        Ok(result.get(leave_type))
    }

    /// Credits every active employee the monthly accrual for `period`.
    ///
    /// Safe to re-invoke for the same period: an `accrual_runs` marker is
    /// written in the same transaction as each credit and re-runs skip
    /// already-marked employees. Employees are processed in independent
    /// transactions under a bounded worker pool; a per-employee failure is
    /// counted and logged without aborting the batch, while a store outage
    /// aborts the whole run after reporting partial counts.
    ///
    /// The `cancel` token is honored between employees; already-credited
    /// employees stay credited.
    pub async fn accrue_monthly(
        &self,
        period: AccrualPeriod,
        actor: &Actor,
        cancel: &CancellationToken,
    ) -> Result<AccrualSummary, LedgerError> {
        let roster = self
            .directory
            .active_employees()
            .await
            .map_err(|e| Self::unavailable(LedgerOperation::Accrual, &e))?;

        info!(%period, employees = roster.len(), "starting accrual run");

        let mut summary = AccrualSummary::default();
        let mut outcomes = stream::iter(roster)
            .map(|employee_id| {
                let cancel = cancel.clone();
                async move {
                    if cancel.is_cancelled() {
                        return AccrualOutcome::Cancelled;
                    }
                    self.accrue_employee(employee_id, period, actor.id).await
                }
            })
            .buffer_unordered(self.accrual_concurrency);

        while let Some(outcome) = outcomes.next().await {
            match outcome {
                AccrualOutcome::Credited => summary.credited += 1,
                AccrualOutcome::Skipped => summary.skipped += 1,
                AccrualOutcome::Failed => summary.errors += 1,
                AccrualOutcome::Cancelled => {}
                AccrualOutcome::Fatal(message) => {
                    drop(outcomes);
                    warn!(
                        %period,
                        credited = summary.credited,
                        skipped = summary.skipped,
                        errors = summary.errors,
                        "accrual run aborted: store unavailable"
                    );
                    return Err(LedgerError::StoreUnavailable {
                        operation: LedgerOperation::Accrual,
                        message,
                    });
                }
            }
        }

        info!(
            %period,
            credited = summary.credited,
            skipped = summary.skipped,
            errors = summary.errors,
            "accrual run finished"
        );
        Ok(summary)
    }

    /// Reads the audit trail for an employee, newest first.
    pub async fn audit_trail(
        &self,
        employee_id: EmployeeId,
        limit: Option<u64>,
    ) -> Result<Vec<AuditEntry>, LedgerError> {
        self.store
            .audit_trail(employee_id, limit)
            .await
            .map_err(|e| Self::unavailable(LedgerOperation::AuditTrail, &e))
    }

    /// Processes one employee inside the accrual batch.
    async fn accrue_employee(
        &self,
        employee_id: EmployeeId,
        period: AccrualPeriod,
        actor_id: EmployeeId,
    ) -> AccrualOutcome {
        match self.store.accrual_recorded(employee_id, period).await {
            Ok(true) => return AccrualOutcome::Skipped,
            Ok(false) => {}
            Err(StoreError::Unavailable(message)) => return AccrualOutcome::Fatal(message),
            Err(e) => return AccrualOutcome::Fatal(e.to_string()),
        }

        for attempt in 1..=MAX_STORE_ATTEMPTS {
            let stored = match self.store.fetch(employee_id).await {
                Ok(row) => row,
                Err(StoreError::Unavailable(message)) => return AccrualOutcome::Fatal(message),
                Err(e) => return AccrualOutcome::Fatal(e.to_string()),
            };
            let (snapshot, version) = Self::unpack(employee_id, stored);

            let (casual_delta, sick_delta) = policy::accrual_deltas(&snapshot);
            let mut changes = Vec::with_capacity(2);
            if !casual_delta.is_zero() {
                changes.push(FieldChange {
                    field: LeaveType::Casual,
                    delta: casual_delta,
                    resulting_balance: snapshot.casual + casual_delta,
                });
            }
            if !sick_delta.is_zero() {
                changes.push(FieldChange {
                    field: LeaveType::Sick,
                    delta: sick_delta,
                    resulting_balance: snapshot.sick + sick_delta,
                });
            }
            let credited = !changes.is_empty();

            // The marker is recorded even when both fields sit at the cap,
            // so the employee is not retroactively credited by a later
            // re-run of the same period.
            let mutation = BalanceMutation {
                employee_id,
                expected_version: version,
                changes,
                actor_id,
                reason: AdjustmentReason::Accrual,
                accrual_marker: Some(period),
            };

            match self.store.apply(mutation).await {
                Ok(()) if credited => return AccrualOutcome::Credited,
                Ok(()) => return AccrualOutcome::Skipped,
                Err(StoreError::AlreadyRecorded) => return AccrualOutcome::Skipped,
                Err(StoreError::Conflict) if attempt < MAX_STORE_ATTEMPTS => {
                    tokio::time::sleep(Duration::from_millis(
                        STORE_RETRY_BACKOFF_MS * u64::from(attempt),
                    ))
                    .await;
                }
                Err(StoreError::Conflict) => {
                    warn!(%employee_id, %period, "accrual credit lost the version race, giving up");
                    return AccrualOutcome::Failed;
                }
                Err(StoreError::Unavailable(message)) => return AccrualOutcome::Fatal(message),
            }
        }

        AccrualOutcome::Failed
    }

    /// Read-validate-apply loop with bounded optimistic-concurrency retries.
    ///
    /// `build_changes` re-validates against a fresh snapshot on every
    /// attempt, so a retry never applies rules to stale balances.
    async fn mutate(
        &self,
        employee_id: EmployeeId,
        actor_id: EmployeeId,
        reason: AdjustmentReason,
        operation: LedgerOperation,
        build_changes: impl Fn(&BalanceSnapshot) -> Result<Vec<FieldChange>, LedgerError>,
    ) -> Result<BalanceSnapshot, LedgerError> {
        for attempt in 1..=MAX_STORE_ATTEMPTS {
            let stored = self
                .store
                .fetch(employee_id)
                .await
                .map_err(|e| Self::unavailable(operation, &e))?;
            let (snapshot, version) = Self::unpack(employee_id, stored);

            let changes = build_changes(&snapshot)?;
            let mutation = BalanceMutation {
                employee_id,
                expected_version: version,
                changes: changes.clone(),
                actor_id,
                reason,
                accrual_marker: None,
            };

            match self.store.apply(mutation).await {
                Ok(()) => {
                    let mut result = snapshot;
                    for change in &changes {
                        result = result.with(change.field, change.resulting_balance);
                    }
                    return Ok(result);
                }
                Err(StoreError::Conflict) if attempt < MAX_STORE_ATTEMPTS => {
                    tokio::time::sleep(Duration::from_millis(
                        STORE_RETRY_BACKOFF_MS * u64::from(attempt),
                    ))
                    .await;
                }
                Err(StoreError::Conflict) => {
                    return Err(LedgerError::StoreConflict {
                        employee_id,
                        operation,
                    });
                }
                Err(e) => return Err(Self::unavailable(operation, &e)),
            }
        }

        Err(LedgerError::StoreConflict {
            employee_id,
            operation,
        })
    }

    fn unpack(
        employee_id: EmployeeId,
        stored: Option<super::store::StoredBalance>,
    ) -> (BalanceSnapshot, i64) {
        stored.map_or_else(
            || (BalanceSnapshot::empty(employee_id), 0),
            |row| {
                (
                    BalanceSnapshot {
                        employee_id,
                        casual: row.casual,
                        sick: row.sick,
                        lop: row.lop,
                    },
                    row.version,
                )
            },
        )
    }

    fn unavailable(operation: LedgerOperation, error: &StoreError) -> LedgerError {
        LedgerError::StoreUnavailable {
            operation,
            message: error.to_string(),
        }
    }
}
