//! Test doubles for the store and directory ports.
//!
//! The in-memory store mirrors the transactional semantics the SQL store
//! guarantees: version CAS, all-or-nothing mutations, and the accrual
//! marker uniqueness rule.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use staffline_shared::types::{AuditEntryId, EmployeeId};

use super::directory::EmployeeDirectory;
use super::store::{BalanceMutation, BalanceStore, StoreError, StoredBalance};
use super::types::{AccrualPeriod, AuditEntry};

#[derive(Default)]
struct MemoryState {
    balances: HashMap<EmployeeId, StoredBalance>,
    audit: Vec<AuditEntry>,
    markers: HashSet<(EmployeeId, i32, u32)>,
}

/// In-memory [`BalanceStore`] with the same atomicity rules as the SQL
/// implementation.
#[derive(Default)]
pub(crate) struct MemoryBalanceStore {
    state: Mutex<MemoryState>,
    unavailable: AtomicBool,
}

impl MemoryBalanceStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Seeds a balance row directly, bypassing validation.
    pub(crate) fn seed_balance(
        &self,
        employee_id: EmployeeId,
        casual: Decimal,
        sick: Decimal,
        lop: Decimal,
    ) {
        let mut state = self.state.lock().unwrap();
        state.balances.insert(
            employee_id,
            StoredBalance {
                employee_id,
                casual,
                sick,
                lop,
                version: 1,
            },
        );
    }

    /// Makes every store call fail with [`StoreError::Unavailable`].
    pub(crate) fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected outage".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl BalanceStore for MemoryBalanceStore {
    async fn fetch(&self, employee_id: EmployeeId) -> Result<Option<StoredBalance>, StoreError> {
        self.check_available()?;
        Ok(self.state.lock().unwrap().balances.get(&employee_id).copied())
    }

    async fn apply(&self, mutation: BalanceMutation) -> Result<(), StoreError> {
        self.check_available()?;
        let mut state = self.state.lock().unwrap();

        if let Some(period) = mutation.accrual_marker {
            let key = (mutation.employee_id, period.year, period.month);
            if state.markers.contains(&key) {
                return Err(StoreError::AlreadyRecorded);
            }
        }

        if !mutation.changes.is_empty() {
            let row = if mutation.expected_version == 0 {
                if state.balances.contains_key(&mutation.employee_id) {
                    return Err(StoreError::Conflict);
                }
                let mut row = StoredBalance {
                    employee_id: mutation.employee_id,
                    casual: Decimal::ZERO,
                    sick: Decimal::ZERO,
                    lop: Decimal::ZERO,
                    version: 1,
                };
                for change in &mutation.changes {
                    apply_field(&mut row, change.field, change.resulting_balance);
                }
                row
            } else {
                let Some(existing) = state.balances.get(&mutation.employee_id) else {
                    return Err(StoreError::Conflict);
                };
                if existing.version != mutation.expected_version {
                    return Err(StoreError::Conflict);
                }
                let mut row = *existing;
                row.version += 1;
                for change in &mutation.changes {
                    apply_field(&mut row, change.field, change.resulting_balance);
                }
                row
            };
            state.balances.insert(mutation.employee_id, row);

            let now = Utc::now();
            for change in &mutation.changes {
                state.audit.push(AuditEntry {
                    id: AuditEntryId::new(),
                    employee_id: mutation.employee_id,
                    field: change.field,
                    delta: change.delta,
                    resulting_balance: change.resulting_balance,
                    actor_id: mutation.actor_id,
                    reason: mutation.reason,
                    occurred_at: now,
                });
            }
        }

        if let Some(period) = mutation.accrual_marker {
            state
                .markers
                .insert((mutation.employee_id, period.year, period.month));
        }

        Ok(())
    }

    async fn accrual_recorded(
        &self,
        employee_id: EmployeeId,
        period: AccrualPeriod,
    ) -> Result<bool, StoreError> {
        self.check_available()?;
        Ok(self
            .state
            .lock()
            .unwrap()
            .markers
            .contains(&(employee_id, period.year, period.month)))
    }

    async fn audit_trail(
        &self,
        employee_id: EmployeeId,
        limit: Option<u64>,
    ) -> Result<Vec<AuditEntry>, StoreError> {
        self.check_available()?;
        let state = self.state.lock().unwrap();
        let mut entries: Vec<AuditEntry> = state
            .audit
            .iter()
            .filter(|e| e.employee_id == employee_id)
            .cloned()
            .collect();
        entries.reverse();
        if let Some(limit) = limit {
            entries.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        }
        Ok(entries)
    }
}

fn apply_field(row: &mut StoredBalance, field: super::types::LeaveType, value: Decimal) {
    use super::types::LeaveType;
    match field {
        LeaveType::Casual => row.casual = value,
        LeaveType::Sick => row.sick = value,
        LeaveType::Lop => row.lop = value,
    }
}

/// Fixed-roster [`EmployeeDirectory`].
#[derive(Default)]
pub(crate) struct StubDirectory {
    active: Vec<EmployeeId>,
}

impl StubDirectory {
    pub(crate) fn with_active(active: Vec<EmployeeId>) -> Self {
        Self { active }
    }
}

#[async_trait]
impl EmployeeDirectory for StubDirectory {
    async fn active_employees(&self) -> Result<Vec<EmployeeId>, StoreError> {
        Ok(self.active.clone())
    }

    async fn is_active(&self, employee_id: EmployeeId) -> Result<bool, StoreError> {
        Ok(self.active.contains(&employee_id))
    }
}
