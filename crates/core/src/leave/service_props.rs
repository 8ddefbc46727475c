//! Property tests for the ledger service over the in-memory store.

use std::sync::Arc;

use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use staffline_shared::types::EmployeeId;
use tokio_util::sync::CancellationToken;

use super::service::LeaveLedger;
use super::store::BalanceStore;
use super::testing::{MemoryBalanceStore, StubDirectory};
use super::types::{AccrualPeriod, Actor, ActorRole, LeaveType};

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

fn ledger_for(employee: EmployeeId) -> (LeaveLedger, Arc<MemoryBalanceStore>) {
    let store = Arc::new(MemoryBalanceStore::new());
    let directory = Arc::new(StubDirectory::with_active(vec![employee]));
    (LeaveLedger::new(store.clone(), directory), store)
}

/// Strategy for half-day-granular signed deltas in (-25, 25).
fn delta_strategy() -> impl Strategy<Value = Decimal> {
    (-50i64..=50)
        .prop_filter("zero is rejected by validation", |n| *n != 0)
        .prop_map(|n| Decimal::new(n * 5, 1))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// **Cap invariant**: for any sequence of manual adjustments, casual and
    /// sick balances stay within [0, 99]; rejected adjustments change
    /// nothing.
    #[test]
    fn prop_balances_stay_within_bounds(
        deltas in prop::collection::vec((delta_strategy(), prop::bool::ANY), 1..30),
    ) {
        let employee = EmployeeId::new();
        let (ledger, _store) = ledger_for(employee);
        let actor = Actor::new(EmployeeId::new(), ActorRole::Hr);

        let final_balance = runtime().block_on(async {
            for (delta, pick_sick) in deltas {
                let leave_type = if pick_sick { LeaveType::Sick } else { LeaveType::Casual };
                let _ = ledger.manual_adjust(employee, leave_type, delta, &actor).await;
            }
            ledger.get_balance(employee).await.unwrap()
        });

        prop_assert!(final_balance.casual >= dec!(0));
        prop_assert!(final_balance.casual <= dec!(99));
        prop_assert!(final_balance.sick >= dec!(0));
        prop_assert!(final_balance.sick <= dec!(99));
    }

    /// **Audit completeness**: summing the audit deltas per field
    /// reconstructs the final balance exactly.
    #[test]
    fn prop_audit_deltas_reconstruct_balance(
        deltas in prop::collection::vec(delta_strategy(), 1..30),
    ) {
        let employee = EmployeeId::new();
        let (ledger, _store) = ledger_for(employee);
        let actor = Actor::new(EmployeeId::new(), ActorRole::SuperAdmin);

        let (final_balance, audit) = runtime().block_on(async {
            for delta in deltas {
                let _ = ledger.manual_adjust(employee, LeaveType::Lop, delta, &actor).await;
            }
            (
                ledger.get_balance(employee).await.unwrap(),
                ledger.audit_trail(employee, None).await.unwrap(),
            )
        });

        let replayed: Decimal = audit.iter().map(|e| e.delta).sum();
        prop_assert_eq!(replayed, final_balance.lop);

        // Newest-first ordering: the head entry carries the final balance.
        if let Some(latest) = audit.first() {
            prop_assert_eq!(latest.resulting_balance, final_balance.lop);
        }
    }

    /// **Idempotent accrual**: N runs for the same period land on the same
    /// balances as a single run.
    #[test]
    fn prop_accrual_idempotent(runs in 1usize..5) {
        let employee = EmployeeId::new();
        let (ledger, store) = ledger_for(employee);
        let period = AccrualPeriod::new(2025, 6).unwrap();

        let balance = runtime().block_on(async {
            for _ in 0..runs {
                ledger
                    .accrue_monthly(period, &Actor::system(), &CancellationToken::new())
                    .await
                    .unwrap();
            }
            ledger.get_balance(employee).await.unwrap()
        });

        prop_assert_eq!(balance.casual, dec!(1.0));
        prop_assert_eq!(balance.sick, dec!(0.5));
        let recorded = runtime().block_on(store.accrual_recorded(employee, period)).unwrap();
        prop_assert!(recorded);
    }
}
