//! Postgres-backed balance store.
//!
//! Implements the `BalanceStore` port with one database transaction per
//! mutation: the balance upsert, the audit rows, and the accrual marker
//! commit or roll back together. Concurrent writers are serialized with an
//! optimistic version check on the balance row; a stale write updates zero
//! rows and surfaces as a conflict for the service-level retry loop.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use staffline_core::leave::store::{BalanceMutation, BalanceStore, StoreError, StoredBalance};
use staffline_core::leave::types::{AccrualPeriod, AdjustmentReason, AuditEntry, LeaveType};
use staffline_shared::types::{AuditEntryId, EmployeeId};

use crate::entities::{accrual_runs, leave_balance_audit, leave_balances, sea_orm_active_enums};

impl From<LeaveType> for sea_orm_active_enums::LeaveField {
    fn from(value: LeaveType) -> Self {
        match value {
            LeaveType::Casual => Self::Casual,
            LeaveType::Sick => Self::Sick,
            LeaveType::Lop => Self::Lop,
        }
    }
}

impl From<sea_orm_active_enums::LeaveField> for LeaveType {
    fn from(value: sea_orm_active_enums::LeaveField) -> Self {
        match value {
            sea_orm_active_enums::LeaveField::Casual => Self::Casual,
            sea_orm_active_enums::LeaveField::Sick => Self::Sick,
            sea_orm_active_enums::LeaveField::Lop => Self::Lop,
        }
    }
}

impl From<AdjustmentReason> for sea_orm_active_enums::AdjustmentReason {
    fn from(value: AdjustmentReason) -> Self {
        match value {
            AdjustmentReason::Accrual => Self::Accrual,
            AdjustmentReason::ManualAdjustment => Self::ManualAdjustment,
            AdjustmentReason::Conversion => Self::Conversion,
            AdjustmentReason::Consumption => Self::Consumption,
        }
    }
}

impl From<sea_orm_active_enums::AdjustmentReason> for AdjustmentReason {
    fn from(value: sea_orm_active_enums::AdjustmentReason) -> Self {
        match value {
            sea_orm_active_enums::AdjustmentReason::Accrual => Self::Accrual,
            sea_orm_active_enums::AdjustmentReason::ManualAdjustment => Self::ManualAdjustment,
            sea_orm_active_enums::AdjustmentReason::Conversion => Self::Conversion,
            sea_orm_active_enums::AdjustmentReason::Consumption => Self::Consumption,
        }
    }
}

fn unavailable(err: DbErr) -> StoreError {
    StoreError::Unavailable(err.to_string())
}

/// Postgres implementation of the balance store port.
#[derive(Debug, Clone)]
pub struct SqlBalanceStore {
    db: DatabaseConnection,
}

impl SqlBalanceStore {
    /// Creates a store over the given connection pool.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates the balance row with the mutation already applied.
    ///
    /// Losing a creation race surfaces as a conflict so the caller re-reads
    /// the winner's row and retries.
    async fn insert_row(
        txn: &DatabaseTransaction,
        mutation: &BalanceMutation,
    ) -> Result<(), StoreError> {
        let now = Utc::now();
        let mut row = leave_balances::ActiveModel {
            employee_id: Set(mutation.employee_id.into_inner()),
            casual_balance: Set(rust_decimal::Decimal::ZERO),
            sick_balance: Set(rust_decimal::Decimal::ZERO),
            lop_balance: Set(rust_decimal::Decimal::ZERO),
            version: Set(1),
            last_updated: Set(now.into()),
            created_by: Set(mutation.actor_id.into_inner()),
            updated_by: Set(mutation.actor_id.into_inner()),
        };
        for change in &mutation.changes {
            match change.field {
                LeaveType::Casual => row.casual_balance = Set(change.resulting_balance),
                LeaveType::Sick => row.sick_balance = Set(change.resulting_balance),
                LeaveType::Lop => row.lop_balance = Set(change.resulting_balance),
            }
        }

        let inserted = leave_balances::Entity::insert(row)
            .on_conflict(
                OnConflict::column(leave_balances::Column::EmployeeId)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(txn)
            .await
            .map_err(unavailable)?;
        if inserted == 0 {
            return Err(StoreError::Conflict);
        }
        Ok(())
    }

    /// Updates the balance row iff its version still matches the one the
    /// caller read.
    async fn update_row(
        txn: &DatabaseTransaction,
        mutation: &BalanceMutation,
    ) -> Result<(), StoreError> {
        let now = Utc::now();
        let mut update = leave_balances::Entity::update_many()
            .col_expr(
                leave_balances::Column::Version,
                Expr::value(mutation.expected_version + 1),
            )
            .col_expr(leave_balances::Column::LastUpdated, Expr::value(now))
            .col_expr(
                leave_balances::Column::UpdatedBy,
                Expr::value(mutation.actor_id.into_inner()),
            );
        for change in &mutation.changes {
            let column = match change.field {
                LeaveType::Casual => leave_balances::Column::CasualBalance,
                LeaveType::Sick => leave_balances::Column::SickBalance,
                LeaveType::Lop => leave_balances::Column::LopBalance,
            };
            update = update.col_expr(column, Expr::value(change.resulting_balance));
        }

        let result = update
            .filter(leave_balances::Column::EmployeeId.eq(mutation.employee_id.into_inner()))
            .filter(leave_balances::Column::Version.eq(mutation.expected_version))
            .exec(txn)
            .await
            .map_err(unavailable)?;
        if result.rows_affected == 0 {
            tracing::debug!(
                employee_id = %mutation.employee_id,
                expected_version = mutation.expected_version,
                "stale balance write rejected"
            );
            return Err(StoreError::Conflict);
        }
        Ok(())
    }

    /// Appends one audit row per field change.
    async fn insert_audit(
        txn: &DatabaseTransaction,
        mutation: &BalanceMutation,
    ) -> Result<(), StoreError> {
        let now = Utc::now();
        for change in &mutation.changes {
            let entry = leave_balance_audit::ActiveModel {
                id: Set(AuditEntryId::new().into_inner()),
                employee_id: Set(mutation.employee_id.into_inner()),
                field: Set(change.field.into()),
                delta: Set(change.delta),
                resulting_balance: Set(change.resulting_balance),
                actor_id: Set(mutation.actor_id.into_inner()),
                reason: Set(mutation.reason.into()),
                occurred_at: Set(now.into()),
            };
            entry.insert(txn).await.map_err(unavailable)?;
        }
        Ok(())
    }

    /// Inserts the accrual marker, detecting an already-credited period via
    /// the composite primary key.
    async fn insert_marker(
        txn: &DatabaseTransaction,
        employee_id: EmployeeId,
        period: AccrualPeriod,
    ) -> Result<(), StoreError> {
        let marker = accrual_runs::ActiveModel {
            employee_id: Set(employee_id.into_inner()),
            year: Set(period.year),
            month: Set(period.month.cast_signed()),
            credited_at: Set(Utc::now().into()),
        };
        let inserted = accrual_runs::Entity::insert(marker)
            .on_conflict(
                OnConflict::columns([
                    accrual_runs::Column::EmployeeId,
                    accrual_runs::Column::Year,
                    accrual_runs::Column::Month,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(txn)
            .await
            .map_err(unavailable)?;
        if inserted == 0 {
            return Err(StoreError::AlreadyRecorded);
        }
        Ok(())
    }
}

#[async_trait]
impl BalanceStore for SqlBalanceStore {
    async fn fetch(&self, employee_id: EmployeeId) -> Result<Option<StoredBalance>, StoreError> {
        let row = leave_balances::Entity::find_by_id(employee_id.into_inner())
            .one(&self.db)
            .await
            .map_err(unavailable)?;

        Ok(row.map(|model| StoredBalance {
            employee_id,
            casual: model.casual_balance,
            sick: model.sick_balance,
            lop: model.lop_balance,
            version: model.version,
        }))
    }

    async fn apply(&self, mutation: BalanceMutation) -> Result<(), StoreError> {
        let txn = self.db.begin().await.map_err(unavailable)?;

        let result = async {
            if !mutation.changes.is_empty() {
                if mutation.expected_version == 0 {
                    Self::insert_row(&txn, &mutation).await?;
                } else {
                    Self::update_row(&txn, &mutation).await?;
                }
                Self::insert_audit(&txn, &mutation).await?;
            }

            if let Some(period) = mutation.accrual_marker {
                Self::insert_marker(&txn, mutation.employee_id, period).await?;
            }
            Ok(())
        }
        .await;

        match result {
            Ok(()) => txn.commit().await.map_err(unavailable),
            Err(err) => {
                txn.rollback().await.map_err(unavailable)?;
                Err(err)
            }
        }
    }

    async fn accrual_recorded(
        &self,
        employee_id: EmployeeId,
        period: AccrualPeriod,
    ) -> Result<bool, StoreError> {
        let marker = accrual_runs::Entity::find_by_id((
            employee_id.into_inner(),
            period.year,
            period.month.cast_signed(),
        ))
        .one(&self.db)
        .await
        .map_err(unavailable)?;

        Ok(marker.is_some())
    }

    async fn audit_trail(
        &self,
        employee_id: EmployeeId,
        limit: Option<u64>,
    ) -> Result<Vec<AuditEntry>, StoreError> {
        let mut query = leave_balance_audit::Entity::find()
            .filter(leave_balance_audit::Column::EmployeeId.eq(employee_id.into_inner()))
            .order_by_desc(leave_balance_audit::Column::OccurredAt)
            .order_by_desc(leave_balance_audit::Column::Id);
        if let Some(limit) = limit {
            query = query.limit(limit);
        }

        let rows = query.all(&self.db).await.map_err(unavailable)?;

        Ok(rows
            .into_iter()
            .map(|model| AuditEntry {
                id: AuditEntryId::from_uuid(model.id),
                employee_id: EmployeeId::from_uuid(model.employee_id),
                field: model.field.into(),
                delta: model.delta,
                resulting_balance: model.resulting_balance,
                actor_id: EmployeeId::from_uuid(model.actor_id),
                reason: model.reason.into(),
                occurred_at: model.occurred_at.with_timezone(&Utc),
            })
            .collect())
    }
}
