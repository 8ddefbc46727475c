//! `SeaORM` entity definitions.

pub mod accrual_runs;
pub mod employees;
pub mod leave_balance_audit;
pub mod leave_balances;
pub mod sea_orm_active_enums;
