//! Initial database migration.
//!
//! Creates the enums, the employees mirror table, the leave balance ledger
//! tables, and their indexes.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: EMPLOYEES (read-only mirror of user management)
        // ============================================================
        db.execute_unprepared(EMPLOYEES_SQL).await?;

        // ============================================================
        // PART 3: LEAVE BALANCE LEDGER
        // ============================================================
        db.execute_unprepared(LEAVE_BALANCES_SQL).await?;
        db.execute_unprepared(LEAVE_BALANCE_AUDIT_SQL).await?;
        db.execute_unprepared(ACCRUAL_RUNS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
-- Leave balance fields
CREATE TYPE leave_field AS ENUM (
    'casual',
    'sick',
    'lop'
);

-- Why a balance changed
CREATE TYPE adjustment_reason AS ENUM (
    'accrual',
    'manual_adjustment',
    'conversion',
    'consumption'
);
";

const EMPLOYEES_SQL: &str = r"
CREATE TABLE employees (
    id UUID PRIMARY KEY,
    full_name VARCHAR(255) NOT NULL,
    email VARCHAR(255) NOT NULL UNIQUE,
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_employees_active ON employees(is_active) WHERE is_active;
";

const LEAVE_BALANCES_SQL: &str = r"
CREATE TABLE leave_balances (
    employee_id UUID PRIMARY KEY REFERENCES employees(id) ON DELETE CASCADE,
    casual_balance NUMERIC(6,1) NOT NULL DEFAULT 0,
    sick_balance NUMERIC(6,1) NOT NULL DEFAULT 0,
    lop_balance NUMERIC(6,1) NOT NULL DEFAULT 0,
    version BIGINT NOT NULL DEFAULT 1,
    last_updated TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    created_by UUID NOT NULL REFERENCES employees(id),
    updated_by UUID NOT NULL REFERENCES employees(id),

    -- At-rest invariants: capped fields stay in [0, 99]; LOP may go negative
    CONSTRAINT chk_casual_balance_range CHECK (casual_balance >= 0 AND casual_balance <= 99),
    CONSTRAINT chk_sick_balance_range CHECK (sick_balance >= 0 AND sick_balance <= 99)
);
";

const LEAVE_BALANCE_AUDIT_SQL: &str = r"
CREATE TABLE leave_balance_audit (
    id UUID PRIMARY KEY,
    employee_id UUID NOT NULL REFERENCES employees(id) ON DELETE CASCADE,
    field leave_field NOT NULL,
    delta NUMERIC(6,1) NOT NULL,
    resulting_balance NUMERIC(6,1) NOT NULL,
    actor_id UUID NOT NULL REFERENCES employees(id),
    reason adjustment_reason NOT NULL,
    occurred_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_leave_balance_audit_employee
    ON leave_balance_audit(employee_id, occurred_at DESC);
";

const ACCRUAL_RUNS_SQL: &str = r"
CREATE TABLE accrual_runs (
    employee_id UUID NOT NULL REFERENCES employees(id) ON DELETE CASCADE,
    year INTEGER NOT NULL,
    month INTEGER NOT NULL CHECK (month >= 1 AND month <= 12),
    credited_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    -- One credit per employee per calendar month
    PRIMARY KEY (employee_id, year, month)
);
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS accrual_runs;
DROP TABLE IF EXISTS leave_balance_audit;
DROP TABLE IF EXISTS leave_balances;
DROP TABLE IF EXISTS employees;
DROP TYPE IF EXISTS adjustment_reason;
DROP TYPE IF EXISTS leave_field;
";
