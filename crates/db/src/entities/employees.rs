//! `SeaORM` Entity for the employees table.
//!
//! Owned by the user-management subsystem; the ledger reads it for the
//! roster and eligibility checks and never mutates it.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "employees")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub is_active: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::leave_balances::Entity")]
    LeaveBalances,
    #[sea_orm(has_many = "super::leave_balance_audit::Entity")]
    LeaveBalanceAudit,
}

impl Related<super::leave_balances::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LeaveBalances.def()
    }
}

impl Related<super::leave_balance_audit::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LeaveBalanceAudit.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
