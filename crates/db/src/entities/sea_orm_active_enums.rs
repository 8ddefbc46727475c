//! Database enum mappings.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Leave balance field, as stored in the `leave_field` enum.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "leave_field")]
pub enum LeaveField {
    /// Casual leave.
    #[sea_orm(string_value = "casual")]
    Casual,
    /// Sick leave.
    #[sea_orm(string_value = "sick")]
    Sick,
    /// Loss-of-pay leave.
    #[sea_orm(string_value = "lop")]
    Lop,
}

/// Mutation reason, as stored in the `adjustment_reason` enum.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "adjustment_reason")]
pub enum AdjustmentReason {
    /// Monthly accrual credit.
    #[sea_orm(string_value = "accrual")]
    Accrual,
    /// Ad-hoc HR adjustment.
    #[sea_orm(string_value = "manual_adjustment")]
    ManualAdjustment,
    /// LOP to casual conversion.
    #[sea_orm(string_value = "conversion")]
    Conversion,
    /// Deduction for an approved leave request.
    #[sea_orm(string_value = "consumption")]
    Consumption,
}
