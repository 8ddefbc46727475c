//! Core business logic for Staffline.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and the leave ledger service live here.
//!
//! # Modules
//!
//! - `leave` - Leave balance ledger, accrual engine, and adjustment rules

pub mod leave;
