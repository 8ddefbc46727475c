//! Shared types and configuration for Staffline.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for type-safe entity references
//! - Application-wide configuration management

pub mod config;
pub mod types;

pub use config::AppConfig;
