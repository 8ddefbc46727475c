//! Repository implementations of the core storage ports.
//!
//! Repositories hide the `SeaORM` implementation details behind the traits
//! defined in `staffline-core`, so the ledger service never sees the
//! database directly.

pub mod balance;
pub mod directory;

pub use balance::SqlBalanceStore;
pub use directory::SqlEmployeeDirectory;
