//! Core types, configuration, and aggregation for fuelstat
//!
//! This crate provides the foundational types, error handling,
//! environment configuration, timezone handling, and the pure
//! aggregation functions used by all other fuelstat crates.

pub mod aggregation;
pub mod aggregation_types;
pub mod columns;
pub mod config;
pub mod error;
pub mod timezone;
pub mod types;

#[cfg(test)]
pub mod test_utils;

// Re-export commonly used types
pub use aggregation_types::{DailyAggregate, EmployeeAggregate, Kpis};
pub use error::{FuelstatError, Result};
pub use types::{ChartMode, Transaction, TransactionTable};
