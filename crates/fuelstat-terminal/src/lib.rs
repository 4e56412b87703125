//! Terminal output formatting for fuelstat
//!
//! This crate provides table and JSON output formatters, terminal charts
//! for the daily trend and employee ranking, Brazilian number formatting,
//! and CSV export.

pub mod charts;
pub mod export;
pub mod format;
pub mod output;

pub use charts::ChartRenderer;
pub use output::{DashboardView, JsonFormatter, OutputFormatter, TableFormatter, get_formatter};
