//! Aggregation data types for fuelstat
//!
//! Pure data structures produced by the aggregation functions.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Label of the bucket that folds employees beyond the top N
pub const OTHERS_LABEL: &str = "Outros";

/// Summary indicators for a query window
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Kpis {
    /// Number of transactions
    pub count: usize,
    /// Sum of liters dispensed
    pub total_liters: f64,
    /// Sum of transaction values
    pub total_value: f64,
    /// Average value per transaction, 0 when there are none
    pub average_ticket: f64,
}

impl Kpis {
    /// Tuple form `(count, liters, value, average)`
    pub fn as_tuple(&self) -> (usize, f64, f64, f64) {
        (
            self.count,
            self.total_liters,
            self.total_value,
            self.average_ticket,
        )
    }
}

/// Totals for one calendar day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyAggregate {
    pub day: NaiveDate,
    pub total_value: f64,
    pub total_liters: f64,
}

/// Revenue attributed to one employee
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeAggregate {
    pub employee_name: String,
    pub total_value: f64,
}

/// Totals across a set of daily aggregates
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    pub total_value: f64,
    pub total_liters: f64,
}

impl Totals {
    pub fn from_daily(daily: &[DailyAggregate]) -> Self {
        let mut totals = Self::default();
        for day in daily {
            totals.total_value += day.total_value;
            totals.total_liters += day.total_liters;
        }
        totals
    }
}
