//! Aggregation of transaction tables into dashboard summaries
//!
//! All functions are pure and never fail: missing numeric values are skipped
//! in sums, and rows lacking a grouping key are left out of that grouping.
//!
//! # Examples
//!
//! ```
//! use fuelstat_core::aggregation::{daily_trend, employee_summary, kpis};
//! use fuelstat_core::types::TransactionTable;
//!
//! let table = TransactionTable::default();
//! assert_eq!(kpis(&table).as_tuple(), (0, 0.0, 0.0, 0.0));
//! assert!(daily_trend(&table).is_empty());
//! assert!(employee_summary(&table).is_empty());
//! ```

use crate::aggregation_types::{DailyAggregate, EmployeeAggregate, Kpis, OTHERS_LABEL};
use crate::types::TransactionTable;
use chrono::NaiveDate;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Count, total liters, total value, and average ticket
pub fn kpis(table: &TransactionTable) -> Kpis {
    let count = table.len();
    let total_liters: f64 = table.rows().iter().filter_map(|r| r.liters).sum();
    let total_value: f64 = table.rows().iter().filter_map(|r| r.value).sum();
    let average_ticket = if count > 0 {
        total_value / count as f64
    } else {
        0.0
    };

    Kpis {
        count,
        total_liters,
        total_value,
        average_ticket,
    }
}

/// Value and liters summed per calendar day, ascending by day
pub fn daily_trend(table: &TransactionTable) -> Vec<DailyAggregate> {
    let mut days: BTreeMap<NaiveDate, (f64, f64)> = BTreeMap::new();
    let mut undated = 0usize;

    for row in table.rows() {
        let Some(day) = row.trend_day() else {
            undated += 1;
            continue;
        };
        let entry = days.entry(day).or_insert((0.0, 0.0));
        entry.0 += row.value.unwrap_or(0.0);
        entry.1 += row.liters.unwrap_or(0.0);
    }

    if undated > 0 {
        debug!("{} transactions without a usable date left out of the trend", undated);
    }

    days.into_iter()
        .map(|(day, (total_value, total_liters))| DailyAggregate {
            day,
            total_value,
            total_liters,
        })
        .collect()
}

/// Revenue per employee, strictly descending by value
///
/// Ties are ordered by name so output is stable.
pub fn employee_summary(table: &TransactionTable) -> Vec<EmployeeAggregate> {
    let mut totals: HashMap<&str, f64> = HashMap::new();

    for row in table.rows() {
        if let Some(name) = row.staff_name() {
            *totals.entry(name).or_insert(0.0) += row.value.unwrap_or(0.0);
        }
    }

    let mut summary: Vec<EmployeeAggregate> = totals
        .into_iter()
        .map(|(name, total_value)| EmployeeAggregate {
            employee_name: name.to_string(),
            total_value,
        })
        .collect();
    summary.sort_by(compare_by_value_desc);
    summary
}

/// Keep the first `n` employees and fold the rest into one "Outros" row
///
/// The input is expected in the order produced by [`employee_summary`].
pub fn top_with_others(summary: &[EmployeeAggregate], n: usize) -> Vec<EmployeeAggregate> {
    if summary.len() <= n {
        return summary.to_vec();
    }

    let mut top = summary[..n].to_vec();
    let rest: f64 = summary[n..].iter().map(|e| e.total_value).sum();
    top.push(EmployeeAggregate {
        employee_name: OTHERS_LABEL.to_string(),
        total_value: rest,
    });
    top
}

fn compare_by_value_desc(a: &EmployeeAggregate, b: &EmployeeAggregate) -> Ordering {
    b.total_value
        .partial_cmp(&a.total_value)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.employee_name.cmp(&b.employee_name))
}
