//! Output formatting module for fuelstat
//!
//! This module provides formatters for displaying dashboard data in different formats:
//! - Table format with terminal charts for human-readable output
//! - JSON format for machine-readable output and integration with other tools
//!
//! # Examples
//!
//! ```
//! use fuelstat_terminal::output::get_formatter;
//! use fuelstat_core::aggregation_types::Kpis;
//!
//! let kpis = Kpis { count: 2, total_liters: 40.0, total_value: 240.0, average_ticket: 120.0 };
//!
//! let table = get_formatter(false, false).format_kpis(&kpis);
//! assert!(table.contains("R$ 240,00"));
//!
//! let json = get_formatter(true, false).format_kpis(&kpis);
//! assert!(json.contains("\"total_value\": 240.0"));
//! ```

use crate::charts::ChartRenderer;
use crate::format::{format_br_currency, format_br_date, format_count, format_liters};
use chrono::Duration;
use fuelstat_core::aggregation::top_with_others;
use fuelstat_core::aggregation_types::{DailyAggregate, EmployeeAggregate, Kpis, Totals};
use fuelstat_core::types::{ChartMode, TimeWindow};
use prettytable::{Cell, Row, Table, format, row};
use serde_json::{Value, json};

/// Everything one dashboard render shows
#[derive(Debug, Clone)]
pub struct DashboardView<'a> {
    pub window: Option<TimeWindow>,
    pub kpis: &'a Kpis,
    /// Omitted from the render when `None`
    pub trend: Option<&'a [DailyAggregate]>,
    pub employees: &'a [EmployeeAggregate],
    pub mode: ChartMode,
    pub top_n: usize,
}

/// Trait for output formatters
///
/// Implementations provide different output formats for the three dashboard
/// sections and for the combined dashboard.
pub trait OutputFormatter {
    /// Format the KPI summary
    fn format_kpis(&self, kpis: &Kpis) -> String;

    /// Format the daily trend in the given chart style
    fn format_trend(&self, data: &[DailyAggregate], mode: ChartMode) -> String;

    /// Format the employee ranking, folding everyone beyond `top_n`
    fn format_employees(&self, data: &[EmployeeAggregate], top_n: usize) -> String;

    /// Format every section together
    fn format_dashboard(&self, view: &DashboardView<'_>) -> String;
}

/// Table formatter for human-readable output
///
/// Produces ASCII tables with Brazilian number formatting, followed by a
/// terminal chart where the section has one.
pub struct TableFormatter {
    charts: ChartRenderer,
}

impl Default for TableFormatter {
    fn default() -> Self {
        Self::new(ChartRenderer::new())
    }
}

impl TableFormatter {
    pub fn new(charts: ChartRenderer) -> Self {
        Self { charts }
    }

    fn new_table() -> Table {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
        table
    }

    fn format_window(window: &TimeWindow) -> String {
        let last_minute = window.end - Duration::minutes(1);
        format!(
            "Período: {} até {}\n",
            window.start.format("%d/%m/%Y %H:%M"),
            last_minute.format("%d/%m/%Y %H:%M")
        )
    }
}

impl OutputFormatter for TableFormatter {
    fn format_kpis(&self, kpis: &Kpis) -> String {
        let mut table = Self::new_table();
        table.set_titles(row![
            b -> "Abastecimentos",
            b -> "Litros",
            b -> "Faturamento",
            b -> "Ticket médio"
        ]);
        table.add_row(row![
            r -> format_count(kpis.count),
            r -> format_liters(kpis.total_liters),
            r -> format_br_currency(kpis.total_value),
            r -> format_br_currency(kpis.average_ticket)
        ]);
        table.to_string()
    }

    fn format_trend(&self, data: &[DailyAggregate], mode: ChartMode) -> String {
        let mut table = Self::new_table();
        table.set_titles(row![b -> "Dia", b -> "Litros", b -> "Faturamento"]);

        for day in data {
            table.add_row(row![
                format_br_date(day.day),
                r -> format_liters(day.total_liters),
                r -> format_br_currency(day.total_value)
            ]);
        }

        let totals = Totals::from_daily(data);
        table.add_row(Row::new(vec![Cell::new(""); 3]));
        table.add_row(row![
            b -> "TOTAL",
            b -> format_liters(totals.total_liters),
            b -> format_br_currency(totals.total_value)
        ]);

        let mut output = table.to_string();
        output.push('\n');
        output.push_str(&self.charts.render_trend(data, mode));
        output
    }

    fn format_employees(&self, data: &[EmployeeAggregate], top_n: usize) -> String {
        let ranking = top_with_others(data, top_n);

        let mut table = Self::new_table();
        table.set_titles(row![b -> "#", b -> "Colaborador", b -> "Faturamento"]);
        for (index, employee) in ranking.iter().enumerate() {
            let position = if index < top_n {
                (index + 1).to_string()
            } else {
                "-".to_string()
            };
            table.add_row(row![
                c -> position,
                employee.employee_name,
                r -> format_br_currency(employee.total_value)
            ]);
        }

        let mut output = table.to_string();
        output.push('\n');
        output.push_str(&self.charts.render_employees(&ranking));
        output
    }

    fn format_dashboard(&self, view: &DashboardView<'_>) -> String {
        let mut output = String::new();
        if let Some(window) = &view.window {
            output.push_str(&Self::format_window(window));
            output.push('\n');
        }
        output.push_str("=== Indicadores ===\n");
        output.push_str(&self.format_kpis(view.kpis));
        if let Some(trend) = view.trend {
            output.push_str("\n=== Tendência diária ===\n");
            output.push_str(&self.format_trend(trend, view.mode));
        }
        output.push_str(&format!("\n=== Top {} colaboradores ===\n", view.top_n));
        output.push_str(&self.format_employees(view.employees, view.top_n));
        output
    }
}

/// JSON formatter for machine-readable output
///
/// Values are raw numbers; formatting is left to the consumer.
pub struct JsonFormatter;

impl JsonFormatter {
    fn kpis_json(kpis: &Kpis) -> Value {
        json!({
            "count": kpis.count,
            "total_liters": kpis.total_liters,
            "total_value": kpis.total_value,
            "average_ticket": kpis.average_ticket,
        })
    }

    fn trend_json(data: &[DailyAggregate], mode: ChartMode) -> Value {
        let totals = Totals::from_daily(data);
        json!({
            "mode": mode.to_string(),
            "daily": data.iter().map(|d| json!({
                "day": d.day.format("%Y-%m-%d").to_string(),
                "total_value": d.total_value,
                "total_liters": d.total_liters,
            })).collect::<Vec<_>>(),
            "totals": {
                "total_value": totals.total_value,
                "total_liters": totals.total_liters,
            }
        })
    }

    fn employees_json(data: &[EmployeeAggregate], top_n: usize) -> Value {
        json!({
            "top_n": top_n,
            "employees": top_with_others(data, top_n).iter().map(|e| json!({
                "employee_name": e.employee_name,
                "total_value": e.total_value,
            })).collect::<Vec<_>>(),
        })
    }
}

fn to_pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

impl OutputFormatter for JsonFormatter {
    fn format_kpis(&self, kpis: &Kpis) -> String {
        to_pretty(&json!({ "kpis": Self::kpis_json(kpis) }))
    }

    fn format_trend(&self, data: &[DailyAggregate], mode: ChartMode) -> String {
        to_pretty(&json!({ "trend": Self::trend_json(data, mode) }))
    }

    fn format_employees(&self, data: &[EmployeeAggregate], top_n: usize) -> String {
        to_pretty(&json!({ "top_employees": Self::employees_json(data, top_n) }))
    }

    fn format_dashboard(&self, view: &DashboardView<'_>) -> String {
        let window = view.window.map(|w| {
            json!({
                "start": w.start.format("%Y-%m-%dT%H:%M:%S").to_string(),
                "end": w.end.format("%Y-%m-%dT%H:%M:%S").to_string(),
            })
        });
        to_pretty(&json!({
            "window": window,
            "kpis": Self::kpis_json(view.kpis),
            "trend": view.trend.map(|t| Self::trend_json(t, view.mode)),
            "top_employees": Self::employees_json(view.employees, view.top_n),
        }))
    }
}

/// Create a formatter: JSON when `json` is set, tables and charts otherwise
///
/// `color` is ANDed with the NO_COLOR check, so passing `true` never forces
/// color on.
pub fn get_formatter(json: bool, color: bool) -> Box<dyn OutputFormatter> {
    if json {
        Box::new(JsonFormatter)
    } else if color {
        Box::new(TableFormatter::default())
    } else {
        Box::new(TableFormatter::new(ChartRenderer::new().with_color(false)))
    }
}
