//! Core domain types for fuelstat
//!
//! A [`TransactionTable`] is the normalized result of one query against the
//! transaction API: one [`Transaction`] per fuel dispensing event plus the
//! ordered list of columns the table exposes for export.

use crate::columns;
use crate::error::{FuelstatError, Result};
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// One fuel dispensing event
///
/// Normalized fields are optional: the API may omit any of them, and values
/// that fail to parse are treated as missing. The raw API object is kept
/// for export.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub registered_at: Option<NaiveDateTime>,
    pub date: Option<NaiveDate>,
    pub liters: Option<f64>,
    pub value: Option<f64>,
    pub unit_price: Option<f64>,
    pub totalizer: Option<f64>,
    pub product: Option<String>,
    pub employee_id: Option<String>,
    pub employee_name: Option<String>,
    pub seller_name: Option<String>,
    pub level_id: Option<String>,
    pub level: Option<String>,
    #[serde(skip)]
    pub raw: Map<String, Value>,
}

impl Transaction {
    /// Calendar day of the registration timestamp
    pub fn day(&self) -> Option<NaiveDate> {
        self.registered_at.map(|dt| dt.date())
    }

    /// Month bucket of the registration timestamp, `YYYY-MM`
    pub fn month(&self) -> Option<String> {
        self.registered_at
            .map(|dt| format!("{:04}-{:02}", dt.year(), dt.month()))
    }

    /// Hour of day of the registration timestamp
    pub fn hour(&self) -> Option<u32> {
        self.registered_at.map(|dt| dt.hour())
    }

    /// Day used for daily trends: explicit date first, then registration day
    pub fn trend_day(&self) -> Option<NaiveDate> {
        columns::first_available([self.date, self.day()])
    }

    /// Name used for per-employee summaries: employee first, then seller
    pub fn staff_name(&self) -> Option<&str> {
        columns::first_available([self.employee_name.as_deref(), self.seller_name.as_deref()])
    }

    /// Render one column as text for export
    ///
    /// Normalized and derived columns use their normalized value; any other
    /// column is taken from the raw API object. Missing values are empty.
    pub fn column_text(&self, column: &str) -> String {
        fn num(v: Option<f64>) -> String {
            v.map(|n| n.to_string()).unwrap_or_default()
        }
        fn text(v: &Option<String>) -> String {
            v.clone().unwrap_or_default()
        }

        match column {
            columns::REGISTERED_AT => self
                .registered_at
                .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_default(),
            columns::DATE => self
                .date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            columns::LITERS => num(self.liters),
            columns::VALUE => num(self.value),
            columns::UNIT_PRICE => num(self.unit_price),
            columns::TOTALIZER => num(self.totalizer),
            columns::PRODUCT => text(&self.product),
            columns::EMPLOYEE_ID => text(&self.employee_id),
            columns::EMPLOYEE_NAME => text(&self.employee_name),
            columns::SELLER_NAME => text(&self.seller_name),
            columns::LEVEL_ID => text(&self.level_id),
            columns::LEVEL => text(&self.level),
            columns::DERIVED_DAY => self
                .day()
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            columns::DERIVED_MONTH => self.month().unwrap_or_default(),
            columns::DERIVED_HOUR => self.hour().map(|h| h.to_string()).unwrap_or_default(),
            other => match self.raw.get(other) {
                None | Some(Value::Null) => String::new(),
                Some(Value::String(s)) => s.clone(),
                Some(v) => v.to_string(),
            },
        }
    }
}

/// Normalized query result
///
/// `columns` always contains [`columns::BACKFILL_FIELDS`], so consumers can
/// rely on the full required-field set even when no rows came back.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionTable {
    columns: Vec<String>,
    rows: Vec<Transaction>,
}

impl Default for TransactionTable {
    fn default() -> Self {
        Self::new(Vec::new(), Vec::new())
    }
}

impl TransactionTable {
    /// Build a table, appending any backfill column that is missing
    ///
    /// Derived columns are appended when at least one row has a registration
    /// timestamp.
    pub fn new(columns: Vec<String>, rows: Vec<Transaction>) -> Self {
        let mut all: Vec<String> = Vec::with_capacity(columns.len() + 14);
        for column in columns {
            if !all.contains(&column) {
                all.push(column);
            }
        }
        for field in columns::BACKFILL_FIELDS {
            if !all.iter().any(|c| c == field) {
                all.push((*field).to_string());
            }
        }
        if rows.iter().any(|r| r.registered_at.is_some()) {
            for field in columns::DERIVED_FIELDS {
                if !all.iter().any(|c| c == field) {
                    all.push((*field).to_string());
                }
            }
        }
        Self { columns: all, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Transaction] {
        &self.rows
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Chart style for the daily trend
///
/// # Examples
/// ```
/// use fuelstat_core::types::ChartMode;
/// use std::str::FromStr;
///
/// assert_eq!(ChartMode::from_str("barras").unwrap(), ChartMode::Bars);
/// assert_eq!(ChartMode::Scatter.to_string(), "dispersao");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChartMode {
    #[default]
    #[serde(rename = "linha")]
    Line,
    #[serde(rename = "barras")]
    Bars,
    #[serde(rename = "area")]
    Area,
    #[serde(rename = "dispersao")]
    Scatter,
}

impl ChartMode {
    pub const ALL: [ChartMode; 4] = [Self::Line, Self::Bars, Self::Area, Self::Scatter];

    /// Lenient parse used for assistant output; unknown names render as bars
    pub fn from_name_or_bars(name: &str) -> Self {
        name.parse().unwrap_or(Self::Bars)
    }
}

impl fmt::Display for ChartMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Line => write!(f, "linha"),
            Self::Bars => write!(f, "barras"),
            Self::Area => write!(f, "area"),
            Self::Scatter => write!(f, "dispersao"),
        }
    }
}

impl std::str::FromStr for ChartMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "linha" => Ok(Self::Line),
            "barras" => Ok(Self::Bars),
            "area" | "área" => Ok(Self::Area),
            "dispersao" | "dispersão" => Ok(Self::Scatter),
            _ => Err(format!(
                "Invalid chart mode: {s} (expected linha, barras, area or dispersao)"
            )),
        }
    }
}

/// Half-open query window `[start, end)` in station wall-clock time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TimeWindow {
    /// Create a window, rejecting empty or inverted ranges
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Result<Self> {
        if start >= end {
            return Err(FuelstatError::InvalidArgument(format!(
                "window start {} must be before end {}",
                start.format("%Y-%m-%d %H:%M"),
                end.format("%Y-%m-%d %H:%M")
            )));
        }
        Ok(Self { start, end })
    }

    /// Window covering whole minutes from the start minute through the last minute
    ///
    /// The exclusive end is the minute after `last_minute`, so the chosen
    /// last minute is included.
    pub fn from_inclusive_minutes(
        start_date: NaiveDate,
        start_time: NaiveTime,
        end_date: NaiveDate,
        last_minute: NaiveTime,
    ) -> Result<Self> {
        let start = start_date.and_time(start_time);
        let end = end_date.and_time(last_minute) + Duration::minutes(1);
        Self::new(start, end)
    }

    /// First day of `today`'s month at 00:00 through `today` 23:59
    pub fn month_to_date(today: NaiveDate) -> Self {
        let (first, _) = month_bounds(today);
        let start = first.and_time(NaiveTime::MIN);
        let end = today.and_time(NaiveTime::MIN) + Duration::days(1);
        Self { start, end }
    }
}

/// First day of the month containing `date` and first day of the next month
pub fn month_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = date.with_day(1).unwrap_or(date);
    let next = if first.month() == 12 {
        NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)
    }
    .unwrap_or(first);
    (first, next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::str::FromStr;

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn test_derived_fields() {
        let tx = Transaction {
            registered_at: Some(ts("2024-02-29 17:45:00")),
            ..Default::default()
        };
        assert_eq!(tx.day(), NaiveDate::from_ymd_opt(2024, 2, 29));
        assert_eq!(tx.month().as_deref(), Some("2024-02"));
        assert_eq!(tx.hour(), Some(17));
    }

    #[test]
    fn test_trend_day_prefers_explicit_date() {
        let tx = Transaction {
            registered_at: Some(ts("2024-03-02 00:10:00")),
            date: NaiveDate::from_ymd_opt(2024, 3, 1),
            ..Default::default()
        };
        assert_eq!(tx.trend_day(), NaiveDate::from_ymd_opt(2024, 3, 1));

        let no_date = Transaction {
            registered_at: Some(ts("2024-03-02 00:10:00")),
            ..Default::default()
        };
        assert_eq!(no_date.trend_day(), NaiveDate::from_ymd_opt(2024, 3, 2));
    }

    #[test]
    fn test_staff_name_fallback() {
        let tx = Transaction {
            seller_name: Some("Bruno".to_string()),
            ..Default::default()
        };
        assert_eq!(tx.staff_name(), Some("Bruno"));
    }

    #[test]
    fn test_column_text_uses_raw_for_unknown_columns() {
        let mut raw = Map::new();
        raw.insert("codVenda".to_string(), json!(991));
        raw.insert("situacao".to_string(), json!("F"));
        let tx = Transaction {
            value: Some(12.5),
            raw,
            ..Default::default()
        };
        assert_eq!(tx.column_text("valor"), "12.5");
        assert_eq!(tx.column_text("codVenda"), "991");
        assert_eq!(tx.column_text("situacao"), "F");
        assert_eq!(tx.column_text("litragem"), "");
    }

    #[test]
    fn test_empty_table_has_backfill_columns() {
        let table = TransactionTable::default();
        assert!(table.is_empty());
        for field in columns::BACKFILL_FIELDS {
            assert!(table.has_column(field), "missing {field}");
        }
        assert!(!table.has_column(columns::DERIVED_DAY));
    }

    #[test]
    fn test_table_keeps_requested_order_without_duplicates() {
        let table = TransactionTable::new(
            vec!["produto".to_string(), "codVenda".to_string(), "produto".to_string()],
            vec![Transaction {
                registered_at: Some(ts("2024-01-01 08:00:00")),
                ..Default::default()
            }],
        );
        assert_eq!(&table.columns()[..2], ["produto", "codVenda"]);
        assert_eq!(
            table.columns().iter().filter(|c| *c == "produto").count(),
            1
        );
        assert!(table.has_column(columns::DERIVED_HOUR));
    }

    #[test]
    fn test_chart_mode_parsing() {
        for mode in ChartMode::ALL {
            assert_eq!(ChartMode::from_str(&mode.to_string()).unwrap(), mode);
        }
        assert!(ChartMode::from_str("pizza").is_err());
        assert_eq!(ChartMode::from_name_or_bars("pizza"), ChartMode::Bars);
        assert_eq!(ChartMode::default(), ChartMode::Line);
    }

    #[test]
    fn test_time_window_rejects_inverted_range() {
        let start = ts("2024-01-02 00:00:00");
        assert!(TimeWindow::new(start, start).is_err());
        assert!(TimeWindow::new(start, ts("2024-01-01 00:00:00")).is_err());
    }

    #[test]
    fn test_inclusive_minutes_adds_one_minute() {
        let day = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        let window = TimeWindow::from_inclusive_minutes(
            day,
            NaiveTime::MIN,
            day,
            NaiveTime::from_hms_opt(23, 59, 0).unwrap(),
        )
        .unwrap();
        assert_eq!(window.end, ts("2024-02-01 00:00:00"));
    }

    #[test]
    fn test_month_bounds_december() {
        let (first, next) = month_bounds(NaiveDate::from_ymd_opt(2023, 12, 15).unwrap());
        assert_eq!(first, NaiveDate::from_ymd_opt(2023, 12, 1).unwrap());
        assert_eq!(next, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    }

    #[test]
    fn test_month_to_date() {
        let window = TimeWindow::month_to_date(NaiveDate::from_ymd_opt(2024, 5, 20).unwrap());
        assert_eq!(window.start, ts("2024-05-01 00:00:00"));
        assert_eq!(window.end, ts("2024-05-21 00:00:00"));
    }
}
