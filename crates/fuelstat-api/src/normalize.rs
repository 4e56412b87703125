//! Normalization of raw API records into a [`TransactionTable`]
//!
//! Nothing here fails: values that do not parse become missing, absent
//! fields are backfilled, and unknown fields are carried through for export.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use fuelstat_core::columns::{self, lookup_with};
use fuelstat_core::timezone::TimezoneConfig;
use fuelstat_core::types::{Transaction, TransactionTable};
use serde_json::{Map, Value};
use tracing::debug;

/// Key of the record array in the endpoint's response
pub const RECORDS_KEY: &str = "abastecimentos";

const NAIVE_TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y"];

/// Coerce a JSON value to a finite number
///
/// Accepts numbers and numeric strings, including Brazilian `1.234,56`.
pub fn to_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<f64>().ok().or_else(|| {
                if s.contains(',') {
                    s.replace('.', "").replace(',', ".").parse::<f64>().ok()
                } else {
                    None
                }
            })
        }
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

/// Coerce a JSON value to text; numbers and booleans are stringified
pub fn to_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Parse a timestamp into station wall-clock time
pub fn parse_timestamp(value: &Value, tz: &TimezoneConfig) -> Option<NaiveDateTime> {
    let s = value.as_str()?.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(tz.localize(&dt));
    }
    NAIVE_TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| parse_date_str(s).and_then(|d| d.and_hms_opt(0, 0, 0)))
}

/// Parse a calendar date, accepting full timestamps too
pub fn parse_date(value: &Value, tz: &TimezoneConfig) -> Option<NaiveDate> {
    let s = value.as_str()?.trim();
    parse_date_str(s).or_else(|| parse_timestamp(value, tz).map(|dt| dt.date()))
}

fn parse_date_str(s: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

/// Normalize one API object
pub fn normalize_record(record: Map<String, Value>, tz: &TimezoneConfig) -> Transaction {
    let text = |field: &str| lookup_with(&record, &[field], to_text);
    let number = |field: &str| lookup_with(&record, &[field], to_number);

    let mut tx = Transaction {
        registered_at: lookup_with(&record, &[columns::REGISTERED_AT], |v| {
            parse_timestamp(v, tz)
        }),
        date: lookup_with(&record, &[columns::DATE], |v| parse_date(v, tz)),
        liters: lookup_with(&record, columns::LITERS_CANDIDATES, to_number),
        value: number(columns::VALUE),
        unit_price: number(columns::UNIT_PRICE),
        totalizer: number(columns::TOTALIZER),
        product: text(columns::PRODUCT),
        employee_id: text(columns::EMPLOYEE_ID),
        employee_name: text(columns::EMPLOYEE_NAME),
        seller_name: text(columns::SELLER_NAME),
        level_id: text(columns::LEVEL_ID),
        level: text(columns::LEVEL),
        raw: Map::new(),
    };
    tx.raw = record;
    tx
}

/// Pull the record array out of a response body
///
/// A missing key, a non-object body, or a non-array value all mean no rows.
pub fn extract_records(body: Value) -> Vec<Map<String, Value>> {
    let records = match body {
        Value::Object(mut map) => match map.remove(RECORDS_KEY) {
            Some(Value::Array(items)) => items,
            Some(other) => {
                debug!("'{}' is not an array ({}), treating as empty", RECORDS_KEY, kind(&other));
                Vec::new()
            }
            None => {
                debug!("Response has no '{}' key, treating as empty", RECORDS_KEY);
                Vec::new()
            }
        },
        other => {
            debug!("Response body is {}, treating as empty", kind(&other));
            Vec::new()
        }
    };

    let total = records.len();
    let objects: Vec<Map<String, Value>> = records
        .into_iter()
        .filter_map(|item| match item {
            Value::Object(map) => Some(map),
            _ => None,
        })
        .collect();
    if objects.len() < total {
        debug!("Skipped {} non-object records", total - objects.len());
    }
    objects
}

/// Build a table from a response body
///
/// Columns are the requested projection, then any other key the API
/// returned, then the backfill and derived columns.
pub fn normalize_response(
    body: Value,
    select_fields: &[String],
    tz: &TimezoneConfig,
) -> TransactionTable {
    let records = extract_records(body);

    let mut columns_seen: Vec<String> = select_fields.to_vec();
    for record in &records {
        for key in record.keys() {
            if !columns_seen.contains(key) {
                columns_seen.push(key.clone());
            }
        }
    }

    let rows = records
        .into_iter()
        .map(|record| normalize_record(record, tz))
        .collect();

    TransactionTable::new(columns_seen, rows)
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
