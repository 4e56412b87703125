//! OData-style query construction
//!
//! Builds the `$select`, `$orderby`, `$filter`, and `$top` parameters for
//! the transaction endpoint and encodes them so the filter grammar's
//! parentheses, colons, commas, and quotes reach the server unescaped.
//!
//! # Examples
//!
//! ```
//! use chrono::NaiveDate;
//! use fuelstat_api::query::{FilterParams, build_filter};
//!
//! let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let params = FilterParams::new()
//!     .with_start(day.and_hms_opt(0, 0, 0).unwrap())
//!     .with_end(day.and_hms_opt(12, 0, 0).unwrap())
//!     .with_product("DIESEL");
//!
//! assert_eq!(
//!     build_filter(&params).unwrap().as_deref(),
//!     Some("dhRegistro ge 2024-01-01T00:00:00 and dhRegistro lt 2024-01-01T12:00:00 and contains(produto, 'DIESEL')")
//! );
//! ```

use chrono::NaiveDateTime;
use fuelstat_core::columns;
use fuelstat_core::error::{FuelstatError, Result};
use fuelstat_core::types::TimeWindow;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use std::time::Duration;

/// Projection requested when the caller does not choose one
pub const DEFAULT_SELECT: &[&str] = &[
    "idAbastecimento",
    "idBico",
    "situacao",
    "idProduto",
    "produto",
    "data",
    "hora",
    "dhRegistro",
    "litragem",
    "valorUnitario",
    "encerrante",
    "valor",
    "codVenda",
    "idFuncionario",
    "nomeFuncionario",
    "idVendedor",
    "nomeVendedor",
    "idNivel",
    "nivel",
];

pub const DEFAULT_ORDER_BY: &str = "dhRegistro asc";

/// Timestamp format used in range predicates
pub const FILTER_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Characters left literal in query keys and values, besides alphanumerics
///
/// Space is also left out of the set and turned into `+` afterwards.
const QUERY_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b' ')
    .remove(b',')
    .remove(b':')
    .remove(b'(')
    .remove(b')')
    .remove(b'\'');

/// Inputs of a `$filter` expression
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FilterParams {
    /// Inclusive lower bound on `dhRegistro`
    pub start: Option<NaiveDateTime>,
    /// Exclusive upper bound on `dhRegistro`
    pub end: Option<NaiveDateTime>,
    /// Pre-built predicate appended verbatim when non-empty
    pub extra: Option<String>,
    pub product: Option<String>,
    pub employee: Option<String>,
    pub level: Option<String>,
}

impl FilterParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_start(mut self, start: NaiveDateTime) -> Self {
        self.start = Some(start);
        self
    }

    pub fn with_end(mut self, end: NaiveDateTime) -> Self {
        self.end = Some(end);
        self
    }

    pub fn with_window(self, window: TimeWindow) -> Self {
        self.with_start(window.start).with_end(window.end)
    }

    pub fn with_extra(mut self, extra: impl Into<String>) -> Self {
        self.extra = Some(extra.into());
        self
    }

    pub fn with_product(mut self, product: impl Into<String>) -> Self {
        self.product = Some(product.into());
        self
    }

    pub fn with_employee(mut self, employee: impl Into<String>) -> Self {
        self.employee = Some(employee.into());
        self
    }

    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = Some(level.into());
        self
    }
}

/// Double single quotes for use inside an OData string literal
pub fn escape_literal(value: &str) -> String {
    value.replace('\'', "''")
}

fn contains_predicate(field: &str, value: Option<&str>) -> Option<String> {
    let value = value.map(str::trim).filter(|v| !v.is_empty())?;
    Some(format!("contains({field}, '{}')", escape_literal(value)))
}

/// Build the `$filter` expression, or `None` when nothing constrains the query
///
/// The range is half-open: `ge start` and `lt end`. A start that is not
/// strictly before the end is rejected.
pub fn build_filter(params: &FilterParams) -> Result<Option<String>> {
    if let (Some(start), Some(end)) = (params.start, params.end) {
        if start >= end {
            return Err(FuelstatError::InvalidArgument(format!(
                "filter start {} is not before end {}; the end bound is exclusive",
                start.format(FILTER_TIMESTAMP_FORMAT),
                end.format(FILTER_TIMESTAMP_FORMAT)
            )));
        }
    }

    let mut parts: Vec<String> = Vec::new();

    if let Some(start) = params.start {
        parts.push(format!(
            "{} ge {}",
            columns::REGISTERED_AT,
            start.format(FILTER_TIMESTAMP_FORMAT)
        ));
    }
    if let Some(end) = params.end {
        parts.push(format!(
            "{} lt {}",
            columns::REGISTERED_AT,
            end.format(FILTER_TIMESTAMP_FORMAT)
        ));
    }

    if let Some(extra) = params.extra.as_deref().filter(|e| !e.is_empty()) {
        parts.push(extra.to_string());
    }

    parts.extend(contains_predicate(columns::PRODUCT, params.product.as_deref()));
    parts.extend(contains_predicate(
        columns::EMPLOYEE_NAME,
        params.employee.as_deref(),
    ));
    parts.extend(contains_predicate(columns::LEVEL, params.level.as_deref()));

    if parts.is_empty() {
        Ok(None)
    } else {
        Ok(Some(parts.join(" and ")))
    }
}

/// Merge the caller's `$select` with the fields the dashboard needs
///
/// Caller fields keep their order; blanks and duplicates are dropped; any
/// missing required field is appended.
pub fn ensure_select_fields(requested: Option<&str>) -> Vec<String> {
    let mut fields: Vec<String> = Vec::new();

    for field in requested.unwrap_or_default().split(',').map(str::trim) {
        if !field.is_empty() && !fields.iter().any(|f| f == field) {
            fields.push(field.to_string());
        }
    }
    for required in columns::REQUIRED_FIELDS {
        if !fields.iter().any(|f| f == required) {
            fields.push((*required).to_string());
        }
    }

    fields
}

/// A request against the transaction endpoint
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Query {
    /// Comma-separated projection; required fields are always added
    pub select: Option<String>,
    pub order_by: Option<String>,
    pub filter: Option<String>,
    /// Row limit; `None` or 0 sends no `$top`
    pub top: Option<u32>,
    /// Overrides the client's per-request timeout
    pub timeout: Option<Duration>,
}

impl Default for Query {
    fn default() -> Self {
        Self {
            select: Some(DEFAULT_SELECT.join(",")),
            order_by: Some(DEFAULT_ORDER_BY.to_string()),
            filter: None,
            top: None,
            timeout: None,
        }
    }
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filter(mut self, filter: Option<String>) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_select(mut self, select: impl Into<String>) -> Self {
        self.select = Some(select.into());
        self
    }

    pub fn with_order_by(mut self, order_by: Option<String>) -> Self {
        self.order_by = order_by;
        self
    }

    pub fn with_top(mut self, top: u32) -> Self {
        self.top = Some(top);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Projection actually sent, required fields included
    pub fn select_fields(&self) -> Vec<String> {
        ensure_select_fields(self.select.as_deref())
    }

    /// Ordered `(key, value)` query parameters
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("$select", self.select_fields().join(","))];
        if let Some(order_by) = self.order_by.as_deref().filter(|o| !o.is_empty()) {
            params.push(("$orderby", order_by.to_string()));
        }
        if let Some(filter) = self.filter.as_deref().filter(|f| !f.is_empty()) {
            params.push(("$filter", filter.to_string()));
        }
        if let Some(top) = self.top.filter(|t| *t > 0) {
            params.push(("$top", top.to_string()));
        }
        params
    }

    /// Encoded query string, without the leading `?`
    pub fn query_string(&self) -> String {
        self.params()
            .iter()
            .map(|(key, value)| format!("{}={}", encode_component(key), encode_component(value)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// Form-encode one key or value, keeping the OData-safe characters literal
pub fn encode_component(input: &str) -> String {
    utf8_percent_encode(input, QUERY_ENCODE_SET)
        .to_string()
        .replace(' ', "+")
}
