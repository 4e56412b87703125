//! Field names of the transaction API and ordered-candidate lookups
//!
//! The API is not consistent about field names across installations, so
//! every read that has alternatives goes through [`lookup`] or
//! [`lookup_with`] with an ordered list of candidate names.

use serde_json::{Map, Value};

pub const REGISTERED_AT: &str = "dhRegistro";
pub const DATE: &str = "data";
pub const VALUE: &str = "valor";
pub const LITERS: &str = "litragem";
pub const UNIT_PRICE: &str = "valorUnitario";
pub const TOTALIZER: &str = "encerrante";
pub const PRODUCT: &str = "produto";
pub const EMPLOYEE_ID: &str = "idFuncionario";
pub const EMPLOYEE_NAME: &str = "nomeFuncionario";
pub const SELLER_NAME: &str = "nomeVendedor";
pub const LEVEL_ID: &str = "idNivel";
pub const LEVEL: &str = "nivel";

pub const DERIVED_DAY: &str = "dia";
pub const DERIVED_MONTH: &str = "mes";
pub const DERIVED_HOUR: &str = "hora_num";

/// Liters, in order of preference
pub const LITERS_CANDIDATES: &[&str] = &[LITERS, "litros", "quantidade"];

/// Staff name used for per-employee summaries, in order of preference
pub const EMPLOYEE_NAME_CANDIDATES: &[&str] = &[EMPLOYEE_NAME, SELLER_NAME];

/// Fields the dashboard always requests in `$select`
pub const REQUIRED_FIELDS: &[&str] = &[
    REGISTERED_AT,
    VALUE,
    LITERS,
    PRODUCT,
    EMPLOYEE_ID,
    EMPLOYEE_NAME,
    LEVEL_ID,
    LEVEL,
];

/// Fields coerced to numbers
pub const NUMERIC_FIELDS: &[&str] = &[VALUE, LITERS, UNIT_PRICE, TOTALIZER];

/// Columns every transaction table carries, even with zero rows
pub const BACKFILL_FIELDS: &[&str] = &[
    REGISTERED_AT,
    VALUE,
    LITERS,
    PRODUCT,
    EMPLOYEE_ID,
    EMPLOYEE_NAME,
    LEVEL_ID,
    LEVEL,
    DATE,
    UNIT_PRICE,
    TOTALIZER,
];

/// Columns derived from the registration timestamp
pub const DERIVED_FIELDS: &[&str] = &[DERIVED_DAY, DERIVED_MONTH, DERIVED_HOUR];

/// First candidate whose value converts successfully
pub fn lookup_with<T, F>(record: &Map<String, Value>, candidates: &[&str], convert: F) -> Option<T>
where
    F: Fn(&Value) -> Option<T>,
{
    candidates
        .iter()
        .filter_map(|name| record.get(*name))
        .find_map(convert)
}

/// First available value among already-extracted alternatives
pub fn first_available<T>(candidates: impl IntoIterator<Item = Option<T>>) -> Option<T> {
    candidates.into_iter().flatten().next()
}
