//! Shared test utilities for unit tests
//!
//! Integration tests cannot see this module (it is `#[cfg(test)]`); they keep
//! their own helpers in `tests/common/mod.rs`.

use crate::types::Transaction;
use chrono::{NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use std::env;

// Serializes environment variable modifications across tests
pub static ENV_MUTEX: Lazy<tokio::sync::Mutex<()>> = Lazy::new(|| tokio::sync::Mutex::new(()));

/// RAII guard that restores environment variables on drop
pub struct EnvVarGuard {
    vars: Vec<(String, Option<String>)>,
}

impl EnvVarGuard {
    pub fn new() -> Self {
        Self { vars: Vec::new() }
    }

    pub fn set(&mut self, key: &str, value: &str) {
        let original = env::var(key).ok();
        self.vars.push((key.to_string(), original));
        // env::set_var is unsafe since Rust 2024; callers hold ENV_MUTEX
        unsafe {
            env::set_var(key, value);
        }
    }

    pub fn remove(&mut self, key: &str) {
        let original = env::var(key).ok();
        self.vars.push((key.to_string(), original));
        unsafe {
            env::remove_var(key);
        }
    }
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        for (key, value) in self.vars.iter().rev() {
            unsafe {
                match value {
                    Some(v) => env::set_var(key, v),
                    None => env::remove_var(key),
                }
            }
        }
    }
}

impl Default for EnvVarGuard {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for test transactions
#[derive(Default)]
pub struct TransactionBuilder {
    tx: Transaction,
}

impl TransactionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registration timestamp as `YYYY-MM-DD HH:MM:SS`
    pub fn at(mut self, ts: &str) -> Self {
        self.tx.registered_at = NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M:%S").ok();
        self
    }

    /// Explicit `data` date as `YYYY-MM-DD`
    pub fn date(mut self, day: &str) -> Self {
        self.tx.date = NaiveDate::parse_from_str(day, "%Y-%m-%d").ok();
        self
    }

    pub fn value(mut self, value: f64) -> Self {
        self.tx.value = Some(value);
        self
    }

    pub fn liters(mut self, liters: f64) -> Self {
        self.tx.liters = Some(liters);
        self
    }

    pub fn employee(mut self, name: &str) -> Self {
        self.tx.employee_name = Some(name.to_string());
        self
    }

    pub fn seller(mut self, name: &str) -> Self {
        self.tx.seller_name = Some(name.to_string());
        self
    }

    pub fn build(self) -> Transaction {
        self.tx
    }
}
