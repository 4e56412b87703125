//! Error types for fuelstat
//!
//! This module defines the error types used throughout the fuelstat crates.
//! All errors are derived from `thiserror` for convenient error handling
//! and automatic `From` implementations.
//!
//! # Example
//!
//! ```
//! use fuelstat_core::error::{FuelstatError, Result};
//!
//! fn example_function() -> Result<()> {
//!     // This will automatically convert io::Error to FuelstatError
//!     let _file = std::fs::read_to_string("nonexistent.txt")?;
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// Main error type for fuelstat operations
///
/// This enum encompasses all possible errors that can occur while talking
/// to the transaction API, the language-model API, or writing output.
#[derive(Error, Debug)]
pub enum FuelstatError {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV writing error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Network or HTTP status error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Required credentials are missing from the environment
    #[error("Missing credentials: set {0} in the environment or .env file")]
    MissingCredentials(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid date or time format
    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    /// Invalid timezone
    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    /// Invalid argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The token endpoint answered successfully but carried no token
    #[error("Token endpoint returned no token (looked for token, access_token, jwt)")]
    TokenMissing,

    /// The language model answered with something that is not a valid command
    #[error("Assistant returned an invalid command ({reason}):\n{raw}")]
    AssistantResponse {
        /// Why the reply was rejected
        reason: String,
        /// The raw reply, shown for diagnosis
        raw: String,
    },
}

/// Convenience type alias for Results in fuelstat
pub type Result<T> = std::result::Result<T, FuelstatError>;
