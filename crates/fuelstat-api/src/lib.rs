//! Client for the FULTec fuel-station transaction API
//!
//! This crate handles bearer-token authentication, OData-style query
//! construction, fetching and normalizing transaction records, and
//! short-lived memoization of fetched tables.

pub mod auth;
pub mod cache;
pub mod client;
pub mod normalize;
pub mod query;

pub use auth::TokenManager;
pub use cache::FetchCache;
pub use client::{FuelApiClient, TransactionSource};
pub use query::{FilterParams, Query, build_filter, ensure_select_fields};
