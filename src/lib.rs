//! fuelstat - Terminal dashboard for fuel-station transactions
//!
//! This library provides functionality to:
//! - Authenticate against the FULTec API and query transactions with OData filters
//! - Aggregate transactions into KPIs, a daily trend and an employee ranking
//! - Render the dashboard as tables and terminal charts, or as JSON
//! - Map free-text requests to dashboard commands through a language model
//! - Refresh the dashboard periodically in watch mode
//!
//! # Examples
//!
//! ```no_run
//! use fuelstat::dashboard::{Dashboard, WindowSpec};
//! use fuelstat_api::{FetchCache, FuelApiClient};
//! use fuelstat_assistant::ExtraFilters;
//! use fuelstat_core::config::ApiSettings;
//! use fuelstat_core::timezone::TimezoneConfig;
//!
//! #[tokio::main]
//! async fn main() -> fuelstat::Result<()> {
//!     let settings = ApiSettings::from_env()?;
//!     let timezone = TimezoneConfig::default();
//!     let client = FuelApiClient::new(&settings, timezone.clone());
//!     let dashboard = Dashboard::new(FetchCache::new(client, settings.cache_ttl));
//!
//!     let window = WindowSpec::default().resolve(timezone.now().date())?;
//!     let snapshot = dashboard.snapshot(window, &ExtraFilters::default()).await?;
//!     println!("{} abastecimentos", snapshot.kpis.count);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod dashboard;
pub mod live_monitor;

// Re-export commonly used types
pub use dashboard::{Dashboard, Snapshot, WindowSpec};
pub use fuelstat_core::{ChartMode, FuelstatError, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
