//! CLI interface for fuelstat
//!
//! This module defines the command-line interface using clap. Filter flags
//! are global so they apply to every command.
//!
//! # Example
//!
//! ```bash
//! # Month-to-date dashboard, daily trend as bars
//! fuelstat dashboard --mode barras
//!
//! # Diesel sales on the first week of March, as JSON
//! fuelstat kpis --start-date 2024-03-01 --end-date 2024-03-07 --product DIESEL --json
//!
//! # Let the assistant pick the view
//! fuelstat ask "top 5 frentistas de ontem"
//! ```

use crate::dashboard::WindowSpec;
use chrono::{NaiveDate, NaiveTime, Timelike};
use clap::{Args, Parser, Subcommand};
use fuelstat_assistant::command::{DashboardAction, DashboardCommand, ExtraFilters};
use fuelstat_core::config::ENV_TIMEZONE;
use fuelstat_core::error::{FuelstatError, Result};
use fuelstat_core::types::{ChartMode, TimeWindow};
use std::path::PathBuf;

/// Ranking size when `--top` is not given
pub const DEFAULT_TOP: usize = 10;

/// Dashboard for fuel-station transactions
#[derive(Parser, Debug, Clone)]
#[command(name = "fuelstat")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Show informational output (default is quiet mode with only warnings and errors)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// First day of the window (YYYY-MM-DD or DD/MM/YYYY), default first of the month
    #[arg(long, global = true)]
    pub start_date: Option<String>,

    /// Start time on the first day (HH:MM), default 00:00
    #[arg(long, global = true)]
    pub start_time: Option<String>,

    /// Last day of the window (YYYY-MM-DD or DD/MM/YYYY), default today
    #[arg(long, global = true)]
    pub end_date: Option<String>,

    /// Last included minute on the last day (HH:MM), default 23:59
    #[arg(long, global = true)]
    pub end_time: Option<String>,

    /// Only products containing this text
    #[arg(long, short = 'p', global = true)]
    pub product: Option<String>,

    /// Only employees whose name contains this text
    #[arg(long, short = 'e', global = true)]
    pub employee: Option<String>,

    /// Only levels containing this text
    #[arg(long, short = 'l', global = true)]
    pub level: Option<String>,

    /// Number of employees in the ranking
    #[arg(long, short = 'n', global = true)]
    pub top: Option<usize>,

    /// Station timezone (e.g. "America/Sao_Paulo", "UTC", "local")
    #[arg(long, short = 'z', global = true, env = ENV_TIMEZONE)]
    pub timezone: Option<String>,

    /// Subcommand to execute (default: dashboard)
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Arguments for the dashboard command
#[derive(Args, Debug, Clone)]
pub struct DashboardArgs {
    /// Chart style for the daily trend
    #[arg(long, short = 'm', default_value = "linha")]
    pub mode: ChartMode,

    /// Refresh periodically until Ctrl+C
    #[arg(long, short = 'w')]
    pub watch: bool,

    /// Refresh interval in seconds for watch mode
    #[arg(long, default_value = "60")]
    pub interval: u64,
}

impl Default for DashboardArgs {
    fn default() -> Self {
        Self {
            mode: ChartMode::Line,
            watch: false,
            interval: 60,
        }
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// KPIs, daily trend, and employee ranking together
    Dashboard(DashboardArgs),

    /// Transaction count, liters, revenue, and average ticket
    Kpis,

    /// Daily revenue and liters
    Trend {
        /// Chart style: linha, barras, area or dispersao
        #[arg(long, short = 'm', default_value = "linha")]
        mode: ChartMode,
    },

    /// Revenue per employee
    Employees,

    /// Write the loaded transactions as CSV
    Export {
        /// Output file (stdout when omitted)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Interpret a free-text command with the language-model assistant
    Ask {
        /// What to show, in plain language
        text: String,
    },
}

impl Cli {
    /// The command to run, defaulting to the dashboard
    pub fn resolved_command(&self) -> Command {
        self.command
            .clone()
            .unwrap_or_else(|| Command::Dashboard(DashboardArgs::default()))
    }

    pub fn top_n(&self) -> usize {
        self.top.filter(|n| *n > 0).unwrap_or(DEFAULT_TOP)
    }

    /// Parsed window flags; unset parts are resolved against "today" later
    pub fn window_spec(&self) -> Result<WindowSpec> {
        Ok(WindowSpec {
            start_date: self.start_date.as_deref().map(parse_date_arg).transpose()?,
            start_time: self.start_time.as_deref().map(parse_time_arg).transpose()?,
            end_date: self.end_date.as_deref().map(parse_date_arg).transpose()?,
            end_time: self.end_time.as_deref().map(parse_time_arg).transpose()?,
        })
    }

    pub fn extras(&self) -> ExtraFilters {
        ExtraFilters {
            product: self.product.clone(),
            employee: self.employee.clone(),
            level: self.level.clone(),
        }
    }

    /// What the dashboard shows when the assistant cannot be used
    pub fn fallback_command(&self, window: TimeWindow) -> DashboardCommand {
        DashboardCommand {
            action: DashboardAction::ShowTrend {
                mode: ChartMode::default(),
            },
            window,
            extras: self.extras(),
            top_n: self.top,
        }
    }
}

/// Parse a date given as YYYY-MM-DD or DD/MM/YYYY
pub fn parse_date_arg(date_str: &str) -> Result<NaiveDate> {
    let trimmed = date_str.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(trimmed, "%d/%m/%Y"))
        .map_err(|_| {
            FuelstatError::InvalidDate(format!(
                "'{date_str}'. Use YYYY-MM-DD or DD/MM/YYYY"
            ))
        })
}

/// Parse a time given as HH:MM (seconds are accepted and dropped)
pub fn parse_time_arg(time_str: &str) -> Result<NaiveTime> {
    let trimmed = time_str.trim();
    let time = NaiveTime::parse_from_str(trimmed, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
        .map_err(|_| FuelstatError::InvalidDate(format!("'{time_str}'. Use HH:MM")))?;
    time.with_second(0)
        .ok_or_else(|| FuelstatError::InvalidDate(format!("'{time_str}'. Use HH:MM")))
}
