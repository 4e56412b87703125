//! Loading and aggregating one dashboard refresh
//!
//! A [`Dashboard`] turns a window and a set of substring filters into an
//! OData query, fetches the matching transactions, and aggregates them into a
//! [`Snapshot`]. Rendering is left to the formatters of `fuelstat-terminal`.

use chrono::{NaiveDate, NaiveTime};
use fuelstat_api::client::TransactionSource;
use fuelstat_api::query::{FilterParams, Query, build_filter};
use fuelstat_assistant::command::{DashboardAction, DashboardCommand, ExtraFilters};
use fuelstat_core::aggregation::{daily_trend, employee_summary, kpis};
use fuelstat_core::aggregation_types::{DailyAggregate, EmployeeAggregate, Kpis};
use fuelstat_core::error::Result;
use fuelstat_core::types::{ChartMode, TimeWindow, TransactionTable, month_bounds};
use fuelstat_terminal::output::{DashboardView, OutputFormatter};
use tracing::{debug, info};

/// Window bounds as given on the command line, unset parts still open
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowSpec {
    pub start_date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_date: Option<NaiveDate>,
    /// Last included minute
    pub end_time: Option<NaiveTime>,
}

impl WindowSpec {
    /// Fill the unset parts relative to `today` and build the window
    ///
    /// Defaults are the first of `today`'s month at 00:00 through `today`
    /// at 23:59.
    pub fn resolve(&self, today: NaiveDate) -> Result<TimeWindow> {
        let (first_of_month, _) = month_bounds(today);
        TimeWindow::from_inclusive_minutes(
            self.start_date.unwrap_or(first_of_month),
            self.start_time.unwrap_or(NaiveTime::MIN),
            self.end_date.unwrap_or(today),
            self.end_time.unwrap_or_else(last_minute_of_day),
        )
    }
}

fn last_minute_of_day() -> NaiveTime {
    NaiveTime::from_hms_opt(23, 59, 0).unwrap_or(NaiveTime::MIN)
}

/// Filter inputs for a window and a set of substring filters
pub fn filter_params(window: TimeWindow, extras: &ExtraFilters) -> FilterParams {
    FilterParams {
        product: extras.product.clone(),
        employee: extras.employee.clone(),
        level: extras.level.clone(),
        ..FilterParams::new().with_window(window)
    }
}

/// Aggregated state of one refresh
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub window: TimeWindow,
    pub kpis: Kpis,
    pub trend: Vec<DailyAggregate>,
    pub employees: Vec<EmployeeAggregate>,
}

impl Snapshot {
    pub fn from_table(window: TimeWindow, table: &TransactionTable) -> Self {
        let kpis = kpis(table);
        let trend = daily_trend(table);
        let employees = employee_summary(table);
        Self {
            window,
            kpis,
            trend,
            employees,
        }
    }

    pub fn view(&self, mode: ChartMode, top_n: usize, show_trend: bool) -> DashboardView<'_> {
        DashboardView {
            window: Some(self.window),
            kpis: &self.kpis,
            trend: show_trend.then_some(self.trend.as_slice()),
            employees: &self.employees,
            mode,
            top_n,
        }
    }

    /// Render the sections a command asks for
    ///
    /// KPIs and the ranking are always shown; the trend only for
    /// [`DashboardAction::ShowTrend`].
    pub fn render_command(
        &self,
        formatter: &dyn OutputFormatter,
        command: &DashboardCommand,
    ) -> String {
        let (mode, show_trend) = match command.action {
            DashboardAction::ShowTrend { mode } => (mode, true),
            DashboardAction::ShowKpis | DashboardAction::ShowTopEmployees { .. } => {
                (ChartMode::default(), false)
            }
        };
        formatter.format_dashboard(&self.view(mode, command.ranking_size(), show_trend))
    }
}

/// Fetches and aggregates transactions from a source
pub struct Dashboard<S> {
    source: S,
}

impl<S: TransactionSource> Dashboard<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    #[cfg(test)]
    pub(crate) fn source(&self) -> &S {
        &self.source
    }

    /// Transactions registered inside `window` that match `extras`
    pub async fn load(&self, window: TimeWindow, extras: &ExtraFilters) -> Result<TransactionTable> {
        let filter = build_filter(&filter_params(window, extras))?;
        debug!(filter = ?filter, "Built transaction filter");
        let table = self.source.fetch(&Query::new().with_filter(filter)).await?;
        info!(
            "Loaded {} transactions between {} and {}",
            table.len(),
            window.start.format("%Y-%m-%d %H:%M"),
            window.end.format("%Y-%m-%d %H:%M")
        );
        Ok(table)
    }

    pub async fn snapshot(&self, window: TimeWindow, extras: &ExtraFilters) -> Result<Snapshot> {
        let table = self.load(window, extras).await?;
        Ok(Snapshot::from_table(window, &table))
    }
}
