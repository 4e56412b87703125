//! Watch mode for the dashboard
//!
//! Refreshes the dashboard at a fixed interval until Ctrl+C. The window is
//! re-resolved on every refresh, so an open-ended window keeps following the
//! current day.

use crate::dashboard::{Dashboard, WindowSpec};
use fuelstat_api::client::TransactionSource;
use fuelstat_assistant::command::ExtraFilters;
use fuelstat_core::error::{FuelstatError, Result};
use fuelstat_core::timezone::TimezoneConfig;
use fuelstat_core::types::ChartMode;
use fuelstat_terminal::output::OutputFormatter;
use std::time::Duration;
use tokio::time::{MissedTickBehavior, interval};
use tracing::warn;

/// Live monitoring state
pub struct LiveMonitor<S> {
    dashboard: Dashboard<S>,
    window: WindowSpec,
    extras: ExtraFilters,
    timezone: TimezoneConfig,
    formatter: Box<dyn OutputFormatter>,
    mode: ChartMode,
    top_n: usize,
    json_output: bool,
    interval_secs: u64,
}

impl<S: TransactionSource> LiveMonitor<S> {
    /// Create a new live monitor
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        dashboard: Dashboard<S>,
        window: WindowSpec,
        extras: ExtraFilters,
        timezone: TimezoneConfig,
        formatter: Box<dyn OutputFormatter>,
        mode: ChartMode,
        top_n: usize,
        json_output: bool,
        interval_secs: u64,
    ) -> Self {
        Self {
            dashboard,
            window,
            extras,
            timezone,
            formatter,
            mode,
            top_n,
            json_output,
            interval_secs: interval_secs.max(1),
        }
    }

    /// Start the monitoring loop, stopping on Ctrl+C
    ///
    /// A failed refresh is reported and retried on the next tick; only
    /// an invalid window ends the loop.
    pub async fn run(self) -> Result<()> {
        self.run_until(tokio::signal::ctrl_c()).await
    }

    /// Monitoring loop that stops when `shutdown` completes
    ///
    /// `shutdown` is raced against both the wait for the next tick and the
    /// refresh itself, so a stalled fetch does not delay the exit.
    pub async fn run_until<F: Future>(self, shutdown: F) -> Result<()> {
        let mut interval = interval(Duration::from_secs(self.interval_secs));
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = interval.tick() => {}
                _ = &mut shutdown => break,
            }

            tokio::select! {
                result = self.render_once() => match result {
                    Ok(output) => self.display(&output),
                    Err(e @ FuelstatError::InvalidArgument(_)) => return Err(e),
                    Err(e) => {
                        warn!("Refresh failed: {}", e);
                        eprintln!("Falha ao atualizar: {e}");
                    }
                },
                _ = &mut shutdown => break,
            }
        }

        if !self.json_output {
            println!("\nSaindo do modo de monitoramento...");
        }
        Ok(())
    }

    /// Fetch, aggregate and format one refresh
    pub async fn render_once(&self) -> Result<String> {
        let now = self.timezone.now();
        let window = self.window.resolve(now.date())?;
        let snapshot = self.dashboard.snapshot(window, &self.extras).await?;
        let body = self
            .formatter
            .format_dashboard(&snapshot.view(self.mode, self.top_n, true));

        if self.json_output {
            return Ok(body);
        }

        Ok(format!(
            "Monitoramento - Atualizado em: {} ({})\nIntervalo: {}s | Ctrl+C para sair\n{}\n{}",
            now.format("%d/%m/%Y %H:%M:%S"),
            self.timezone.display_name(),
            self.interval_secs,
            "-".repeat(80),
            body
        ))
    }

    fn display(&self, output: &str) {
        if !self.json_output {
            // Clear screen and move cursor to top-left
            print!("\x1B[2J\x1B[1;1H");
        }
        println!("{output}");
    }
}
