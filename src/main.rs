//! fuelstat - Terminal dashboard for fuel-station transactions

use clap::Parser;
use fuelstat::cli::{Cli, Command};
use fuelstat::dashboard::Dashboard;
use fuelstat::live_monitor::LiveMonitor;
use fuelstat_api::{FetchCache, FuelApiClient};
use fuelstat_assistant::CommandInterpreter;
use fuelstat_core::config::{ApiSettings, AssistantSettings, load_dotenv};
use fuelstat_core::error::Result;
use fuelstat_core::timezone::TimezoneConfig;
use fuelstat_terminal::export::{export_to_path, write_csv};
use fuelstat_terminal::get_formatter;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_logging(verbose: bool) {
    // --verbose overrides RUST_LOG
    let filter = if verbose {
        tracing_subscriber::EnvFilter::new("fuelstat=info")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("fuelstat=warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn build_dashboard(
    timezone: &TimezoneConfig,
) -> Result<Dashboard<FetchCache<FuelApiClient>>> {
    let settings = ApiSettings::from_env()?;
    info!("Using API at {}", settings.base_url);
    let client = FuelApiClient::new(&settings, timezone.clone());
    Ok(Dashboard::new(FetchCache::new(client, settings.cache_ttl)))
}

#[tokio::main]
async fn main() -> Result<()> {
    load_dotenv();
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let timezone = TimezoneConfig::from_name(cli.timezone.as_deref())?;
    info!("Using timezone: {}", timezone.display_name());

    let today = timezone.now().date();
    let window_spec = cli.window_spec()?;
    let extras = cli.extras();
    let top_n = cli.top_n();
    let formatter = get_formatter(cli.json, is_terminal::is_terminal(std::io::stdout()));

    match cli.resolved_command() {
        Command::Dashboard(args) => {
            let dashboard = build_dashboard(&timezone)?;
            if args.watch {
                info!("Starting live monitoring mode");
                let monitor = LiveMonitor::new(
                    dashboard,
                    window_spec,
                    extras,
                    timezone,
                    formatter,
                    args.mode,
                    top_n,
                    cli.json,
                    args.interval,
                );
                monitor.run().await?;
            } else {
                let window = window_spec.resolve(today)?;
                let snapshot = dashboard.snapshot(window, &extras).await?;
                println!(
                    "{}",
                    formatter.format_dashboard(&snapshot.view(args.mode, top_n, true))
                );
            }
        }

        Command::Kpis => {
            info!("Running KPI report");
            let window = window_spec.resolve(today)?;
            let snapshot = build_dashboard(&timezone)?
                .snapshot(window, &extras)
                .await?;
            println!("{}", formatter.format_kpis(&snapshot.kpis));
        }

        Command::Trend { mode } => {
            info!("Running daily trend report");
            let window = window_spec.resolve(today)?;
            let snapshot = build_dashboard(&timezone)?
                .snapshot(window, &extras)
                .await?;
            println!("{}", formatter.format_trend(&snapshot.trend, mode));
        }

        Command::Employees => {
            info!("Running employee report");
            let window = window_spec.resolve(today)?;
            let snapshot = build_dashboard(&timezone)?
                .snapshot(window, &extras)
                .await?;
            println!("{}", formatter.format_employees(&snapshot.employees, top_n));
        }

        Command::Export { output } => {
            let window = window_spec.resolve(today)?;
            let table = build_dashboard(&timezone)?.load(window, &extras).await?;
            match output {
                Some(path) => {
                    export_to_path(&table, &path)?;
                    eprintln!("{} abastecimentos exportados para {}", table.len(), path.display());
                }
                None => write_csv(&table, std::io::stdout().lock())?,
            }
        }

        Command::Ask { text } => {
            let interpreted = match AssistantSettings::from_env() {
                Ok(settings) => CommandInterpreter::new(settings).interpret(&text, today).await,
                Err(e) => Err(e),
            };
            let command = match interpreted {
                Ok(command) => command,
                Err(e) => {
                    warn!("Assistant unavailable: {}", e);
                    eprintln!("Não foi possível interpretar o comando: {e}");
                    eprintln!("Exibindo a visão padrão.\n");
                    cli.fallback_command(window_spec.resolve(today)?)
                }
            };

            let snapshot = build_dashboard(&timezone)?
                .snapshot(command.window, &command.extras)
                .await?;
            println!("{}", snapshot.render_command(formatter.as_ref(), &command));
        }
    }

    Ok(())
}
