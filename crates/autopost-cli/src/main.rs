//! autopost — scheduled Facebook / Instagram publishing from a spreadsheet.
//!
//! # Usage
//!
//! ```text
//! autopost [--config <path>] run
//! autopost [--config <path>] tick
//! autopost [--config <path>] check
//! autopost [--config <path>] schedule --product <p> --platform <p> --time HH:MM --date YYYY-MM-DD --caption <c> [--mode once|daily] [--image <url>]
//! ```

mod schedule;

use std::sync::Arc;

use anyhow::{Context, Result};
use autopost_core::AutopostConfig;
use autopost_publishers::{GraphClient, PublisherRegistry};
use autopost_scheduler::{AuditLog, SchedulerEngine};
use autopost_store::{ensure_header, JobStore, SheetsStore};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use schedule::ScheduleArgs;

#[derive(Parser, Debug)]
#[command(
    name = "autopost",
    version,
    about = "Publish scheduled posts from a Google Sheet to Facebook and Instagram",
    long_about = None,
)]
struct Cli {
    /// Config file. Falls back to $AUTOPOST_CONFIG, then ./autopost.toml.
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the scheduling loop until Ctrl-C.
    Run,

    /// Run exactly one cycle and print its report.
    Tick,

    /// Show how every row would be treated right now, without publishing.
    Check,

    /// Validate a new job and append it to the store.
    Schedule(ScheduleArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "autopost=info,autopost_scheduler=info,autopost_store=info,autopost_publishers=info"
                    .into()
            }),
        )
        .init();

    let cli = Cli::parse();

    // load config: --config > AUTOPOST_CONFIG env > ./autopost.toml
    let config_path = cli
        .config
        .clone()
        .or_else(|| std::env::var("AUTOPOST_CONFIG").ok());
    let config = AutopostConfig::load(config_path.as_deref()).context("loading config")?;
    config.require_store().context("invalid config")?;

    let store: Arc<dyn JobStore> =
        Arc::new(SheetsStore::from_config(&config.store).context("opening Google Sheets store")?);
    info!(
        spreadsheet = %config.store.spreadsheet_id,
        sheet = %config.store.sheet_name,
        "job store ready"
    );

    match cli.command {
        Commands::Run => build_engine(store, &config)?.run(shutdown_signal()).await,
        Commands::Tick => {
            let report = build_engine(store, &config)?
                .tick()
                .await
                .context("cycle failed")?;
            println!("{report}");
        }
        Commands::Check => {
            let engine = build_engine(store, &config)?;
            let statuses = engine
                .inspect(engine.now())
                .await
                .context("reading job store")?;
            if statuses.is_empty() {
                println!("no jobs scheduled");
            }
            for status in statuses {
                println!("{status}");
            }
        }
        Commands::Schedule(args) => {
            let (row, job) = args.validate()?;
            if ensure_header(store.as_ref()).await? {
                info!("header row written to empty sheet");
            }
            store.append_row(&row).await.context("appending row")?;
            println!(
                "scheduled {} post for {} ({}), job {}",
                job.platform, job.scheduled_at, job.mode, job.id
            );
        }
    }

    Ok(())
}

fn build_engine(store: Arc<dyn JobStore>, config: &AutopostConfig) -> Result<SchedulerEngine> {
    let graph = GraphClient::new(&config.graph).context("building Graph API client")?;
    let publishers = PublisherRegistry::with_defaults(graph, config);
    let offset = config.schedule.offset()?;
    Ok(
        SchedulerEngine::new(store, publishers, AuditLog::new(&config.audit))
            .with_utc_offset(offset),
    )
}

/// Watch channel flipped to `true` on Ctrl-C.
fn shutdown_signal() -> tokio::sync::watch::Receiver<bool> {
    let (tx, rx) = tokio::sync::watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Ctrl-C received, stopping after the current cycle");
                let _ = tx.send(true);
            }
            Err(e) => {
                warn!(error = %e, "cannot listen for Ctrl-C");
                // dropping tx would stop the engine
                std::future::pending::<()>().await;
            }
        }
    });
    rx
}
