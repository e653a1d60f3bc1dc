//! chanwatch daemon entry point.

#![forbid(unsafe_code)]
#![warn(clippy::pedantic, clippy::nursery)]

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;

use chanwatch::cli::Cli;
use chanwatch::config::Config;
use chanwatch::core::{AppContext, logging, scheduler};
use chanwatch::metrics::server as metrics_server;
use chanwatch::storage::SqliteStore;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_level = cli
        .log_level
        .as_deref()
        .and_then(logging::LogLevel::from_arg)
        .or_else(|| logging::parse_log_level_from_env().map(logging::LogLevel::from_tracing_level))
        .unwrap_or_default();
    let log_format = if cli.json_output {
        logging::LogFormat::Json
    } else {
        logging::parse_log_format_from_env().unwrap_or_default()
    };
    logging::init(
        log_level,
        log_format,
        logging::parse_log_file_from_env(),
        cli.verbose,
    );

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            eprintln!("chanwatch: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> chanwatch::Result<()> {
    // Startup failures here are fatal: bad config, unreachable store,
    // unbindable metrics port.
    let mut config = Config::load(&cli.config)?;
    if cli.dry_run {
        config.dry_run = true;
    }

    let metrics_addr = config.metrics_addr()?;
    let store = Arc::new(SqliteStore::open(std::path::Path::new(&config.database))?);
    let ctx = AppContext::new(config, store)?;

    let metrics = Arc::clone(&ctx.metrics);
    tokio::spawn(async move {
        if let Err(e) = metrics_server::serve(metrics_addr, metrics).await {
            tracing::error!(error = %e, "metrics server failed");
        }
    });

    tracing::info!(
        config = %cli.config.display(),
        dry_run = ctx.config.dry_run,
        interval = %ctx.config.interval,
        "chanwatch starting"
    );

    if cli.once {
        let summary = scheduler::run_cycle(&ctx).await?;
        let duration_ms = u64::try_from(summary.duration.as_millis()).unwrap_or(u64::MAX);
        tracing::info!(channels = summary.channels, duration_ms, "single cycle finished");
        return Ok(());
    }

    scheduler::run(ctx).await;
    Ok(())
}
