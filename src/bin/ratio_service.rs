//! `ratio-service`: HTTP service comparing two rounded ratios.

use anyhow::Context;
use clap::Parser;
use clap::error::ErrorKind;
use decimal_ratio::api::rest::server::{ServeTimeouts, serve, shutdown_signal};
use decimal_ratio::api::rest::{AppState, create_router};
use decimal_ratio::config::ServiceConfig;
use decimal_ratio::infrastructure::telemetry::{self, TelemetrySettings};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

/// Serve ratio comparisons over HTTP.
#[derive(Debug, Parser)]
#[command(name = "ratio-service", version, about)]
struct Cli {
    /// YAML configuration file.
    config: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            };
        }
    };

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = ?e, "service stopped");
            eprintln!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // A missing .env is normal.
    let _ = dotenvy::dotenv();

    let config = ServiceConfig::load(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    telemetry::init(&TelemetrySettings::for_env(config.env))?;

    let http = &config.http_server;
    tracing::info!(
        env = %config.env,
        address = %http.address,
        timeout = ?http.timeout,
        idle_timeout = ?http.idle_timeout,
        stop_timeout = ?http.stop_timeout,
        rate_limit = http.rate_limit.limit,
        rate_interval = ?http.rate_limit.interval,
        strategy = ?http.rate_limit.strategy,
        "starting ratio-service"
    );

    let state = Arc::new(AppState::from_config(http)?);

    let pruner = {
        let gate = Arc::clone(&state.gate);
        let interval = http.rate_limit.interval;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                gate.prune();
            }
        })
    };

    let listener = tokio::net::TcpListener::bind(&http.address)
        .await
        .with_context(|| format!("binding {}", http.address))?;
    tracing::info!(address = %listener.local_addr()?, "listening");

    serve(
        listener,
        create_router(state),
        ServeTimeouts::from_config(http),
        shutdown_signal(),
    )
    .await;
    pruner.abort();

    tracing::info!("stopped");
    Ok(())
}
