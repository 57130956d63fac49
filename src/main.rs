//! space-weather-checker — periodic space weather monitor and alerting
//! daemon, plus a read-only HTTP API over the same persisted state.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use space_weather_checker::api::{create_app, ApiState};
use space_weather_checker::config::{self, AppConfig};
use space_weather_checker::scheduler;

#[derive(Parser, Debug)]
#[command(name = "space-weather-checker")]
#[command(about = "Periodic space weather monitor and alerting daemon")]
#[command(version)]
struct CliArgs {
    /// Directory holding checker-state.json, predictions.json and the lockfile.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Path to a TOML config file (overrides the SPACE_WEATHER_CONFIG search order).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Run a single tick and exit instead of looping on the configured interval.
    #[arg(long)]
    once: bool,

    /// Override the HTTP API bind address.
    #[arg(long)]
    addr: Option<String>,

    /// Interval between ticks, seconds.
    #[arg(long, default_value_t = 900)]
    interval_secs: u64,
}

#[derive(Debug, Clone, Copy)]
enum TaskName {
    HttpServer,
    Scheduler,
}

impl std::fmt::Display for TaskName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskName::HttpServer => write!(f, "HttpServer"),
            TaskName::Scheduler => write!(f, "Scheduler"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args = CliArgs::parse();

    let mut app_config = match &args.config {
        Some(path) => AppConfig::load_from_file(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => AppConfig::load(),
    };
    if let Some(data_dir) = &args.data_dir {
        app_config.data_dir = data_dir.clone();
    }
    if let Some(addr) = &args.addr {
        app_config.server.addr = addr.clone();
    }
    std::fs::create_dir_all(&app_config.data_dir)
        .with_context(|| format!("failed to create data directory {}", app_config.data_dir.display()))?;

    space_weather_checker::logging::init(&app_config.data_dir, app_config.max_log_size_bytes)
        .context("failed to initialize logging")?;

    config::init(app_config);
    let app_config = config::get();

    info!(data_dir = %app_config.data_dir.display(), "space-weather-checker starting");

    let channels = scheduler::default_channels();

    if args.once {
        scheduler::run_tick(&app_config.data_dir, app_config, &channels).await;
        info!("single tick complete, exiting");
        return Ok(());
    }

    let cancel_token = CancellationToken::new();
    let shutdown_token = cancel_token.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("received Ctrl+C, initiating shutdown");
        shutdown_token.cancel();
    });

    let mut task_set: JoinSet<Result<TaskName>> = JoinSet::new();

    let http_cancel = cancel_token.clone();
    let server_addr = app_config.server.addr.clone();
    let api_state = ApiState {
        data_dir: app_config.data_dir.clone(),
    };
    task_set.spawn(async move {
        let app = create_app(api_state);
        let listener = tokio::net::TcpListener::bind(&server_addr)
            .await
            .with_context(|| format!("failed to bind to {server_addr}"))?;
        info!(addr = %server_addr, "HTTP API listening");

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                http_cancel.cancelled().await;
                info!("HttpServer received shutdown signal");
            })
            .await
            .context("HTTP server error")?;
        Ok(TaskName::HttpServer)
    });

    let scheduler_cancel = cancel_token.clone();
    let data_dir = app_config.data_dir.clone();
    let interval_secs = args.interval_secs;
    task_set.spawn(async move {
        let config = config::get();
        let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
        loop {
            tokio::select! {
                _ = scheduler_cancel.cancelled() => {
                    info!("Scheduler received shutdown signal");
                    return Ok(TaskName::Scheduler);
                }
                _ = interval.tick() => {
                    scheduler::run_tick(&data_dir, config, &channels).await;
                }
            }
        }
    });

    loop {
        tokio::select! {
            _ = cancel_token.cancelled() => {
                info!("shutdown signal received, waiting for tasks to finish");
                break;
            }
            result = task_set.join_next() => {
                match result {
                    Some(Ok(Ok(task_name))) => {
                        info!(%task_name, "task completed normally");
                    }
                    Some(Ok(Err(e))) => {
                        error!(error = %e, "task failed");
                        cancel_token.cancel();
                        return Err(e);
                    }
                    Some(Err(e)) => {
                        error!(error = %e, "task panicked");
                        cancel_token.cancel();
                        return Err(anyhow::anyhow!("task panicked: {e}"));
                    }
                    None => {
                        info!("all tasks completed");
                        break;
                    }
                }
            }
        }
    }

    info!("space-weather-checker shutdown complete");
    Ok(())
}
