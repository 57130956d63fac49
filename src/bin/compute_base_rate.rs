//! Offline one-shot tool: computes the prediction scorecard's base rate
//! from a historical event-timestamp log and writes it into
//! `predictions.json`. Never run from the live pipeline (spec.md §9).

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::Parser;
use space_weather_checker::baserate::compute_base_rate;
use space_weather_checker::store::PredictionStore;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "compute-base-rate", about = "Offline prediction base-rate sampler")]
struct Cli {
    /// Path to a JSON array of ISO-8601 event timestamps.
    #[arg(long)]
    events_file: PathBuf,

    /// Directory holding predictions.json.
    #[arg(long, default_value = "./data")]
    data_dir: PathBuf,

    /// Verification window length, hours — should match the live config.
    #[arg(long, default_value_t = 48)]
    window_hours: u32,

    /// Number of random windows to sample.
    #[arg(long, default_value_t = 10_000)]
    sample_windows: u64,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let raw = std::fs::read_to_string(&cli.events_file)?;
    let events: Vec<DateTime<Utc>> = serde_json::from_str(&raw)?;
    info!(count = events.len(), "loaded historical event log");

    let mut rng = rand::thread_rng();
    let Some(base_rate) = compute_base_rate(&events, cli.window_hours, cli.sample_windows, &mut rng)
    else {
        warn!("insufficient event history to compute a base rate; predictions.json left unchanged");
        return Ok(());
    };

    let store = PredictionStore::new(&cli.data_dir);
    let mut state = store.load();
    state.config.base_rate = Some(base_rate);
    state.config.base_rate_computed_at = Some(Utc::now());
    state.config.base_rate_sample_windows = Some(cli.sample_windows);
    store.save(&state);

    info!(base_rate, "wrote computed base rate to predictions.json");
    Ok(())
}
