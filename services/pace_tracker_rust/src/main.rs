//! Pace Tracker Rust Service
//!
//! Live pace tracking and total projections for NBA games.
//!
//! This service:
//! - Reads box score snapshots dropped by the fetcher
//! - Estimates live pace and keeps a per-matchup pace series
//! - Projects the final total against the cached bookmaker line
//! - Appends records to a JSON-lines log in the final 90 seconds of Q4 and OT
//! - Periodically reports Bollinger / Keltner bands per matchup

mod config;
mod sink;
mod tracker;

use anyhow::{Context, Result};
use config::TrackerConfig;
use dotenv::dotenv;
use log::info;
use sink::JsonLinesSink;
use tracker::PaceTracker;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    env_logger::init();

    info!("Starting Pace Tracker Rust Service...");

    let config = TrackerConfig::from_env()?;
    info!(
        "Config: poll {:?}, status {:?}, baseline ttl {:?}, force_logging {}",
        config.poll_interval, config.status_interval, config.baseline_ttl, config.force_logging
    );

    let sink = JsonLinesSink::open(&config.record_log_path).with_context(|| {
        format!("opening record log {}", config.record_log_path.display())
    })?;
    info!("Recording to {}", sink.path().display());

    PaceTracker::new(config, sink).run().await
}
