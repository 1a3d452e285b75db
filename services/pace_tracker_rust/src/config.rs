//! Configuration constants and environment loading for the pace tracker
//!
//! This module manages all runtime configuration:
//! - Poll and status intervals
//! - Input locations (box score drop directory, odds table, game logs)
//! - Record log location
//! - Indicator band parameters
//! - Force-logging override

use anyhow::{Context, Result};
use pace_rust_core::indicators::{DEFAULT_BAND_LENGTH, DEFAULT_BAND_MULTIPLIER};
use pace_rust_core::providers::baseline::DEFAULT_BASELINE_TTL;
use pace_rust_core::IndicatorConfig;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Default polling interval in seconds
pub const DEFAULT_POLL_INTERVAL_SECS: f64 = 10.0;

/// Directory the box score fetcher writes `boxscore_*.json` files into
pub const DEFAULT_SNAPSHOT_DIR: &str = "data/boxscores";

/// Cached bookmaker quote table
pub const DEFAULT_ODDS_PATH: &str = "data/nba_odds.json";

/// Team game-log payload used for the season baseline
pub const DEFAULT_BASELINE_PATH: &str = "data/team_game_logs.json";

/// Append-only record log
pub const DEFAULT_RECORD_LOG_PATH: &str = "data/pace_records.jsonl";

/// Default interval for the band status report
pub const DEFAULT_STATUS_INTERVAL_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct TrackerConfig {
    pub poll_interval: Duration,
    pub snapshot_dir: PathBuf,
    pub odds_path: PathBuf,
    pub baseline_path: PathBuf,
    pub baseline_ttl: Duration,
    pub record_log_path: PathBuf,
    pub indicators: IndicatorConfig,
    pub force_logging: bool,
    pub status_interval: Duration,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs_f64(DEFAULT_POLL_INTERVAL_SECS),
            snapshot_dir: PathBuf::from(DEFAULT_SNAPSHOT_DIR),
            odds_path: PathBuf::from(DEFAULT_ODDS_PATH),
            baseline_path: PathBuf::from(DEFAULT_BASELINE_PATH),
            baseline_ttl: DEFAULT_BASELINE_TTL,
            record_log_path: PathBuf::from(DEFAULT_RECORD_LOG_PATH),
            indicators: IndicatorConfig::default(),
            force_logging: false,
            status_interval: Duration::from_secs(DEFAULT_STATUS_INTERVAL_SECS),
        }
    }
}

impl TrackerConfig {
    /// Load configuration from environment variables with sensible defaults
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let parsed = |key: &str| lookup(key).map(|v| v.trim().to_string());

        let poll_interval_secs = parsed("POLL_INTERVAL_SECS")
            .and_then(|v| v.parse::<f64>().ok())
            .filter(|v| v.is_finite())
            .unwrap_or(DEFAULT_POLL_INTERVAL_SECS)
            .clamp(1.0, 300.0);

        let baseline_ttl_secs = parsed("BASELINE_TTL_SECS")
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_BASELINE_TTL.as_secs())
            .max(60);

        let status_interval_secs = parsed("STATUS_INTERVAL_SECS")
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_STATUS_INTERVAL_SECS)
            .max(1);

        let path = |key: &str, default: &str| {
            PathBuf::from(parsed(key).filter(|v| !v.is_empty()).unwrap_or_else(|| default.to_string()))
        };

        // band parameters are validated, not clamped
        let bb_length = parse_or(&parsed, "BB_LENGTH", DEFAULT_BAND_LENGTH)?;
        let bb_std = parse_or(&parsed, "BB_STD", DEFAULT_BAND_MULTIPLIER)?;
        let kc_length = parse_or(&parsed, "KC_LENGTH", DEFAULT_BAND_LENGTH)?;
        let kc_mult = parse_or(&parsed, "KC_MULT", DEFAULT_BAND_MULTIPLIER)?;
        let indicators = IndicatorConfig::new(bb_length, bb_std, kc_length, kc_mult)
            .context("invalid indicator band configuration")?;

        let force_logging = parsed("FORCE_LOGGING")
            .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes" | "y" | "on"))
            .unwrap_or(false);

        Ok(Self {
            poll_interval: Duration::from_secs_f64(poll_interval_secs),
            snapshot_dir: path("SNAPSHOT_DIR", DEFAULT_SNAPSHOT_DIR),
            odds_path: path("ODDS_PATH", DEFAULT_ODDS_PATH),
            baseline_path: path("BASELINE_PATH", DEFAULT_BASELINE_PATH),
            baseline_ttl: Duration::from_secs(baseline_ttl_secs),
            record_log_path: path("RECORD_LOG_PATH", DEFAULT_RECORD_LOG_PATH),
            indicators,
            force_logging,
            status_interval: Duration::from_secs(status_interval_secs),
        })
    }
}

fn parse_or<T, F>(parsed: &F, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    match parsed(key) {
        Some(raw) if !raw.is_empty() => raw
            .parse::<T>()
            .with_context(|| format!("Invalid {key}: {raw}")),
        _ => Ok(default),
    }
}
