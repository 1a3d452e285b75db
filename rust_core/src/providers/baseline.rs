//! Season pace baseline.
//!
//! Mean and median pace over the season's games, derived from a team
//! game-log result set (one row per team per game, so each game appears
//! twice and is de-duplicated by `GAME_ID`). The cache refreshes at most once
//! per TTL and falls back to the league defaults when no source is usable.

use crate::models::SeasonBaseline;
use anyhow::{anyhow, Context, Result};
use std::collections::HashSet;
use std::time::{Duration, Instant};
use tracing::warn;

pub const DEFAULT_BASELINE_TTL: Duration = Duration::from_secs(3600);

/// Mean and median over one pace per game (first row wins per game id).
pub fn baseline_from_game_paces<'a, I>(rows: I) -> Option<SeasonBaseline>
where
    I: IntoIterator<Item = (&'a str, f64)>,
{
    let mut seen = HashSet::new();
    let mut paces: Vec<f64> = rows
        .into_iter()
        .filter(|(game_id, pace)| pace.is_finite() && seen.insert(*game_id))
        .map(|(_, pace)| pace)
        .collect();

    if paces.is_empty() {
        return None;
    }

    paces.sort_by(f64::total_cmp);
    let n = paces.len();
    let mean = paces.iter().sum::<f64>() / n as f64;
    let median = if n % 2 == 0 {
        (paces[n / 2 - 1] + paces[n / 2]) / 2.0
    } else {
        paces[n / 2]
    };

    Some(SeasonBaseline {
        mean_pace: mean,
        median_pace: median,
    })
}

/// Decode a `resultSets[0]` game-log payload (`headers` + `rowSet`).
pub fn parse_team_game_logs(json: &str) -> Result<SeasonBaseline> {
    let data: serde_json::Value = serde_json::from_str(json).context("game log is not JSON")?;
    let result_set = &data["resultSets"][0];
    let headers = result_set["headers"]
        .as_array()
        .ok_or_else(|| anyhow!("game log has no headers"))?;
    let rows = result_set["rowSet"]
        .as_array()
        .ok_or_else(|| anyhow!("game log has no rowSet"))?;

    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| anyhow!("game log has no {} column", name))
    };
    let game_col = column("GAME_ID")?;
    let pace_col = column("PACE")?;

    let paces = rows.iter().filter_map(|row| {
        let game_id = row[game_col].as_str()?;
        let pace = row[pace_col].as_f64()?;
        Some((game_id, pace))
    });

    baseline_from_game_paces(paces).ok_or_else(|| anyhow!("game log has no usable PACE rows"))
}

/// Baseline refreshed at most once per TTL.
#[derive(Debug, Clone)]
pub struct BaselineCache {
    ttl: Duration,
    cached: Option<(SeasonBaseline, Instant)>,
}

impl Default for BaselineCache {
    fn default() -> Self {
        Self::new(DEFAULT_BASELINE_TTL)
    }
}

impl BaselineCache {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, cached: None }
    }

    /// Current baseline, calling `fetch` only when the cache is empty or
    /// stale. A failed refresh keeps the previous value (or the defaults)
    /// for another TTL rather than retrying every poll.
    pub fn get_or_refresh<F>(&mut self, now: Instant, fetch: F) -> SeasonBaseline
    where
        F: FnOnce() -> Result<SeasonBaseline>,
    {
        if let Some((baseline, _)) = self.cached.filter(|_| !self.is_stale(now)) {
            return baseline;
        }

        let baseline = match fetch() {
            Ok(baseline) => baseline,
            Err(e) => {
                let fallback = self.cached.map(|(b, _)| b).unwrap_or_default();
                warn!(
                    "season baseline refresh failed, using mean {:.1} / median {:.1}: {:#}",
                    fallback.mean_pace, fallback.median_pace, e
                );
                fallback
            }
        };
        self.cached = Some((baseline, now));
        baseline
    }

    /// Empty, or older than the TTL at `now`
    pub fn is_stale(&self, now: Instant) -> bool {
        self.cached
            .map_or(true, |(_, fetched_at)| now.saturating_duration_since(fetched_at) >= self.ttl)
    }

    pub fn cached(&self) -> Option<SeasonBaseline> {
        self.cached.map(|(b, _)| b)
    }
}
