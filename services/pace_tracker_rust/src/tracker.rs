//! Poll loop.
//!
//! Each tick reloads the odds table, refreshes the season baseline when its
//! TTL has expired, decodes every box score the fetcher has dropped into the
//! snapshot directory and runs the active games through the shared analytics
//! store. Emitted records go to the record sink.
//!
//! The file reads of a tick run on the blocking pool; only the in-memory
//! processing happens on the runtime thread.

use crate::config::TrackerConfig;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};
use pace_rust_core::providers::baseline::parse_team_game_logs;
use pace_rust_core::providers::boxscore::parse_boxscore;
use pace_rust_core::providers::{BaselineCache, OddsTable};
use pace_rust_core::sink::deliver;
use pace_rust_core::{
    AnalyticsStore, DeliveryStats, GameSnapshot, PollOutcome, RecordSink, SeasonBaseline,
    SharedAnalyticsStore,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::task::{self, JoinHandle};
use tokio::time::{interval, MissedTickBehavior};

const SNAPSHOT_PREFIX: &str = "boxscore_";
const SNAPSHOT_EXTENSION: &str = "json";

/// Counters for one poll
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollSummary {
    pub games: usize,
    pub skipped: usize,
    pub new_samples: usize,
    pub records: usize,
}

pub struct PaceTracker<S: RecordSink> {
    config: TrackerConfig,
    store: SharedAnalyticsStore,
    baseline: BaselineCache,
    sink: S,
    stats: DeliveryStats,
}

impl<S: RecordSink> PaceTracker<S> {
    pub fn new(config: TrackerConfig, sink: S) -> Self {
        let store = AnalyticsStore::new(config.indicators)
            .with_force_logging(config.force_logging)
            .shared();
        Self {
            baseline: BaselineCache::new(config.baseline_ttl),
            config,
            store,
            sink,
            stats: DeliveryStats::default(),
        }
    }

    pub fn store(&self) -> SharedAnalyticsStore {
        self.store.clone()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn delivery_stats(&self) -> DeliveryStats {
        self.stats
    }

    fn baseline_due(&self) -> bool {
        self.baseline.is_stale(Instant::now())
    }

    /// Run one poll over everything currently in the snapshot directory,
    /// reading the files on the calling thread.
    #[cfg(test)]
    pub fn poll_once(&mut self, observed_at: DateTime<Utc>) -> Result<PollSummary> {
        let inputs = PollInputs::read(&self.config, self.baseline_due())?;
        Ok(self.process_inputs(inputs, observed_at))
    }

    /// Same as `poll_once`, with the file reads moved to the blocking pool.
    pub async fn poll(&mut self, observed_at: DateTime<Utc>) -> Result<PollSummary> {
        let config = self.config.clone();
        let refresh_baseline = self.baseline_due();
        let inputs = task::spawn_blocking(move || PollInputs::read(&config, refresh_baseline))
            .await
            .context("poll input reader task failed")??;
        Ok(self.process_inputs(inputs, observed_at))
    }

    fn process_inputs(&mut self, inputs: PollInputs, observed_at: DateTime<Utc>) -> PollSummary {
        let PollInputs {
            odds,
            snapshots,
            skipped,
            baseline: fetched,
        } = inputs;

        let baseline_path = self.config.baseline_path.clone();
        let baseline = self.baseline.get_or_refresh(Instant::now(), || {
            fetched.unwrap_or_else(|| load_baseline(&baseline_path))
        });

        let mut summary = PollSummary {
            games: snapshots.len(),
            skipped,
            ..Default::default()
        };

        for snapshot in &snapshots {
            let outcome = self
                .store
                .lock()
                .process(snapshot, &odds, &baseline, observed_at);
            log_outcome(&outcome, odds.over_total(&outcome.matchup));

            if outcome.is_new_sample() {
                summary.new_samples += 1;
            }
            if let Some(record) = &outcome.record {
                // failures are logged and counted by deliver
                if deliver(&mut self.sink, record, &mut self.stats).is_ok() {
                    summary.records += 1;
                }
            }
        }

        debug!(
            "Poll complete: {} games, {} new samples, {} records ({} skipped files)",
            summary.games, summary.new_samples, summary.records, summary.skipped
        );
        summary
    }

    /// Poll until ctrl-c, with a status task reporting bands alongside.
    pub async fn run(mut self) -> Result<()> {
        let status_handle = spawn_status_task(self.store(), self.config.status_interval);

        let mut ticker = interval(self.config.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            "PaceTracker running (poll_interval: {:?}, snapshots: {}, sink: {})",
            self.config.poll_interval,
            self.config.snapshot_dir.display(),
            self.sink().name()
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.poll(Utc::now()).await {
                        error!("Poll failed: {:#}", e);
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("Shutdown requested");
                    break;
                }
            }
        }

        status_handle.abort();
        let stats = self.delivery_stats();
        info!(
            "PaceTracker stopped ({} records delivered, {} failed)",
            stats.delivered, stats.failed
        );
        Ok(())
    }
}

/// Everything one poll reads from disk
pub struct PollInputs {
    pub odds: OddsTable,
    pub snapshots: Vec<GameSnapshot>,
    pub skipped: usize,
    /// Game-log baseline, only read when the cache is due for a refresh
    pub baseline: Option<Result<SeasonBaseline>>,
}

impl PollInputs {
    pub fn read(config: &TrackerConfig, refresh_baseline: bool) -> Result<Self> {
        let odds = OddsTable::load(&config.odds_path).unwrap_or_else(|e| {
            warn!("Odds table unavailable, projecting without lines: {:#}", e);
            OddsTable::new()
        });
        let baseline = refresh_baseline.then(|| load_baseline(&config.baseline_path));
        let (snapshots, skipped) = read_snapshots(&config.snapshot_dir)?;
        Ok(Self {
            odds,
            snapshots,
            skipped,
            baseline,
        })
    }
}

fn load_baseline(path: &Path) -> Result<SeasonBaseline> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading game logs {}", path.display()))?;
    parse_team_game_logs(&content)
}

/// Decode every `boxscore_*.json` in `dir` and keep the active games.
///
/// Files that fail to decode are logged and counted, not fatal. A missing
/// directory reads as "no games yet".
pub fn read_snapshots(dir: &Path) -> Result<(Vec<GameSnapshot>, usize)> {
    if !dir.exists() {
        debug!("Snapshot directory {} does not exist yet", dir.display());
        return Ok((Vec::new(), 0));
    }

    let mut paths: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("listing {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| is_snapshot_file(path))
        .collect();
    paths.sort();

    let mut snapshots = Vec::with_capacity(paths.len());
    let mut skipped = 0;
    for path in paths {
        let decoded = fs::read_to_string(&path)
            .map_err(anyhow::Error::from)
            .and_then(|content| parse_boxscore(&content).map_err(anyhow::Error::from));
        match decoded {
            Ok(game) if game.status.is_active() => snapshots.push(game.snapshot),
            Ok(game) => debug!("{} not started, skipped", game.snapshot.matchup_key()),
            Err(e) => {
                warn!("Skipping {}: {:#}", path.display(), e);
                skipped += 1;
            }
        }
    }

    Ok((snapshots, skipped))
}

fn is_snapshot_file(path: &Path) -> bool {
    let name_matches = path
        .file_name()
        .and_then(|n| n.to_str())
        .map_or(false, |n| n.starts_with(SNAPSHOT_PREFIX));
    let ext_matches = path
        .extension()
        .and_then(|e| e.to_str())
        .map_or(false, |e| e == SNAPSHOT_EXTENSION);
    name_matches && ext_matches
}

fn log_outcome(outcome: &PollOutcome, over_total: Option<f64>) {
    let Some(projection) = &outcome.projection else {
        return;
    };
    info!(
        "{} | elapsed {:.1}m | pace {:.2} ({:+.2}) | line {} | proj {} | rem {} | edge {} | {}",
        outcome.matchup,
        outcome.elapsed_minutes,
        outcome.pace,
        projection.pace_delta,
        fmt_opt(over_total),
        fmt_opt(projection.pace_adjusted_projection),
        fmt_opt(projection.remaining_points_projection),
        fmt_opt(projection.remainder_edge),
        outcome.trigger_state.as_str()
    );
    if let Some(record) = &outcome.record {
        info!("{} | logging record at {}", record.matchup, record.clock);
    }
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.1}", v))
}

/// Log the latest bands of every tracked matchup on a fixed interval.
fn spawn_status_task(store: SharedAnalyticsStore, every: std::time::Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let config = *store.lock().indicator_config();
        info!(
            "Status every {:?}: BB({}, {}) KC({}, {})",
            every,
            config.bollinger.length(),
            config.bollinger.multiplier(),
            config.keltner.length(),
            config.keltner.multiplier()
        );
        let mut ticker = interval(every);
        // first tick completes immediately
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let lines: Vec<String> = {
                let store = store.lock();
                store
                    .matchups()
                    .iter()
                    .map(|matchup| {
                        let bands = store.indicators(matchup);
                        let pace = store.latest(matchup).map(|s| s.pace);
                        let bb = bands.last_bollinger().copied().unwrap_or_default();
                        let kc = bands.last_keltner().copied().unwrap_or_default();
                        format!(
                            "{} | pace {} | BB {}/{}/{} | KC {}/{}/{}",
                            matchup,
                            fmt_opt(pace),
                            fmt_opt(bb.lower),
                            fmt_opt(bb.mid),
                            fmt_opt(bb.upper),
                            fmt_opt(kc.lower),
                            fmt_opt(kc.mid),
                            fmt_opt(kc.upper)
                        )
                    })
                    .collect()
            };
            if lines.is_empty() {
                debug!("Status: no matchups tracked yet");
            }
            for line in lines {
                info!("Status: {}", line);
            }
        }
    })
}
