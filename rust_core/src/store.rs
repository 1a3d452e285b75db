//! Explicitly owned analytics state.
//!
//! `AnalyticsStore` holds everything that survives between polls: the pace
//! series of every matchup and its logging trigger. One instance lives for
//! the whole tracking session and is passed to every poll. Hosts polling
//! from several tasks share it behind a single mutex (`SharedAnalyticsStore`)
//! so that each matchup's series only ever has one writer.

use crate::clock;
use crate::indicators::{compute_bands, IndicatorBands, IndicatorConfig};
use crate::models::{GameSnapshot, LogRecord, PaceSample, ProjectionResult, SeasonBaseline};
use crate::pace;
use crate::projection;
use crate::providers::OddsTable;
use crate::series::{AppendOutcome, TimeSeriesStore};
use crate::trigger::{LoggingTrigger, TriggerInput, TriggerState};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use std::sync::Arc;
use tracing::debug;

pub type SharedAnalyticsStore = Arc<Mutex<AnalyticsStore>>;

/// Everything one poll produced for one game
#[derive(Debug, Clone)]
pub struct PollOutcome {
    pub matchup: String,
    pub elapsed_minutes: f64,
    pub pace: f64,
    /// `None` when the pace was not meaningful and no sample was offered
    pub append: Option<AppendOutcome>,
    /// Projection over the latest sample, `None` until the series has one
    pub projection: Option<ProjectionResult>,
    pub trigger_state: TriggerState,
    pub record: Option<LogRecord>,
}

impl PollOutcome {
    pub fn is_new_sample(&self) -> bool {
        self.append.map_or(false, |a| a.is_new())
    }
}

#[derive(Debug, Default)]
pub struct AnalyticsStore {
    series: TimeSeriesStore,
    triggers: FxHashMap<String, LoggingTrigger>,
    indicator_config: IndicatorConfig,
    force_logging: bool,
}

impl AnalyticsStore {
    pub fn new(indicator_config: IndicatorConfig) -> Self {
        Self {
            indicator_config,
            ..Default::default()
        }
    }

    /// Enter the logging window on every poll regardless of the clock
    pub fn with_force_logging(mut self, force: bool) -> Self {
        self.force_logging = force;
        self
    }

    pub fn shared(self) -> SharedAnalyticsStore {
        Arc::new(Mutex::new(self))
    }

    /// Run one snapshot through clock, pace, series, projection and trigger.
    pub fn process(
        &mut self,
        snapshot: &GameSnapshot,
        odds: &OddsTable,
        baseline: &SeasonBaseline,
        observed_at: DateTime<Utc>,
    ) -> PollOutcome {
        let matchup = snapshot.matchup_key();
        let elapsed_minutes = clock::elapsed_minutes(&snapshot.clock_text, snapshot.period);
        let pace = pace::snapshot_pace(snapshot, elapsed_minutes);

        let append = if pace > 0.0 {
            let sample = PaceSample::from_snapshot(snapshot, observed_at, pace, elapsed_minutes);
            let (outcome, _) = self.series.append(&matchup, sample);
            Some(outcome)
        } else {
            debug!("{}: pace {:.2} not meaningful yet, not recorded", matchup, pace);
            None
        };

        let over_total = odds.over_total(&matchup);
        let latest = self.series.latest(&matchup);
        let projection = latest.map(|s| projection::project(s, baseline, over_total));

        let input = TriggerInput {
            period: snapshot.period,
            remaining_seconds: clock::remaining_seconds_in_period(
                &snapshot.clock_text,
                snapshot.period,
            ),
            is_final: snapshot.is_final(),
            clock_text: &snapshot.clock_text,
            is_new_sample: append.map_or(false, |a| a.is_new()),
            force: self.force_logging,
        };
        let trigger = self.triggers.entry(matchup.clone()).or_default();
        let emit = trigger.observe(&matchup, &input);
        let trigger_state = trigger.state();

        let record = match (emit, latest, projection.as_ref()) {
            (true, Some(sample), Some(projection)) => {
                Some(LogRecord::new(&matchup, sample, over_total, projection))
            }
            _ => None,
        };

        PollOutcome {
            matchup,
            elapsed_minutes,
            pace,
            append,
            projection,
            trigger_state,
            record,
        }
    }

    pub fn series(&self, matchup: &str) -> &[PaceSample] {
        self.series.get(matchup)
    }

    pub fn latest(&self, matchup: &str) -> Option<&PaceSample> {
        self.series.latest(matchup)
    }

    /// Bands over the full series of a matchup, recomputed on every call
    pub fn indicators(&self, matchup: &str) -> IndicatorBands {
        compute_bands(&self.series.pace_values(matchup), &self.indicator_config)
    }

    /// Projection over the latest sample without advancing any state
    pub fn projection(
        &self,
        matchup: &str,
        odds: &OddsTable,
        baseline: &SeasonBaseline,
    ) -> Option<ProjectionResult> {
        self.series
            .latest(matchup)
            .map(|s| projection::project(s, baseline, odds.over_total(matchup)))
    }

    pub fn trigger_state(&self, matchup: &str) -> Option<TriggerState> {
        self.triggers.get(matchup).map(LoggingTrigger::state)
    }

    pub fn matchups(&self) -> &[String] {
        self.series.matchups()
    }

    pub fn indicator_config(&self) -> &IndicatorConfig {
        &self.indicator_config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{OddsQuote, TeamBoxStats};
    use chrono::{Duration, TimeZone};

    fn stats(fga: u32, fta: u32, oreb: u32, tov: u32) -> TeamBoxStats {
        TeamBoxStats {
            field_goals_attempted: fga,
            free_throws_attempted: fta,
            rebounds_offensive: oreb,
            turnovers: tov,
        }
    }

    fn snapshot(period: u8, clock: &str, home: u16, away: u16) -> GameSnapshot {
        GameSnapshot {
            game_id: "0022400321".to_string(),
            period,
            clock_text: clock.to_string(),
            home_code: "PHX".to_string(),
            away_code: "DEN".to_string(),
            home_score: home,
            away_score: away,
            home_stats: stats(80, 20, 10, 13),
            away_stats: stats(84, 18, 12, 12),
            game_final: false,
        }
    }

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 4, 4, 30, 0).unwrap() + Duration::seconds(secs)
    }

    fn odds() -> OddsTable {
        let mut odds = OddsTable::new();
        odds.insert(OddsQuote {
            matchup: "DEN @ PHX".to_string(),
            over_total: Some(228.5),
        });
        odds
    }

    #[test]
    fn test_pregame_snapshot_records_nothing() {
        let mut store = AnalyticsStore::default();
        let outcome = store.process(&snapshot(0, "8:00 pm ET", 0, 0), &odds(), &SeasonBaseline::default(), at(0));
        assert_eq!(outcome.pace, 0.0);
        assert!(outcome.append.is_none());
        assert!(outcome.projection.is_none());
        assert!(store.series("DEN @ PHX").is_empty());
        assert!(store.matchups().is_empty());
    }

    #[test]
    fn test_mid_game_poll_projects_without_logging() {
        let mut store = AnalyticsStore::default();
        let outcome = store.process(&snapshot(3, "Q3 6:00", 80, 77), &odds(), &SeasonBaseline::default(), at(0));
        assert!(outcome.is_new_sample());
        assert!((outcome.elapsed_minutes - 30.0).abs() < 1e-9);
        let projection = outcome.projection.unwrap();
        assert!(projection.pace_adjusted_projection.is_some());
        assert!(outcome.record.is_none());
        assert_eq!(outcome.trigger_state, TriggerState::Monitoring);
    }

    #[test]
    fn test_duplicate_second_does_not_emit() {
        let mut store = AnalyticsStore::default();
        let baseline = SeasonBaseline::default();
        let first = store.process(&snapshot(4, "Q4 1:00", 104, 101), &odds(), &baseline, at(0));
        assert!(first.record.is_some());

        let again = store.process(&snapshot(4, "Q4 1:00", 104, 101), &odds(), &baseline, at(0));
        assert_eq!(again.append, Some(AppendOutcome::Duplicate));
        assert!(again.record.is_none());
        assert_eq!(store.series("DEN @ PHX").len(), 1);
    }

    #[test]
    fn test_record_fields_follow_latest_sample() {
        let mut store = AnalyticsStore::default();
        let outcome = store.process(
            &snapshot(4, "Q4 0:40", 110, 108),
            &odds(),
            &SeasonBaseline::default(),
            at(5),
        );
        let record = outcome.record.unwrap();
        assert_eq!(record.matchup, "DEN @ PHX");
        assert_eq!(record.clock, "Q4 0:40");
        assert_eq!(record.home_score, 110);
        assert_eq!(record.bookmaker_total, Some(228.5));
        assert_eq!(record.timestamp, at(5));
        assert_eq!(record.pace, outcome.pace);
        assert!(record.projected_remaining_points.is_some());
    }

    #[test]
    fn test_force_logging_emits_mid_game() {
        let mut store = AnalyticsStore::default().with_force_logging(true);
        let outcome = store.process(&snapshot(2, "Q2 7:00", 40, 38), &OddsTable::new(), &SeasonBaseline::default(), at(0));
        let record = outcome.record.unwrap();
        assert_eq!(record.bookmaker_total, None);
        assert_eq!(record.rich_projection, None);
        assert!(record.projected_remaining_points.is_some());
    }

    #[test]
    fn test_indicators_follow_series() {
        let mut store = AnalyticsStore::new(IndicatorConfig::new(3, 2.0, 3, 1.5).unwrap());
        assert_eq!(store.indicator_config().keltner.multiplier(), 1.5);
        let baseline = SeasonBaseline::default();
        for (i, clock) in ["Q3 9:00", "Q3 8:30", "Q3 8:00", "Q3 7:30"].iter().enumerate() {
            store.process(&snapshot(3, clock, 70, 70), &odds(), &baseline, at(i as i64 * 30));
        }
        let bands = store.indicators("DEN @ PHX");
        assert_eq!(bands.bollinger.len(), 4);
        assert!(bands.bollinger[1].mid.is_none());
        assert!(bands.bollinger[2].upper.is_some());
        assert!(store.indicators("BOS @ NYK").bollinger.is_empty());
    }

    fn logged_clocks(clocks: &[&str]) -> Vec<String> {
        let mut store = AnalyticsStore::default();
        let baseline = SeasonBaseline::default();
        clocks
            .iter()
            .enumerate()
            .filter_map(|(i, clock)| {
                let score = 104 + 2 * i as u16;
                store
                    .process(&snapshot(4, clock, score, score - 3), &odds(), &baseline, at(i as i64 * 10))
                    .record
                    .map(|r| r.clock)
            })
            .collect()
    }

    #[test]
    fn test_unreadable_clock_mid_window_keeps_logging() {
        assert_eq!(
            logged_clocks(&["Q4 1:00", "Q4 Timeout", "Q4 0:40", "Q4 0:20"]),
            vec!["Q4 1:00", "Q4 0:40", "Q4 0:20"]
        );
    }

    #[test]
    fn test_clock_correction_mid_window_keeps_logging() {
        assert_eq!(
            logged_clocks(&["Q4 1:29", "Q4 1:32", "Q4 0:40", "Q4 0:20"]),
            vec!["Q4 1:29", "Q4 0:40", "Q4 0:20"]
        );
    }

    #[test]
    fn test_final_status_closes_without_final_text() {
        let mut store = AnalyticsStore::default();
        let baseline = SeasonBaseline::default();
        store.process(&snapshot(4, "Q4 0:05", 115, 112), &odds(), &baseline, at(0));

        let mut finished = snapshot(4, "Q4 0:00", 115, 112);
        finished.game_final = true;
        let outcome = store.process(&finished, &odds(), &baseline, at(10));
        assert!(outcome.record.is_none());
        assert_eq!(
            outcome.trigger_state,
            TriggerState::Closed {
                period: 4,
                is_final: true
            }
        );
    }

    #[test]
    fn test_shared_store() {
        let shared = AnalyticsStore::default().shared();
        {
            let mut store = shared.lock();
            store.process(&snapshot(1, "Q1 6:00", 14, 12), &odds(), &SeasonBaseline::default(), at(0));
        }
        assert_eq!(shared.lock().series("DEN @ PHX").len(), 1);
        assert_eq!(
            shared.lock().trigger_state("DEN @ PHX"),
            Some(TriggerState::Monitoring)
        );
    }
}
