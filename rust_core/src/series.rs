//! Per-matchup pace history.
//!
//! Append-only, arrival-ordered samples keyed by matchup. A poll landing in
//! the same wall-clock second as the previous sample is dropped, and so is
//! a sample older than the last one.

use crate::models::PaceSample;
use rustc_hash::FxHashMap;
use tracing::{debug, warn};

/// What `append` did with a sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    /// Sample became the new tail of the series
    Appended,
    /// Same second as the current tail, series unchanged
    Duplicate,
    /// Older than the current tail, series unchanged
    OutOfOrder,
}

impl AppendOutcome {
    pub fn is_new(&self) -> bool {
        matches!(self, AppendOutcome::Appended)
    }
}

#[derive(Debug, Default)]
pub struct TimeSeriesStore {
    series: FxHashMap<String, Vec<PaceSample>>,
    /// Matchup keys in first-seen order
    order: Vec<String>,
}

impl TimeSeriesStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sample and return the outcome with the resulting series.
    pub fn append(&mut self, matchup: &str, sample: PaceSample) -> (AppendOutcome, &[PaceSample]) {
        if !self.series.contains_key(matchup) {
            self.order.push(matchup.to_string());
        }
        let history = self.series.entry(matchup.to_string()).or_default();

        let last_timestamp = history.last().map(|s| s.timestamp);
        let outcome = match last_timestamp {
            Some(last) if last == sample.timestamp => {
                debug!("{}: duplicate sample at {}, skipped", matchup, sample.timestamp);
                AppendOutcome::Duplicate
            }
            Some(last) if last > sample.timestamp => {
                warn!(
                    "{}: sample at {} is older than last sample at {}, skipped",
                    matchup, sample.timestamp, last
                );
                AppendOutcome::OutOfOrder
            }
            _ => {
                history.push(sample);
                AppendOutcome::Appended
            }
        };

        (outcome, history.as_slice())
    }

    /// Samples for a matchup, empty when unseen
    pub fn get(&self, matchup: &str) -> &[PaceSample] {
        self.series.get(matchup).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn latest(&self, matchup: &str) -> Option<&PaceSample> {
        self.get(matchup).last()
    }

    /// Pace values of a matchup, in arrival order
    pub fn pace_values(&self, matchup: &str) -> Vec<f64> {
        self.get(matchup).iter().map(|s| s.pace).collect()
    }

    pub fn matchups(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 2, 1, 1, 0, 0).unwrap() + Duration::seconds(secs)
    }

    fn sample(secs: i64, pace: f64) -> PaceSample {
        PaceSample {
            timestamp: at(secs),
            pace,
            home_score: 50,
            away_score: 48,
            clock_text: "Q2 6:00".to_string(),
            elapsed_minutes: 18.0,
            period: 2,
        }
    }

    #[test]
    fn test_unseen_matchup_is_empty() {
        let store = TimeSeriesStore::new();
        assert!(store.get("BOS @ NYK").is_empty());
        assert!(store.latest("BOS @ NYK").is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_append_in_order() {
        let mut store = TimeSeriesStore::new();
        let (outcome, series) = store.append("BOS @ NYK", sample(0, 99.0));
        assert_eq!(outcome, AppendOutcome::Appended);
        assert_eq!(series.len(), 1);

        store.append("BOS @ NYK", sample(30, 101.0));
        assert_eq!(store.pace_values("BOS @ NYK"), vec![99.0, 101.0]);
        assert_eq!(store.latest("BOS @ NYK").unwrap().pace, 101.0);
    }

    #[test]
    fn test_duplicate_timestamp_never_grows_series() {
        let mut store = TimeSeriesStore::new();
        store.append("BOS @ NYK", sample(0, 99.0));
        for pace in [100.0, 105.0, 0.5] {
            let (outcome, series) = store.append("BOS @ NYK", sample(0, pace));
            assert_eq!(outcome, AppendOutcome::Duplicate);
            assert_eq!(series.len(), 1);
        }
        assert_eq!(store.latest("BOS @ NYK").unwrap().pace, 99.0);
    }

    #[test]
    fn test_older_sample_rejected() {
        let mut store = TimeSeriesStore::new();
        store.append("BOS @ NYK", sample(60, 99.0));
        let (outcome, series) = store.append("BOS @ NYK", sample(30, 98.0));
        assert_eq!(outcome, AppendOutcome::OutOfOrder);
        assert_eq!(series.len(), 1);
    }

    #[test]
    fn test_matchups_keep_first_seen_order() {
        let mut store = TimeSeriesStore::new();
        store.append("MIA @ ORL", sample(0, 97.0));
        store.append("BOS @ NYK", sample(0, 99.0));
        store.append("MIA @ ORL", sample(30, 98.0));
        assert_eq!(store.matchups(), &["MIA @ ORL".to_string(), "BOS @ NYK".to_string()]);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_adjacent_timestamps_distinct() {
        let mut store = TimeSeriesStore::new();
        for secs in [0, 0, 15, 15, 15, 30, 29, 45] {
            store.append("BOS @ NYK", sample(secs, 100.0));
        }
        let series = store.get("BOS @ NYK");
        assert_eq!(series.len(), 4);
        assert!(series.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
    }
}
