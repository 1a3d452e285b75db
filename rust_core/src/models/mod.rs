// Shared models for the pace analytics core
use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// League-wide fallback when no season baseline can be computed.
pub const DEFAULT_MEAN_PACE: f64 = 99.5;
pub const DEFAULT_MEDIAN_PACE: f64 = 98.0;

/// Build the stable matchup key used for series, odds and records.
pub fn matchup_key(away_code: &str, home_code: &str) -> String {
    format!("{} @ {}", away_code, home_code)
}

// ============================================================================
// Game Snapshot (one poll of one live game)
// ============================================================================

/// Counting stats needed for the possession estimate
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamBoxStats {
    pub field_goals_attempted: u32,
    pub free_throws_attempted: u32,
    pub rebounds_offensive: u32,
    pub turnovers: u32,
}

/// Immutable view of a game at poll time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub game_id: String,
    pub period: u8,
    pub clock_text: String,
    pub home_code: String,
    pub away_code: String,
    pub home_score: u16,
    pub away_score: u16,
    pub home_stats: TeamBoxStats,
    pub away_stats: TeamBoxStats,
    /// Feed status reported the game finished
    #[serde(default)]
    pub game_final: bool,
}

impl GameSnapshot {
    pub fn matchup_key(&self) -> String {
        matchup_key(&self.away_code, &self.home_code)
    }

    pub fn total_score(&self) -> u32 {
        self.home_score as u32 + self.away_score as u32
    }

    /// Finished per the feed status, or per the status text when the
    /// snapshot did not come with one
    pub fn is_final(&self) -> bool {
        self.game_final || self.clock_text.contains("Final")
    }
}

// ============================================================================
// Pace Sample (one point of a matchup series)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaceSample {
    /// Wall-clock time of the poll, truncated to whole seconds
    pub timestamp: DateTime<Utc>,
    pub pace: f64,
    pub home_score: u16,
    pub away_score: u16,
    pub clock_text: String,
    pub elapsed_minutes: f64,
    pub period: u8,
}

impl PaceSample {
    pub fn from_snapshot(
        snapshot: &GameSnapshot,
        observed_at: DateTime<Utc>,
        pace: f64,
        elapsed_minutes: f64,
    ) -> Self {
        Self {
            timestamp: observed_at.trunc_subsecs(0),
            pace,
            home_score: snapshot.home_score,
            away_score: snapshot.away_score,
            clock_text: snapshot.clock_text.clone(),
            elapsed_minutes,
            period: snapshot.period,
        }
    }

    pub fn total_score(&self) -> f64 {
        self.home_score as f64 + self.away_score as f64
    }
}

// ============================================================================
// Odds & Baseline inputs
// ============================================================================

/// Bookmaker over/under line for one matchup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OddsQuote {
    pub matchup: String,
    pub over_total: Option<f64>,
}

/// League pace reference used to normalize the live pace
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeasonBaseline {
    pub mean_pace: f64,
    pub median_pace: f64,
}

impl Default for SeasonBaseline {
    fn default() -> Self {
        Self {
            mean_pace: DEFAULT_MEAN_PACE,
            median_pace: DEFAULT_MEDIAN_PACE,
        }
    }
}

// ============================================================================
// Projection Result
// ============================================================================

/// Point-total projections for the latest sample of a matchup.
///
/// Every metric is `None` when one of its inputs is missing or a guard
/// rejected the denominator. Metrics degrade independently.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectionResult {
    pub pace_adjusted_projection: Option<f64>,
    pub points_per_minute: Option<f64>,
    pub remaining_points_projection: Option<f64>,
    pub implied_remaining_points: Option<f64>,
    pub remainder_edge: Option<f64>,
    pub rich_adjusted_projection: Option<f64>,
    pub implied_efficiency: Option<f64>,
    /// Current pace minus the season mean
    pub pace_delta: f64,
    pub period: u8,
}

// ============================================================================
// Log Record (persisted row)
// ============================================================================

/// Column order expected by the persistence sink.
pub const LOG_RECORD_FIELDS: [&str; 11] = [
    "timestamp",
    "matchup",
    "clock",
    "pace",
    "home_score",
    "away_score",
    "bookmaker_total",
    "rich_projection",
    "projected_remaining_points",
    "remainder_edge",
    "rich_adjusted_projection",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    pub timestamp: DateTime<Utc>,
    pub matchup: String,
    pub clock: String,
    pub pace: f64,
    pub home_score: u16,
    pub away_score: u16,
    pub bookmaker_total: Option<f64>,
    pub rich_projection: Option<f64>,
    pub projected_remaining_points: Option<f64>,
    pub remainder_edge: Option<f64>,
    pub rich_adjusted_projection: Option<f64>,
}

impl LogRecord {
    pub fn new(
        matchup: &str,
        sample: &PaceSample,
        over_total: Option<f64>,
        projection: &ProjectionResult,
    ) -> Self {
        Self {
            timestamp: sample.timestamp,
            matchup: matchup.to_string(),
            clock: sample.clock_text.clone(),
            pace: sample.pace,
            home_score: sample.home_score,
            away_score: sample.away_score,
            bookmaker_total: over_total,
            rich_projection: projection.pace_adjusted_projection,
            projected_remaining_points: projection.remaining_points_projection,
            remainder_edge: projection.remainder_edge,
            rich_adjusted_projection: projection.rich_adjusted_projection,
        }
    }

    /// Flat row in `LOG_RECORD_FIELDS` order; unavailable metrics are `null`.
    pub fn to_row(&self) -> serde_json::Value {
        serde_json::json!([
            self.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            self.matchup,
            self.clock,
            round2(self.pace),
            self.home_score,
            self.away_score,
            self.bookmaker_total,
            self.rich_projection.map(round2),
            self.projected_remaining_points.map(round2),
            self.remainder_edge.map(round2),
            self.rich_adjusted_projection.map(round2),
        ])
    }
}

#[inline]
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
