//! Pace estimation from box-score counting stats.
//!
//! Pace is possessions per 48 minutes, the normalized tempo of a game.
//! Possessions are estimated per team as `FGA + 0.44*FTA - OREB + TOV`.

use crate::models::{GameSnapshot, TeamBoxStats};

/// Share of free throw attempts that end a possession
pub const FTA_POSSESSION_WEIGHT: f64 = 0.44;

/// Regulation game length the pace is normalized to
pub const PACE_MINUTES: f64 = 48.0;

/// Floor on elapsed minutes so pace stays bounded right after tip-off
const MIN_ELAPSED_MINUTES: f64 = 1.0;

/// Estimated possessions for one team
#[inline]
pub fn estimate_possessions(stats: &TeamBoxStats) -> f64 {
    stats.field_goals_attempted as f64 + FTA_POSSESSION_WEIGHT * stats.free_throws_attempted as f64
        - stats.rebounds_offensive as f64
        + stats.turnovers as f64
}

/// Pace for a game given both teams' stats and minutes played.
///
/// Returns 0 before tip-off. The result is never negative and never
/// infinite; callers treat 0 as "not meaningful yet".
pub fn calculate_pace(
    home: &TeamBoxStats,
    away: &TeamBoxStats,
    period: u8,
    elapsed_minutes: f64,
) -> f64 {
    if period == 0 {
        return 0.0;
    }

    let avg_possessions = (estimate_possessions(home) + estimate_possessions(away)) / 2.0;
    // f64::max drops a NaN operand, so a NaN clock reads as the floor
    let minutes = elapsed_minutes.max(MIN_ELAPSED_MINUTES);
    let pace = avg_possessions / minutes * PACE_MINUTES;

    if pace.is_finite() {
        pace.max(0.0)
    } else {
        0.0
    }
}

/// Pace of a snapshot at the given elapsed time
pub fn snapshot_pace(snapshot: &GameSnapshot, elapsed_minutes: f64) -> f64 {
    calculate_pace(
        &snapshot.home_stats,
        &snapshot.away_stats,
        snapshot.period,
        elapsed_minutes,
    )
}
