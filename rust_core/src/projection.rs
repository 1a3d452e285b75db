//! Point-total projections against the bookmaker line.
//!
//! Combines the latest pace sample of a matchup with the season baseline and
//! the quoted over/under total. Each metric has its own input requirements and
//! degrades to `None` on its own; a missing line never hides the metrics that
//! only need the score and the clock.

use crate::models::{PaceSample, ProjectionResult, SeasonBaseline};

/// Regulation length in seconds
pub const REGULATION_SECONDS: f64 = 2880.0;

/// Scoring rate needs at least this much game time
pub const MIN_ELAPSED_MINUTES_FOR_RATE: f64 = 0.5;

/// Remaining-points extrapolation needs at least this much game time
pub const MIN_ELAPSED_SECONDS_FOR_PROJECTION: f64 = 60.0;

/// Pace must differ from the season median by more than this
pub const MIN_PACE_SPREAD: f64 = 0.1;

const FINAL_REGULATION_PERIOD: u8 = 4;
const PERIOD_SECONDS: f64 = 720.0;

/// Seconds of play left in the game as seen from `period`.
///
/// Before the fourth quarter the horizon is regulation; from the fourth
/// quarter on it is the end of the current period.
pub fn remaining_game_seconds(period: u8, elapsed_minutes: f64) -> f64 {
    let elapsed_seconds = elapsed_minutes * 60.0;
    let remaining = if period >= FINAL_REGULATION_PERIOD {
        period as f64 * PERIOD_SECONDS - elapsed_seconds
    } else {
        REGULATION_SECONDS - elapsed_seconds
    };
    remaining.max(0.0)
}

/// Compute every projection metric for a sample.
pub fn project(
    sample: &PaceSample,
    baseline: &SeasonBaseline,
    over_total: Option<f64>,
) -> ProjectionResult {
    let over_total = over_total.filter(|t| t.is_finite());
    let current_pace = sample.pace;
    let total_score = sample.total_score();
    let elapsed_minutes = sample.elapsed_minutes;
    let elapsed_seconds = elapsed_minutes * 60.0;
    let mean_pace = Some(baseline.mean_pace).filter(|m| *m > 0.0);

    let pace_adjusted_projection = over_total
        .zip(mean_pace)
        .and_then(|(total, mean)| finite(total * (current_pace / mean)));

    let points_per_minute = (elapsed_minutes > MIN_ELAPSED_MINUTES_FOR_RATE)
        .then(|| total_score / elapsed_minutes)
        .and_then(finite);

    let remaining_seconds = remaining_game_seconds(sample.period, elapsed_minutes);
    let remaining_points_projection = (elapsed_seconds > MIN_ELAPSED_SECONDS_FOR_PROJECTION)
        .then(|| total_score / elapsed_seconds * remaining_seconds)
        .and_then(finite);

    let implied_remaining_points = over_total.and_then(|total| finite(total - total_score));

    let remainder_edge = remaining_points_projection
        .zip(implied_remaining_points)
        .and_then(|(projected, implied)| finite(projected - implied));

    let pace_spread = current_pace - baseline.median_pace;
    let rich_adjusted_projection = remainder_edge
        .zip(remaining_points_projection)
        .filter(|_| pace_spread.abs() > MIN_PACE_SPREAD)
        .and_then(|(edge, projected)| finite(edge / pace_spread + (total_score + projected)));

    let implied_efficiency = over_total
        .zip(mean_pace)
        .and_then(|(total, mean)| finite(total / mean * 100.0));

    ProjectionResult {
        pace_adjusted_projection,
        points_per_minute,
        remaining_points_projection,
        implied_remaining_points,
        remainder_edge,
        rich_adjusted_projection,
        implied_efficiency,
        pace_delta: current_pace - baseline.mean_pace,
        period: sample.period,
    }
}

#[inline]
fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}
