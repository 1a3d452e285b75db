//! Game clock parsing.
//!
//! Turns the free-text status shown by live feeds ("Q4 9:04", "Halftime",
//! "Final/OT", "PT09M04.00S") plus the period number into minutes of game
//! time elapsed since tip-off. Parsing never fails: text without a usable
//! remaining-time token falls back to the middle of the current quarter.

use regex::Regex;
use std::sync::OnceLock;

/// Minutes in one quarter. Overtime periods are treated the same way.
pub const QUARTER_MINUTES: f64 = 12.0;

/// Elapsed minutes reported for any "Half" status
pub const HALFTIME_ELAPSED_MINUTES: f64 = 24.0;

/// Offset from the end of the period used when no token is readable
const MIDPOINT_FALLBACK_MINUTES: f64 = 6.0;

fn iso_token() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"PT(\d+)M(\d+(?:\.\d+)?)S").ok())
        .as_ref()
}

fn colon_token() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d{0,2}):(\d{1,2}(?:\.\d+)?)").ok())
        .as_ref()
}

fn seconds_token() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?:^|\s)(\d{1,2}\.\d+)(?:\s|$)").ok())
        .as_ref()
}

/// Minutes remaining in the current period, if the text carries a clock.
///
/// Accepted tokens, first match wins:
/// - `PT09M04.00S` (ISO duration used by box-score feeds)
/// - `9:04`, `0:45.3`, `:45.3`
/// - `45.3` (bare seconds, the broadcast format inside the last minute)
pub fn remaining_minutes(clock_text: &str) -> Option<f64> {
    let minutes = if let Some(caps) = iso_token().and_then(|re| re.captures(clock_text)) {
        let mins = caps[1].parse::<f64>().ok()?;
        let secs = caps[2].parse::<f64>().ok()?;
        mins + secs / 60.0
    } else if let Some(caps) = colon_token().and_then(|re| re.captures(clock_text)) {
        let mins = if caps[1].is_empty() {
            0.0
        } else {
            caps[1].parse::<f64>().ok()?
        };
        let secs = caps[2].parse::<f64>().ok()?;
        mins + secs / 60.0
    } else if let Some(caps) = seconds_token().and_then(|re| re.captures(clock_text)) {
        caps[1].parse::<f64>().ok()? / 60.0
    } else {
        return None;
    };

    if minutes.is_finite() {
        Some(minutes.clamp(0.0, QUARTER_MINUTES))
    } else {
        None
    }
}

/// Minutes of game time elapsed since tip-off.
pub fn elapsed_minutes(clock_text: &str, period: u8) -> f64 {
    if period == 0 {
        return 0.0;
    }

    let period = period as f64;

    if clock_text.contains("Final") {
        return period * QUARTER_MINUTES;
    }
    if clock_text.contains("Half") {
        return HALFTIME_ELAPSED_MINUTES;
    }
    if clock_text.contains("Start") {
        return 0.0;
    }
    // "End of Q3" carries no clock but means zero time left in the period
    if clock_text.contains("End") {
        return period * QUARTER_MINUTES;
    }

    match remaining_minutes(clock_text) {
        Some(remaining) => (period - 1.0) * QUARTER_MINUTES + (QUARTER_MINUTES - remaining),
        None => period * QUARTER_MINUTES - MIDPOINT_FALLBACK_MINUTES,
    }
}

/// Seconds left in the current period, clipped at zero.
pub fn remaining_seconds_in_period(clock_text: &str, period: u8) -> f64 {
    let elapsed = elapsed_minutes(clock_text, period);
    (period as f64 * QUARTER_MINUTES * 60.0 - elapsed * 60.0).max(0.0)
}
