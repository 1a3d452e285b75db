//! End-of-period logging trigger.
//!
//! Per matchup state machine deciding when a poll should produce a persisted
//! record:
//!
//! ```text
//! Monitoring --(period >= 4 and 0 < remaining <= 90s)--> LoggingWindow
//! LoggingWindow --(clock runs out or period advances)--> Closed { period }
//! LoggingWindow --(clock reads outside the window, same period)--> Monitoring
//! any --(game final)--> Closed { is_final: true }
//! Closed { period } --(later period, game not final)--> Monitoring
//! ```
//!
//! A clock that cannot be read, or a scorer correction that moves the clock
//! back above 90s, only suspends the window. The next qualifying poll in the
//! same period re-enters it.
//!
//! While in the window, at most one record is emitted per new sample, and
//! never twice for the same clock text.

use serde::Serialize;
use tracing::debug;

/// Width of the logging window at the end of a period
pub const LOGGING_WINDOW_SECONDS: f64 = 90.0;

/// First period eligible for logging
pub const LOGGING_MIN_PERIOD: u8 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TriggerState {
    Monitoring,
    LoggingWindow { period: u8 },
    Closed { period: u8, is_final: bool },
}

impl TriggerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerState::Monitoring => "monitoring",
            TriggerState::LoggingWindow { .. } => "logging_window",
            TriggerState::Closed { .. } => "closed",
        }
    }
}

/// Whether a poll falls inside the end-of-period logging window
pub fn in_logging_window(period: u8, remaining_seconds: f64) -> bool {
    period >= LOGGING_MIN_PERIOD
        && remaining_seconds > 0.0
        && remaining_seconds <= LOGGING_WINDOW_SECONDS
}

/// What the trigger sees on one poll
#[derive(Debug, Clone, Copy)]
pub struct TriggerInput<'a> {
    pub period: u8,
    pub remaining_seconds: f64,
    pub is_final: bool,
    pub clock_text: &'a str,
    /// The poll appended a new sample to the series
    pub is_new_sample: bool,
    /// Enter the window regardless of the clock
    pub force: bool,
}

#[derive(Debug, Clone)]
pub struct LoggingTrigger {
    state: TriggerState,
    last_emitted_clock: Option<String>,
    emitted: u64,
}

impl Default for LoggingTrigger {
    fn default() -> Self {
        Self::new()
    }
}

impl LoggingTrigger {
    pub fn new() -> Self {
        Self {
            state: TriggerState::Monitoring,
            last_emitted_clock: None,
            emitted: 0,
        }
    }

    pub fn state(&self) -> TriggerState {
        self.state
    }

    /// Records emitted so far for this matchup
    pub fn emitted(&self) -> u64 {
        self.emitted
    }

    /// Advance the state machine and report whether this poll emits a record.
    ///
    /// A `true` result is final: the emission is recorded before the caller
    /// attempts delivery, so a failed write is never retried by re-emitting.
    pub fn observe(&mut self, matchup: &str, input: &TriggerInput<'_>) -> bool {
        let next = self.next_state(input);
        if next != self.state {
            debug!(
                "{}: logging trigger {} -> {} (period {}, {:.0}s left)",
                matchup,
                self.state.as_str(),
                next.as_str(),
                input.period,
                input.remaining_seconds
            );
            self.state = next;
        }

        if !matches!(self.state, TriggerState::LoggingWindow { .. }) || !input.is_new_sample {
            return false;
        }
        if self.last_emitted_clock.as_deref() == Some(input.clock_text) {
            debug!("{}: clock {} already logged, skipped", matchup, input.clock_text);
            return false;
        }

        self.last_emitted_clock = Some(input.clock_text.to_string());
        self.emitted += 1;
        true
    }

    fn next_state(&self, input: &TriggerInput<'_>) -> TriggerState {
        match self.state {
            TriggerState::Closed { is_final: true, .. } => return self.state,
            _ if input.is_final => {
                return TriggerState::Closed {
                    period: input.period,
                    is_final: true,
                }
            }
            TriggerState::Closed { period, .. } if input.period <= period && !input.force => {
                return self.state
            }
            _ => {}
        }

        let qualifies = input.force || in_logging_window(input.period, input.remaining_seconds);
        if qualifies {
            return TriggerState::LoggingWindow {
                period: input.period,
            };
        }
        match self.state {
            TriggerState::LoggingWindow { period }
                if input.period > period || input.remaining_seconds <= 0.0 =>
            {
                TriggerState::Closed {
                    period,
                    is_final: false,
                }
            }
            // a later period re-arms a closed matchup (overtime); a lapse
            // inside the period falls back to monitoring
            _ => TriggerState::Monitoring,
        }
    }
}
