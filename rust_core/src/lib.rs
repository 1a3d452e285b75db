//! Pace Core - live NBA pace tracking and total projections.
//!
//! This crate provides:
//! - Game clock parsing into elapsed / remaining minutes
//! - Possession-based pace estimation from box score counting stats
//! - Per-matchup pace time series with de-duplication
//! - Bollinger bands and Keltner channels over the pace series
//! - Pace-adjusted and rate-based total projections against the bookmaker line
//! - A per-matchup logging trigger for the end of the fourth quarter and overtime
//! - Decoders for box score, odds and season baseline payloads
//!
//! Network I/O, scheduling and record persistence live in the services; this
//! crate only transforms values it is handed.

pub mod clock;
pub mod error;
pub mod indicators;
pub mod models;
pub mod pace;
pub mod projection;
pub mod providers;
pub mod series;
pub mod sink;
pub mod store;
pub mod teams;
pub mod trigger;

pub use error::{IndicatorConfigError, SinkError, SnapshotError};
pub use indicators::{BandConfig, BandPoint, IndicatorBands, IndicatorConfig};
pub use models::{
    GameSnapshot, LogRecord, OddsQuote, PaceSample, ProjectionResult, SeasonBaseline,
    TeamBoxStats,
};
pub use series::{AppendOutcome, TimeSeriesStore};
pub use sink::{DeliveryStats, MemorySink, RecordSink};
pub use store::{AnalyticsStore, PollOutcome, SharedAnalyticsStore};
pub use trigger::{LoggingTrigger, TriggerState};
