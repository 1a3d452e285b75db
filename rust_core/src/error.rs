//! Typed errors raised at the edges of the analytics core.
//!
//! Nothing inside the calculation path returns these: clock parsing and
//! projections degrade instead. They only cover decoding snapshot input,
//! indicator configuration and record delivery.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("box score document is not valid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    #[error("box score document has no `game` object")]
    MissingGame,

    #[error("malformed box score for game {game_id}: {source}")]
    Malformed {
        game_id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("game {game_id} has an empty {side} team code")]
    MissingTeamCode { game_id: String, side: &'static str },
}

#[derive(Debug, Error, PartialEq)]
pub enum IndicatorConfigError {
    #[error("{band} window length must be at least 1")]
    ZeroLength { band: &'static str },

    #[error("{band} multiplier must be a finite non-negative number, got {value}")]
    InvalidMultiplier { band: &'static str, value: f64 },
}

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("record sink I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("record could not be serialized: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("record sink rejected the record: {0}")]
    Rejected(String),
}
