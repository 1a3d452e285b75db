//! Input decoders for the external collaborators.
//!
//! Each submodule turns an already-fetched document into the plain values the
//! analytics core consumes. None of them perform network I/O.
//!
//! - `boxscore`: live box score -> `GameSnapshot`
//! - `odds`: cached quote table / odds-API events -> `OddsTable`
//! - `baseline`: team game logs -> `SeasonBaseline`, with a TTL cache

pub mod baseline;
pub mod boxscore;
pub mod odds;

pub use baseline::BaselineCache;
pub use boxscore::{DecodedGame, GameStatus};
pub use odds::OddsTable;
