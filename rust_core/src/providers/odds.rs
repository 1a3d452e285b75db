//! Bookmaker total lines.
//!
//! The odds poller keeps a local quote table keyed by matchup:
//!
//! ```json
//! { "GSW @ LAL": { "Over": 221.5 }, "BOS @ NYK": { "Over": null } }
//! ```
//!
//! This module loads that table, and can also build it from an odds-API event
//! list for a single bookmaker. A matchup without a quote, or with a null
//! line, reads as "no line".

use crate::models::{matchup_key, OddsQuote};
use crate::teams::tricode_for;
use anyhow::{Context, Result};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

pub const DEFAULT_BOOKMAKER: &str = "draftkings";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct CachedQuote {
    #[serde(rename = "Over", default)]
    over: Option<f64>,
}

/// Quote table for the current poll
#[derive(Debug, Clone, Default)]
pub struct OddsTable {
    quotes: FxHashMap<String, OddsQuote>,
}

impl OddsTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the cached quote table. A missing file is an empty table.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!("odds table {} not found, no lines available", path.display());
            return Ok(Self::new());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading odds table {}", path.display()))?;
        Self::from_cached_json(&content)
            .with_context(|| format!("decoding odds table {}", path.display()))
    }

    pub fn from_cached_json(json: &str) -> Result<Self> {
        let cached: FxHashMap<String, CachedQuote> = serde_json::from_str(json)?;
        let mut table = Self::new();
        for (matchup, quote) in cached {
            table.insert(OddsQuote {
                matchup,
                over_total: quote.over,
            });
        }
        Ok(table)
    }

    /// Build the table from an odds-API event list, reading the `Over`
    /// outcome of the `totals` market for one bookmaker. Events with
    /// unknown team names or without that bookmaker are skipped.
    pub fn from_odds_api(events: &serde_json::Value, bookmaker: &str) -> Self {
        let mut table = Self::new();
        let Some(events) = events.as_array() else {
            return table;
        };

        for event in events {
            let home = event["home_team"].as_str().and_then(tricode_for);
            let away = event["away_team"].as_str().and_then(tricode_for);
            let (Some(home), Some(away)) = (home, away) else {
                continue;
            };

            let over = event["bookmakers"]
                .as_array()
                .and_then(|books| books.iter().find(|b| b["key"] == bookmaker))
                .and_then(|book| book["markets"].as_array())
                .and_then(|markets| markets.iter().find(|m| m["key"] == "totals"))
                .and_then(|totals| totals["outcomes"].as_array())
                .and_then(|outcomes| outcomes.iter().find(|o| o["name"] == "Over"));

            if let Some(over) = over {
                table.insert(OddsQuote {
                    matchup: matchup_key(away, home),
                    over_total: over["point"].as_f64(),
                });
            }
        }

        table
    }

    /// Write the table in the cached format
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let cached: FxHashMap<&str, CachedQuote> = self
            .quotes
            .values()
            .map(|q| (q.matchup.as_str(), CachedQuote { over: q.over_total }))
            .collect();
        let path = path.as_ref();
        fs::write(path, serde_json::to_string_pretty(&cached)?)
            .with_context(|| format!("writing odds table {}", path.display()))
    }

    pub fn insert(&mut self, quote: OddsQuote) {
        self.quotes.insert(quote.matchup.clone(), quote);
    }

    pub fn get(&self, matchup: &str) -> Option<&OddsQuote> {
        self.quotes.get(matchup)
    }

    /// Over/under line, `None` when there is no usable quote
    pub fn over_total(&self, matchup: &str) -> Option<f64> {
        self.get(matchup)
            .and_then(|q| q.over_total)
            .filter(|t| t.is_finite())
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }
}
