//! Live box-score decoding.
//!
//! Decodes an already-fetched box-score document into a `GameSnapshot`.
//! Required fields are strict: a document missing scores, period or the four
//! counting stats is rejected with the game id in the error rather than
//! defaulted to zero.

use crate::error::SnapshotError;
use crate::models::{GameSnapshot, TeamBoxStats};
use crate::teams;
use serde::Deserialize;
use tracing::warn;

/// `gameStatus` values used by the feed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    Scheduled,
    Live,
    Final,
}

impl GameStatus {
    pub fn from_code(code: u8) -> Self {
        match code {
            0 | 1 => GameStatus::Scheduled,
            2 => GameStatus::Live,
            _ => GameStatus::Final,
        }
    }

    /// Live or finished games are tracked; scheduled ones are not
    pub fn is_active(&self) -> bool {
        !matches!(self, GameStatus::Scheduled)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BoxscoreStatistics {
    field_goals_attempted: u32,
    free_throws_attempted: u32,
    rebounds_offensive: u32,
    turnovers: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BoxscoreTeam {
    team_tricode: String,
    score: u16,
    statistics: BoxscoreStatistics,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BoxscoreGame {
    game_id: String,
    game_status: u8,
    #[serde(default)]
    game_status_text: Option<String>,
    period: u8,
    home_team: BoxscoreTeam,
    away_team: BoxscoreTeam,
}

/// A decoded box score with its feed status
#[derive(Debug, Clone)]
pub struct DecodedGame {
    pub status: GameStatus,
    pub snapshot: GameSnapshot,
}

impl From<BoxscoreStatistics> for TeamBoxStats {
    fn from(stats: BoxscoreStatistics) -> Self {
        TeamBoxStats {
            field_goals_attempted: stats.field_goals_attempted,
            free_throws_attempted: stats.free_throws_attempted,
            rebounds_offensive: stats.rebounds_offensive,
            turnovers: stats.turnovers,
        }
    }
}

/// Decode a box-score document (`{"game": {...}}`).
pub fn parse_boxscore(json: &str) -> Result<DecodedGame, SnapshotError> {
    let value: serde_json::Value = serde_json::from_str(json).map_err(SnapshotError::InvalidJson)?;
    decode_boxscore(value)
}

pub fn decode_boxscore(mut value: serde_json::Value) -> Result<DecodedGame, SnapshotError> {
    let game = value
        .get_mut("game")
        .filter(|g| g.is_object())
        .map(serde_json::Value::take)
        .ok_or(SnapshotError::MissingGame)?;

    let game_id = game["gameId"].as_str().unwrap_or("<unknown>").to_string();
    let game: BoxscoreGame =
        serde_json::from_value(game).map_err(|source| SnapshotError::Malformed {
            game_id: game_id.clone(),
            source,
        })?;

    for (side, team) in [("home", &game.home_team), ("away", &game.away_team)] {
        if team.team_tricode.trim().is_empty() {
            return Err(SnapshotError::MissingTeamCode {
                game_id: game.game_id.clone(),
                side,
            });
        }
        if !teams::is_known_tricode(&team.team_tricode) {
            warn!(
                "{}: unknown {} tricode {}, no bookmaker line will match",
                game.game_id, side, team.team_tricode
            );
        }
    }

    let status = GameStatus::from_code(game.game_status);
    let clock_text = game
        .game_status_text
        .map(|t| t.trim().to_string())
        .unwrap_or_else(|| "Unknown".to_string());

    Ok(DecodedGame {
        status,
        snapshot: GameSnapshot {
            game_id: game.game_id,
            period: game.period,
            clock_text,
            home_code: game.home_team.team_tricode,
            away_code: game.away_team.team_tricode,
            home_score: game.home_team.score,
            away_score: game.away_team.score,
            home_stats: game.home_team.statistics.into(),
            away_stats: game.away_team.statistics.into(),
            game_final: status == GameStatus::Final,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn team(code: &str, score: u16, fga: u32, fta: u32, oreb: u32, tov: u32) -> serde_json::Value {
        json!({
            "teamTricode": code,
            "score": score,
            "statistics": {
                "fieldGoalsAttempted": fga,
                "freeThrowsAttempted": fta,
                "reboundsOffensive": oreb,
                "turnovers": tov,
                "assists": 21
            }
        })
    }

    fn document(status: u8, text: &str, period: u8) -> serde_json::Value {
        json!({
            "meta": {"version": 1},
            "game": {
                "gameId": "0022400517",
                "gameStatus": status,
                "gameStatusText": text,
                "period": period,
                "homeTeam": team("LAL", 58, 40, 10, 8, 12),
                "awayTeam": team("GSW", 60, 42, 8, 6, 14)
            }
        })
    }

    #[test]
    fn test_decode_live_game() {
        let decoded = parse_boxscore(&document(2, "Q3 5:12 ", 3).to_string()).unwrap();
        assert_eq!(decoded.status, GameStatus::Live);
        let snapshot = decoded.snapshot;
        assert_eq!(snapshot.matchup_key(), "GSW @ LAL");
        assert_eq!(snapshot.clock_text, "Q3 5:12");
        assert_eq!(snapshot.period, 3);
        assert_eq!(snapshot.home_score, 58);
        assert_eq!(snapshot.away_stats.turnovers, 14);
        assert_eq!(snapshot.home_stats.free_throws_attempted, 10);
    }

    #[test]
    fn test_status_codes() {
        assert!(!GameStatus::from_code(1).is_active());
        assert!(GameStatus::from_code(2).is_active());
        assert_eq!(GameStatus::from_code(3), GameStatus::Final);
        let decoded = decode_boxscore(document(1, "7:30 pm ET", 0)).unwrap();
        assert!(!decoded.status.is_active());
    }

    #[test]
    fn test_missing_stat_fails_with_game_id() {
        let mut doc = document(2, "Q1 8:00", 1);
        doc["game"]["homeTeam"]["statistics"]
            .as_object_mut()
            .unwrap()
            .remove("turnovers");
        let err = decode_boxscore(doc).unwrap_err();
        match err {
            SnapshotError::Malformed { game_id, .. } => assert_eq!(game_id, "0022400517"),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_negative_score_rejected() {
        let mut doc = document(2, "Q1 8:00", 1);
        doc["game"]["awayTeam"]["score"] = json!(-3);
        assert!(matches!(
            decode_boxscore(doc),
            Err(SnapshotError::Malformed { .. })
        ));
    }

    #[test]
    fn test_empty_tricode_rejected() {
        let mut doc = document(2, "Q1 8:00", 1);
        doc["game"]["homeTeam"]["teamTricode"] = json!(" ");
        assert!(matches!(
            decode_boxscore(doc),
            Err(SnapshotError::MissingTeamCode { side: "home", .. })
        ));
    }

    #[test]
    fn test_unknown_tricode_still_decodes() {
        let mut doc = document(2, "Q2 3:00", 2);
        doc["game"]["awayTeam"]["teamTricode"] = json!("DRT");
        let decoded = decode_boxscore(doc).unwrap();
        assert_eq!(decoded.snapshot.matchup_key(), "DRT @ LAL");
        assert!(!teams::is_known_tricode(&decoded.snapshot.away_code));
        assert!(teams::is_known_tricode(&decoded.snapshot.home_code));
    }

    #[test]
    fn test_final_status_marks_snapshot() {
        let decoded = decode_boxscore(document(3, "Q4 0:00", 4)).unwrap();
        assert_eq!(decoded.status, GameStatus::Final);
        assert!(decoded.snapshot.game_final);
        assert!(decoded.snapshot.is_final());

        let live = decode_boxscore(document(2, "Q4 0:00", 4)).unwrap();
        assert!(!live.snapshot.is_final());
    }

    #[test]
    fn test_missing_game_and_bad_json() {
        assert!(matches!(
            decode_boxscore(json!({"meta": {}})),
            Err(SnapshotError::MissingGame)
        ));
        assert!(matches!(
            parse_boxscore("{not json"),
            Err(SnapshotError::InvalidJson(_))
        ));
    }

    #[test]
    fn test_missing_status_text_defaults() {
        let mut doc = document(2, "", 2);
        doc["game"].as_object_mut().unwrap().remove("gameStatusText");
        let decoded = decode_boxscore(doc).unwrap();
        assert_eq!(decoded.snapshot.clock_text, "Unknown");
    }
}
