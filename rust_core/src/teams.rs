//! NBA team table.
//!
//! Maps the full franchise names used by odds feeds to the three-letter
//! tricodes used by box scores and matchup keys.

/// One franchise
#[derive(Debug, Clone, Copy)]
pub struct TeamInfo {
    pub name: &'static str,
    pub tricode: &'static str,
}

pub static NBA_TEAMS: &[TeamInfo] = &[
    TeamInfo { name: "Atlanta Hawks", tricode: "ATL" },
    TeamInfo { name: "Boston Celtics", tricode: "BOS" },
    TeamInfo { name: "Brooklyn Nets", tricode: "BKN" },
    TeamInfo { name: "Charlotte Hornets", tricode: "CHA" },
    TeamInfo { name: "Chicago Bulls", tricode: "CHI" },
    TeamInfo { name: "Cleveland Cavaliers", tricode: "CLE" },
    TeamInfo { name: "Dallas Mavericks", tricode: "DAL" },
    TeamInfo { name: "Denver Nuggets", tricode: "DEN" },
    TeamInfo { name: "Detroit Pistons", tricode: "DET" },
    TeamInfo { name: "Golden State Warriors", tricode: "GSW" },
    TeamInfo { name: "Houston Rockets", tricode: "HOU" },
    TeamInfo { name: "Indiana Pacers", tricode: "IND" },
    TeamInfo { name: "Los Angeles Clippers", tricode: "LAC" },
    TeamInfo { name: "Los Angeles Lakers", tricode: "LAL" },
    TeamInfo { name: "Memphis Grizzlies", tricode: "MEM" },
    TeamInfo { name: "Miami Heat", tricode: "MIA" },
    TeamInfo { name: "Milwaukee Bucks", tricode: "MIL" },
    TeamInfo { name: "Minnesota Timberwolves", tricode: "MIN" },
    TeamInfo { name: "New Orleans Pelicans", tricode: "NOP" },
    TeamInfo { name: "New York Knicks", tricode: "NYK" },
    TeamInfo { name: "Oklahoma City Thunder", tricode: "OKC" },
    TeamInfo { name: "Orlando Magic", tricode: "ORL" },
    TeamInfo { name: "Philadelphia 76ers", tricode: "PHI" },
    TeamInfo { name: "Phoenix Suns", tricode: "PHX" },
    TeamInfo { name: "Portland Trail Blazers", tricode: "POR" },
    TeamInfo { name: "Sacramento Kings", tricode: "SAC" },
    TeamInfo { name: "San Antonio Spurs", tricode: "SAS" },
    TeamInfo { name: "Toronto Raptors", tricode: "TOR" },
    TeamInfo { name: "Utah Jazz", tricode: "UTA" },
    TeamInfo { name: "Washington Wizards", tricode: "WAS" },
];

/// Tricode for a full team name (case-insensitive)
pub fn tricode_for(name: &str) -> Option<&'static str> {
    let name = name.trim();
    NBA_TEAMS
        .iter()
        .find(|t| t.name.eq_ignore_ascii_case(name))
        .map(|t| t.tricode)
}

pub fn is_known_tricode(code: &str) -> bool {
    NBA_TEAMS.iter().any(|t| t.tricode == code)
}
