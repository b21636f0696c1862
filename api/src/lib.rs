pub mod client;
pub mod wire;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Domain types: one snapshot per successful fetch
// ---------------------------------------------------------------------------

/// One row of the match list (`GET /matches`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSummary {
    pub match_id: String,
    pub team1: String,
    pub team1_flag: String, // "mod-us" style flag class
    pub team1_score: String,
    pub team2: String,
    pub team2_flag: String,
    pub team2_score: String,
    pub eta: String, // "LIVE", "1h 20m", ...
    pub event: String,
    pub stage: String,
    pub time: String,
}

impl MatchSummary {
    pub fn is_live(&self) -> bool {
        self.eta == "LIVE"
    }

    pub fn team1_flag_code(&self) -> &str {
        flag_code(&self.team1_flag)
    }

    pub fn team2_flag_code(&self) -> &str {
        flag_code(&self.team2_flag)
    }
}

/// Full match view (`GET /match/{id}`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchDetail {
    pub team1: String,
    pub team1_logo: String,
    pub team1_score: String,
    pub team2: String,
    pub team2_logo: String,
    pub team2_score: String,
    pub status: String,
    pub event: String,
    pub stage: String,
    pub maps: Vec<MapResult>,
    pub streams: Vec<StreamLink>,
}

impl MatchDetail {
    pub fn is_live(&self) -> bool {
        self.status.eq_ignore_ascii_case("live")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapResult {
    pub name: String,
    pub pick: String,
    pub team1_score: String,
    pub team2_score: String,
    pub time: String,
}

impl MapResult {
    pub fn is_picked(&self) -> bool {
        !self.pick.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamLink {
    pub name: String,
    pub link: String,
}

/// Strip the `mod-` prefix the service leaves on flag classes.
pub fn flag_code(flag: &str) -> &str {
    flag.strip_prefix("mod-").unwrap_or(flag)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_code_strips_mod_prefix() {
        assert_eq!(flag_code("mod-us"), "us");
        assert_eq!(flag_code("de"), "de");
        assert_eq!(flag_code(""), "");
    }

    #[test]
    fn live_labels() {
        let summary = MatchSummary { eta: "LIVE".into(), ..Default::default() };
        assert!(summary.is_live());
        let upcoming = MatchSummary { eta: "2h 5m".into(), ..Default::default() };
        assert!(!upcoming.is_live());

        let detail = MatchDetail { status: "LIVE".into(), ..Default::default() };
        assert!(detail.is_live());
        let detail = MatchDetail { status: "Upcoming".into(), ..Default::default() };
        assert!(!detail.is_live());
    }

    #[test]
    fn map_pick_indicator() {
        assert!(MapResult { pick: "PICK".into(), ..Default::default() }.is_picked());
        assert!(!MapResult::default().is_picked());
    }
}
