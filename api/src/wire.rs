//! Raw wire types for the match-data service.
//! The service fills unknown values with `null`, so text fields are
//! optional here and collapse to an empty string in the domain types.
//! Keys the service always writes are still required: a body without them
//! is not a match, whatever its status code.

use crate::{MapResult, MatchDetail, MatchSummary, StreamLink};
use serde::{Deserialize, Deserializer};

/// Key must be present, value may be `null`.
fn nullable<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)
}

// ---------------------------------------------------------------------------
// Match list  (GET /matches)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
pub struct WireMatch {
    #[serde(deserialize_with = "nullable")]
    pub match_id: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub team1: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub team1_flag: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub team1_score: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub team2: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub team2_flag: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub team2_score: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub eta: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub event: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub stage: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub time: Option<String>,
}

// ---------------------------------------------------------------------------
// Match detail  (GET /match/{id})
// ---------------------------------------------------------------------------

/// Team, logo, event and stage keys are left out when the page lacks them;
/// status, scores, maps and streams are always written.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct WireMatchDetail {
    pub team1: Option<String>,
    pub team1_logo: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub team1_score: Option<String>,
    pub team2: Option<String>,
    pub team2_logo: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub team2_score: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub status: Option<String>,
    pub event: Option<String>,
    pub stage: Option<String>,
    pub maps: Vec<WireMap>,
    pub streams: Vec<WireStream>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct WireMap {
    pub name: Option<String>,
    pub pick: Option<String>,
    pub team1_score: Option<String>,
    pub team2_score: Option<String>,
    pub time: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct WireStream {
    pub link: Option<String>,
    pub name: Option<String>,
}

// ---------------------------------------------------------------------------
// Mapping: wire types → domain types
// ---------------------------------------------------------------------------

impl From<WireMatch> for MatchSummary {
    fn from(w: WireMatch) -> Self {
        MatchSummary {
            match_id: w.match_id.unwrap_or_default(),
            team1: w.team1.unwrap_or_default(),
            team1_flag: w.team1_flag.unwrap_or_default(),
            team1_score: w.team1_score.unwrap_or_default(),
            team2: w.team2.unwrap_or_default(),
            team2_flag: w.team2_flag.unwrap_or_default(),
            team2_score: w.team2_score.unwrap_or_default(),
            eta: w.eta.unwrap_or_default(),
            event: w.event.unwrap_or_default(),
            stage: w.stage.unwrap_or_default(),
            time: w.time.unwrap_or_default(),
        }
    }
}

impl From<WireMatchDetail> for MatchDetail {
    fn from(w: WireMatchDetail) -> Self {
        MatchDetail {
            team1: w.team1.unwrap_or_default(),
            team1_logo: w.team1_logo.unwrap_or_default(),
            team1_score: w.team1_score.unwrap_or_default(),
            team2: w.team2.unwrap_or_default(),
            team2_logo: w.team2_logo.unwrap_or_default(),
            team2_score: w.team2_score.unwrap_or_default(),
            status: w.status.unwrap_or_default(),
            event: w.event.unwrap_or_default(),
            stage: w.stage.unwrap_or_default(),
            maps: w.maps.into_iter().map(MapResult::from).collect(),
            streams: w.streams.into_iter().map(StreamLink::from).collect(),
        }
    }
}

impl From<WireMap> for MapResult {
    fn from(w: WireMap) -> Self {
        MapResult {
            name: w.name.unwrap_or_default(),
            pick: w.pick.unwrap_or_default(),
            team1_score: w.team1_score.unwrap_or_default(),
            team2_score: w.team2_score.unwrap_or_default(),
            time: w.time.unwrap_or_default(),
        }
    }
}

impl From<WireStream> for StreamLink {
    fn from(w: WireStream) -> Self {
        StreamLink {
            name: w.name.unwrap_or_default(),
            link: w.link.unwrap_or_default(),
        }
    }
}
