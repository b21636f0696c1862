use crate::state::sync::SyncUpdate;
use crossterm::event::KeyEvent;
use match_api::{MatchDetail, MatchSummary};

/// Poll outcomes posted by the sync components' pollers. The UI loop is the
/// only consumer and the only writer of sync state.
#[derive(Debug)]
pub enum SyncEvent {
    Matches(SyncUpdate<Vec<MatchSummary>>),
    Detail(SyncUpdate<MatchDetail>),
}

#[derive(Debug, Clone)]
pub enum UiEvent {
    KeyPressed(KeyEvent),
    Resize,
    AppStarted,
    AnimationTick,
}
