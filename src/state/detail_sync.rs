use crate::state::feed::MatchFeed;
use crate::state::messages::SyncEvent;
use crate::state::poller::{PollHandle, PollingEngine};
use crate::state::sync::{Applied, FetchError, SyncState, SyncUpdate};
use chrono::{DateTime, Local};
use log::{debug, info, warn};
use match_api::MatchDetail;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Message shown in place of match data once a tick has failed.
pub const LOAD_FAILED: &str = "Load Failed";

/// What the detail view should show. There is no separate reloading state:
/// Ready and Failed hold until the next completed tick says otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailPhase {
    Uninitialized,
    Loading,
    Ready,
    Failed,
}

/// Keeps one match's detail in sync, keyed by match id.
///
/// A new id always means a new session: the old timer is stopped first,
/// old data is dropped, and anything still in flight for the old id is
/// ignored when it lands.
pub struct DetailSync {
    match_id: Option<String>,
    state: SyncState<MatchDetail>,
    poller: Option<PollHandle>,
    period: Duration,
    events: mpsc::UnboundedSender<SyncEvent>,
}

impl DetailSync {
    pub fn new(period: Duration, events: mpsc::UnboundedSender<SyncEvent>) -> Self {
        Self {
            match_id: None,
            state: SyncState::default(),
            poller: None,
            period,
            events,
        }
    }

    /// Start syncing `match_id`. Returns false when nothing changed: the id
    /// is blank, or that match is already being synced.
    pub fn open(&mut self, match_id: &str, feed: Arc<dyn MatchFeed>) -> bool {
        let match_id = match_id.trim();
        if match_id.is_empty() {
            warn!("cannot open a match without an id");
            return false;
        }
        if self.match_id.as_deref() == Some(match_id) && self.is_active() {
            return false;
        }

        self.close();
        let session = self.state.reset();
        self.match_id = Some(match_id.to_owned());
        info!("match {match_id} sync started (every {:?})", self.period);

        let id = match_id.to_owned();
        let fetch = move || {
            let feed = feed.clone();
            let id = id.clone();
            async move { feed.match_detail(&id).await }
        };
        let result_tx = self.events.clone();
        let error_tx = self.events.clone();

        self.poller = Some(PollingEngine::start(
            format!("match {match_id}"),
            fetch,
            self.period,
            move |seq, detail| {
                let update = SyncUpdate { session, seq, outcome: Ok(detail) };
                let _ = result_tx.send(SyncEvent::Detail(update));
            },
            move |seq, err: FetchError| {
                let update = SyncUpdate { session, seq, outcome: Err(err) };
                let _ = error_tx.send(SyncEvent::Detail(update));
            },
        ));
        true
    }

    /// Stop polling and drop the session. Safe to call when nothing is open.
    pub fn close(&mut self) {
        if let Some(mut poller) = self.poller.take() {
            poller.stop();
        }
        if let Some(id) = self.match_id.take() {
            debug!("match {id} sync closed");
            self.state.reset();
        }
    }

    pub fn is_active(&self) -> bool {
        self.poller.as_ref().is_some_and(PollHandle::is_active)
    }

    /// Returns true when the update was applied.
    pub fn apply(&mut self, update: SyncUpdate<MatchDetail>) -> bool {
        let seq = update.seq;
        let applied = self.state.apply(update);
        let id = self.match_id.as_deref().unwrap_or("-");
        match applied {
            Applied::Snapshot => debug!("match {id} tick {seq} applied"),
            Applied::Error => {
                if let Some(e) = self.state.error() {
                    warn!("Error fetching match details for {id}: {}", e.cause());
                }
            }
            Applied::Stale => debug!("match {id} tick {seq} arrived out of order, dropped"),
            Applied::Detached => debug!("dropping tick {seq} from a closed match session"),
        }
        applied.changed()
    }

    pub fn phase(&self) -> DetailPhase {
        if self.match_id.is_none() {
            DetailPhase::Uninitialized
        } else if self.state.error().is_some() {
            DetailPhase::Failed
        } else if self.state.data().is_some() {
            DetailPhase::Ready
        } else {
            DetailPhase::Loading
        }
    }

    /// Match data, only while the last completed tick succeeded.
    pub fn detail(&self) -> Option<&MatchDetail> {
        match self.phase() {
            DetailPhase::Ready => self.state.data(),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&'static str> {
        (self.phase() == DetailPhase::Failed).then_some(LOAD_FAILED)
    }

    pub fn last_error(&self) -> Option<&FetchError> {
        self.state.error()
    }

    pub fn match_id(&self) -> Option<&str> {
        self.match_id.as_deref()
    }

    pub fn updated_at(&self) -> Option<DateTime<Local>> {
        self.state.updated_at()
    }
}
