use crate::state::feed::MatchFeed;
use crate::state::messages::SyncEvent;
use crate::state::poller::{PollHandle, PollingEngine};
use crate::state::sync::{Applied, FetchError, SyncState, SyncUpdate};
use chrono::{DateTime, Local};
use log::{debug, info, warn};
use match_api::MatchSummary;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Keeps the match list in sync with the service.
///
/// Failures never reach the view: the last good list stays on screen and
/// the error only goes to the log.
pub struct ListSync {
    state: SyncState<Vec<MatchSummary>>,
    poller: Option<PollHandle>,
    period: Duration,
    events: mpsc::UnboundedSender<SyncEvent>,
}

impl ListSync {
    pub fn new(period: Duration, events: mpsc::UnboundedSender<SyncEvent>) -> Self {
        Self {
            state: SyncState::default(),
            poller: None,
            period,
            events,
        }
    }

    pub fn activate(&mut self, feed: Arc<dyn MatchFeed>) {
        self.deactivate();
        let session = self.state.reset();
        info!("match list sync started against {} (every {:?})", feed.name(), self.period);

        let fetch = move || {
            let feed = feed.clone();
            async move { feed.matches().await }
        };
        let result_tx = self.events.clone();
        let error_tx = self.events.clone();

        self.poller = Some(PollingEngine::start(
            "matches",
            fetch,
            self.period,
            move |seq, matches| {
                let update = SyncUpdate { session, seq, outcome: Ok(matches) };
                let _ = result_tx.send(SyncEvent::Matches(update));
            },
            move |seq, err: FetchError| {
                let update = SyncUpdate { session, seq, outcome: Err(err) };
                let _ = error_tx.send(SyncEvent::Matches(update));
            },
        ));
    }

    /// Stop polling and tear the session down. Queued updates are ignored.
    pub fn deactivate(&mut self) {
        if let Some(mut poller) = self.poller.take() {
            poller.stop();
            self.state.reset();
        }
    }

    pub fn is_active(&self) -> bool {
        self.poller.as_ref().is_some_and(PollHandle::is_active)
    }

    /// Returns true when the update was applied.
    pub fn apply(&mut self, update: SyncUpdate<Vec<MatchSummary>>) -> bool {
        let seq = update.seq;
        let applied = self.state.apply(update);
        match applied {
            Applied::Snapshot => {
                let count = self.state.data().map_or(0, Vec::len);
                debug!("match list tick {seq}: {count} matches");
            }
            Applied::Error => {
                if let Some(e) = self.state.error() {
                    warn!("Error fetching matches: {}", e.cause());
                }
            }
            Applied::Stale => debug!("match list tick {seq} arrived out of order, dropped"),
            Applied::Detached => {}
        }
        applied.changed()
    }

    /// `None` until the first successful tick.
    pub fn matches(&self) -> Option<&[MatchSummary]> {
        self.state.data().map(Vec::as_slice)
    }

    /// Last failure, kept for diagnostics only.
    pub fn last_error(&self) -> Option<&FetchError> {
        self.state.error()
    }

    pub fn updated_at(&self) -> Option<DateTime<Local>> {
        self.state.updated_at()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::feed::testing::{ScriptedFeed, summary};
    use tokio::time::sleep;

    const PERIOD: Duration = Duration::from_millis(3000);

    fn setup() -> (ListSync, mpsc::UnboundedReceiver<SyncEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (ListSync::new(PERIOD, tx), rx)
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<SyncEvent>, sync: &mut ListSync) -> usize {
        let mut applied = 0;
        while let Ok(event) = rx.try_recv() {
            if let SyncEvent::Matches(update) = event
                && sync.apply(update)
            {
                applied += 1;
            }
        }
        applied
    }

    fn ids(sync: &ListSync) -> Vec<String> {
        sync.matches()
            .unwrap_or_default()
            .iter()
            .map(|m| m.match_id.clone())
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn loading_until_first_tick() {
        let (mut sync, mut rx) = setup();
        let feed = Arc::new(ScriptedFeed::new().matches_ok(200, vec![summary("m1", "A", "B")]));
        sync.activate(feed);

        sleep(Duration::from_millis(100)).await;
        drain(&mut rx, &mut sync);
        assert!(sync.matches().is_none());

        sleep(Duration::from_millis(200)).await;
        drain(&mut rx, &mut sync);
        assert_eq!(ids(&sync), ["m1"]);
        assert!(sync.updated_at().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn server_order_is_kept() {
        let (mut sync, mut rx) = setup();
        let feed = Arc::new(ScriptedFeed::new().matches_ok(
            5,
            vec![summary("9", "Z", "Y"), summary("2", "B", "C"), summary("5", "E", "F")],
        ));
        sync.activate(feed);

        sleep(Duration::from_millis(50)).await;
        drain(&mut rx, &mut sync);
        assert_eq!(ids(&sync), ["9", "2", "5"]);
    }

    #[tokio::test(start_paused = true)]
    async fn each_tick_replaces_the_whole_list() {
        let (mut sync, mut rx) = setup();
        let feed = Arc::new(
            ScriptedFeed::new()
                .matches_ok(5, vec![summary("m1", "A", "B"), summary("m2", "C", "D")])
                .matches_ok(5, vec![summary("m3", "E", "F")]),
        );
        sync.activate(feed);

        sleep(Duration::from_millis(50)).await;
        drain(&mut rx, &mut sync);
        assert_eq!(ids(&sync), ["m1", "m2"]);

        sleep(Duration::from_millis(3000)).await;
        drain(&mut rx, &mut sync);
        assert_eq!(ids(&sync), ["m3"]);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_tick_keeps_previous_list() {
        let (mut sync, mut rx) = setup();
        let feed = Arc::new(
            ScriptedFeed::new()
                .matches_ok(5, vec![summary("m1", "A", "B")])
                .matches_err(5),
        );
        sync.activate(feed);

        sleep(Duration::from_millis(50)).await;
        drain(&mut rx, &mut sync);
        assert_eq!(ids(&sync), ["m1"]);

        sleep(Duration::from_millis(3000)).await;
        drain(&mut rx, &mut sync);
        assert_eq!(ids(&sync), ["m1"], "stale-but-valid list stays displayed");
        assert!(sync.last_error().is_some(), "failure is still recorded for diagnostics");
    }

    #[tokio::test(start_paused = true)]
    async fn polling_continues_after_errors() {
        let (mut sync, mut rx) = setup();
        let feed = Arc::new(
            ScriptedFeed::new()
                .matches_err(5)
                .matches_ok(5, vec![summary("m1", "A", "B")]),
        );
        sync.activate(feed.clone());

        sleep(Duration::from_millis(50)).await;
        drain(&mut rx, &mut sync);
        assert!(sync.matches().is_none());

        sleep(Duration::from_millis(3000)).await;
        drain(&mut rx, &mut sync);
        assert_eq!(ids(&sync), ["m1"]);
        assert!(sync.last_error().is_none());
        assert_eq!(feed.list_calls(), 2);
    }

    // Responses are applied by tick order, not completion order.
    #[tokio::test(start_paused = true)]
    async fn slow_earlier_tick_does_not_overwrite_newer_list() {
        let (mut sync, mut rx) = setup();
        let feed = Arc::new(
            ScriptedFeed::new()
                .matches_ok(4000, vec![summary("old", "A", "B")])
                .matches_ok(10, vec![summary("new", "A", "B")]),
        );
        sync.activate(feed);

        sleep(Duration::from_millis(3500)).await;
        drain(&mut rx, &mut sync);
        assert_eq!(ids(&sync), ["new"]);

        sleep(Duration::from_millis(1000)).await;
        drain(&mut rx, &mut sync);
        assert_eq!(ids(&sync), ["new"]);
    }

    #[tokio::test(start_paused = true)]
    async fn deactivate_stops_polling_and_discards_queued_updates() {
        let (mut sync, mut rx) = setup();
        let feed = Arc::new(ScriptedFeed::new().matches_ok(5, vec![summary("m1", "A", "B")]));
        sync.activate(feed.clone());

        sleep(Duration::from_millis(50)).await;
        assert!(sync.is_active());
        sync.deactivate();
        sync.deactivate();
        assert!(!sync.is_active());

        assert_eq!(drain(&mut rx, &mut sync), 0);
        assert!(sync.matches().is_none());

        sleep(Duration::from_millis(10_000)).await;
        assert_eq!(feed.list_calls(), 1);
    }

    #[tokio::test]
    async fn first_tick_against_http_service_stores_payload_verbatim() {
        use match_api::client::MatchApi;
        use tokio::time::timeout;

        let body = r#"[{"match_id":"m1","team1":"A","team1_score":"1","team2":"B","team2_score":"0","eta":"LIVE","event":"Cup","stage":"Final","time":"12:00","team1_flag":"mod-us","team2_flag":"mod-de"}]"#;
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/matches")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await;

        let (mut sync, mut rx) = setup();
        sync.activate(Arc::new(MatchApi::new().with_base_url(server.url())));

        let event = timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("first tick should land quickly")
            .expect("channel open");
        let SyncEvent::Matches(update) = event else {
            panic!("expected a match list update");
        };
        assert!(sync.apply(update));

        let expected: serde_json::Value = serde_json::from_str(body).unwrap();
        let stored = serde_json::to_value(sync.matches().unwrap()).unwrap();
        assert_eq!(stored, expected);
    }
}
