use crate::state::sync::FetchError;
use log::{debug, trace};
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};

/// Sequence number of a tick within one polling run, starting at 1.
pub type TickSeq = u64;

const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Handle to a running poller. Stopping is idempotent and also happens on drop.
#[derive(Debug)]
pub struct PollHandle {
    label: String,
    alive: Arc<AtomicBool>,
    timer: Option<JoinHandle<()>>,
}

impl PollHandle {
    pub fn is_active(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    /// Cancel the timer. Requests already in flight are left to finish, but
    /// their results are dropped on arrival.
    pub fn stop(&mut self) {
        if !self.alive.swap(false, Ordering::AcqRel) {
            return;
        }
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
        debug!("{} poller stopped", self.label);
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Fetch now, then every `period`, until stopped.
///
/// Ticks follow the start time rather than fetch completion, so a slow
/// fetch does not delay the next one and two requests can be in flight at
/// once. Each tick's outcome reaches exactly one of `on_result` /
/// `on_error`, tagged with the tick's sequence number.
pub struct PollingEngine;

impl PollingEngine {
    pub fn start<T, E, F, Fut, R, X>(
        label: impl Into<String>,
        fetch: F,
        period: Duration,
        on_result: R,
        on_error: X,
    ) -> PollHandle
    where
        T: Send + 'static,
        E: Display + Send + 'static,
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        R: Fn(TickSeq, T) + Send + Sync + 'static,
        X: Fn(TickSeq, FetchError) + Send + Sync + 'static,
    {
        let label = label.into();
        let period = period.max(MIN_PERIOD);
        let tick = Tick {
            label: label.clone(),
            alive: Arc::new(AtomicBool::new(true)),
            on_result: Arc::new(on_result),
            on_error: Arc::new(on_error),
        };
        let alive = tick.alive.clone();

        // Tick 1 is issued before returning.
        trace!("{label} tick 1");
        tick.complete(1, fetch());

        let timer = tokio::spawn(async move {
            let mut ticks = interval_at(Instant::now() + period, period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let mut seq: TickSeq = 1;

            loop {
                ticks.tick().await;
                if !tick.alive.load(Ordering::Acquire) {
                    break;
                }
                seq += 1;
                trace!("{} tick {seq}", tick.label);
                tick.complete(seq, fetch());
            }
        });

        debug!("{label} poller started, every {period:?}");
        PollHandle { label, alive, timer: Some(timer) }
    }
}

/// Routes each tick's outcome to the callbacks while the poller is alive.
struct Tick<R, X> {
    label: String,
    alive: Arc<AtomicBool>,
    on_result: Arc<R>,
    on_error: Arc<X>,
}

impl<R, X> Tick<R, X> {
    fn complete<T, E, Fut>(&self, seq: TickSeq, request: Fut)
    where
        T: Send + 'static,
        E: Display + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        R: Fn(TickSeq, T) + Send + Sync + 'static,
        X: Fn(TickSeq, FetchError) + Send + Sync + 'static,
    {
        let label = self.label.clone();
        let alive = self.alive.clone();
        let on_result = self.on_result.clone();
        let on_error = self.on_error.clone();
        tokio::spawn(async move {
            let outcome = request.await;
            if !alive.load(Ordering::Acquire) {
                debug!("{label} tick {seq} completed after stop, dropping it");
                return;
            }
            match outcome {
                Ok(value) => on_result(seq, value),
                Err(e) => on_error(seq, FetchError::new(e)),
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::AtomicUsize;
    use tokio::time::sleep;

    const PERIOD: Duration = Duration::from_millis(3000);

    /// Records the offset (ms from start) of every fetch invocation.
    #[derive(Clone)]
    struct CallLog {
        start: Instant,
        calls: Arc<Mutex<Vec<u128>>>,
    }

    impl CallLog {
        fn new() -> Self {
            Self { start: Instant::now(), calls: Arc::new(Mutex::new(Vec::new())) }
        }

        fn record(&self) {
            let offset = self.start.elapsed().as_millis();
            self.calls.lock().unwrap().push(offset);
        }

        fn offsets(&self) -> Vec<u128> {
            self.calls.lock().unwrap().clone()
        }
    }

    fn start_logged(log: &CallLog, latency: Duration) -> (PollHandle, Arc<Mutex<Vec<TickSeq>>>) {
        let results = Arc::new(Mutex::new(Vec::new()));
        let sink = results.clone();
        let log = log.clone();
        let handle = PollingEngine::start(
            "test",
            move || {
                log.record();
                async move {
                    sleep(latency).await;
                    Ok::<_, String>(())
                }
            },
            PERIOD,
            move |seq, ()| sink.lock().unwrap().push(seq),
            |_, _| {},
        );
        (handle, results)
    }

    #[tokio::test(start_paused = true)]
    async fn first_fetch_happens_without_delay() {
        let log = CallLog::new();
        let (_handle, _) = start_logged(&log, Duration::ZERO);

        sleep(Duration::from_millis(1)).await;
        assert_eq!(log.offsets(), vec![0]);
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_follow_a_fixed_cadence() {
        let log = CallLog::new();
        let (_handle, results) = start_logged(&log, Duration::from_millis(10));

        sleep(Duration::from_millis(6500)).await;
        assert_eq!(log.offsets(), vec![0, 3000, 6000]);
        assert_eq!(*results.lock().unwrap(), vec![1, 2, 3]);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_fetches_overlap_instead_of_delaying_the_schedule() {
        let log = CallLog::new();
        let (_handle, results) = start_logged(&log, Duration::from_millis(4500));

        sleep(Duration::from_millis(6100)).await;
        assert_eq!(log.offsets(), vec![0, 3000, 6000]);
        // tick 1 finished at 4500; tick 2 is still in flight
        assert_eq!(*results.lock().unwrap(), vec![1]);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_prevents_future_ticks() {
        let log = CallLog::new();
        let (mut handle, _) = start_logged(&log, Duration::ZERO);

        sleep(Duration::from_millis(3500)).await;
        handle.stop();
        assert!(!handle.is_active());

        sleep(Duration::from_millis(10_000)).await;
        assert_eq!(log.offsets(), vec![0, 3000]);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_is_idempotent() {
        let log = CallLog::new();
        let (mut handle, _) = start_logged(&log, Duration::ZERO);
        handle.stop();
        handle.stop();
        drop(handle);
        sleep(Duration::from_millis(7000)).await;
        assert_eq!(log.offsets(), vec![0]);
    }

    #[tokio::test(start_paused = true)]
    async fn stopping_right_after_start_still_fetches_once() {
        let log = CallLog::new();
        let (mut handle, results) = start_logged(&log, Duration::from_millis(10));
        handle.stop();
        assert_eq!(log.offsets(), vec![0], "tick 1 is issued inside start");

        sleep(Duration::from_millis(10_000)).await;
        assert_eq!(log.offsets(), vec![0]);
        assert!(results.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn in_flight_result_is_dropped_after_stop() {
        let log = CallLog::new();
        let (mut handle, results) = start_logged(&log, Duration::from_millis(1000));

        sleep(Duration::from_millis(500)).await;
        handle.stop();
        sleep(Duration::from_millis(2000)).await;

        assert_eq!(log.offsets(), vec![0]);
        assert!(results.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn errors_are_normalized_and_polling_continues() {
        let calls = Arc::new(AtomicUsize::new(0));
        let errors = Arc::new(Mutex::new(Vec::new()));
        let results = Arc::new(Mutex::new(Vec::new()));

        let counter = calls.clone();
        let error_sink = errors.clone();
        let result_sink = results.clone();
        let _handle = PollingEngine::start(
            "flaky",
            move || {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n == 0 { Err("HTTP 500".to_string()) } else { Ok(n) }
                }
            },
            PERIOD,
            move |seq, n| result_sink.lock().unwrap().push((seq, n)),
            move |seq, e: FetchError| error_sink.lock().unwrap().push((seq, e.to_string())),
        );

        sleep(Duration::from_millis(3100)).await;
        assert_eq!(*errors.lock().unwrap(), vec![(1, "fetch failed: HTTP 500".to_string())]);
        assert_eq!(*results.lock().unwrap(), vec![(2, 1)]);
    }
}
