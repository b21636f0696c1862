use crate::state::poller::TickSeq;
use chrono::{DateTime, Local};
use std::fmt;

/// Identifies one activation of a sync component. Bumped on every
/// (re)activation and teardown, so updates from a dead session are ignored.
pub type SessionId = u64;

/// Opaque "fetch failed" error handed to sync components. Network, status
/// and decode failures all land here; the cause is kept for the log pane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchError {
    cause: String,
}

impl FetchError {
    pub fn new(cause: impl fmt::Display) -> Self {
        Self { cause: cause.to_string() }
    }

    pub fn cause(&self) -> &str {
        &self.cause
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fetch failed: {}", self.cause)
    }
}

impl std::error::Error for FetchError {}

/// Outcome of one tick, tagged with where it came from.
#[derive(Debug)]
pub struct SyncUpdate<T> {
    pub session: SessionId,
    pub seq: TickSeq,
    pub outcome: Result<T, FetchError>,
}

/// What [`SyncState::apply`] did with an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Snapshot,
    Error,
    /// Update belongs to a session that has been torn down.
    Detached,
    /// A newer tick already landed; this completion arrived out of order.
    Stale,
}

impl Applied {
    pub fn changed(self) -> bool {
        matches!(self, Applied::Snapshot | Applied::Error)
    }
}

#[derive(Debug)]
pub struct SyncState<T> {
    data: Option<T>,
    error: Option<FetchError>,
    session: SessionId,
    last_applied: TickSeq,
    updated_at: Option<DateTime<Local>>,
}

impl<T> Default for SyncState<T> {
    fn default() -> Self {
        Self {
            data: None,
            error: None,
            session: 0,
            last_applied: 0,
            updated_at: None,
        }
    }
}

impl<T> SyncState<T> {
    /// Drop everything and open a fresh session. Returns the new session id.
    pub fn reset(&mut self) -> SessionId {
        self.session += 1;
        self.data = None;
        self.error = None;
        self.last_applied = 0;
        self.updated_at = None;
        self.session
    }

    /// Apply one tick's outcome. A snapshot replaces the previous one
    /// wholesale and clears the error; an error is recorded next to the
    /// last snapshot, which is left in place.
    pub fn apply(&mut self, update: SyncUpdate<T>) -> Applied {
        if update.session != self.session {
            return Applied::Detached;
        }
        if update.seq <= self.last_applied {
            return Applied::Stale;
        }
        self.last_applied = update.seq;
        match update.outcome {
            Ok(data) => {
                self.data = Some(data);
                self.error = None;
                self.updated_at = Some(Local::now());
                Applied::Snapshot
            }
            Err(e) => {
                self.error = Some(e);
                Applied::Error
            }
        }
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn error(&self) -> Option<&FetchError> {
        self.error.as_ref()
    }

    pub fn updated_at(&self) -> Option<DateTime<Local>> {
        self.updated_at
    }
}
