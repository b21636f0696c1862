use crate::app::MenuItem;
use crate::state::detail_sync::DetailSync;
use crate::state::list_sync::ListSync;
use crate::state::messages::SyncEvent;
use std::time::Duration;
use tokio::sync::mpsc;

const SPINNER_CHARS: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

// ---------------------------------------------------------------------------
// Spinner animation state
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct AnimationState {
    /// Current frame index into the spinner, wraps at its length.
    pub frame: usize,
}

impl AnimationState {
    pub fn advance(&mut self) {
        self.frame = (self.frame + 1) % SPINNER_CHARS.len();
    }

    pub fn spinner_char(&self) -> char {
        SPINNER_CHARS[self.frame % SPINNER_CHARS.len()]
    }
}

// ---------------------------------------------------------------------------
// View state
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct ListViewState {
    /// Cursor into the current snapshot. Clamped whenever the list changes.
    pub selected: usize,
}

impl ListViewState {
    pub fn move_down(&mut self, len: usize) {
        if self.selected + 1 < len {
            self.selected += 1;
        }
    }

    pub fn move_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn clamp(&mut self, len: usize) {
        self.selected = self.selected.min(len.saturating_sub(1));
    }
}

#[derive(Debug, Default)]
pub struct DetailViewState {
    pub scroll_offset: u16,
}

// ---------------------------------------------------------------------------
// Root app state
// ---------------------------------------------------------------------------

pub struct AppState {
    pub active_tab: MenuItem,
    pub previous_tab: MenuItem,
    pub show_logs: bool,
    pub list: ListSync,
    pub detail: DetailSync,
    pub list_view: ListViewState,
    pub detail_view: DetailViewState,
    pub animation: AnimationState,
}

impl AppState {
    pub fn new(poll_interval: Duration, events: mpsc::UnboundedSender<SyncEvent>) -> Self {
        Self {
            active_tab: MenuItem::default(),
            previous_tab: MenuItem::default(),
            show_logs: false,
            list: ListSync::new(poll_interval, events.clone()),
            detail: DetailSync::new(poll_interval, events),
            list_view: ListViewState::default(),
            detail_view: DetailViewState::default(),
            animation: AnimationState::default(),
        }
    }
}
