use crate::state::app_settings::AppSettings;
use crate::state::app_state::AppState;
use crate::state::detail_sync::DetailPhase;
use crate::state::feed::MatchFeed;
use crate::state::messages::SyncEvent;
use log::{info, warn};
use match_api::MatchSummary;
use std::sync::Arc;
use tokio::sync::mpsc;

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum MenuItem {
    #[default]
    Matches,
    MatchDetail,
    Help,
}

pub struct App {
    pub settings: AppSettings,
    pub state: AppState,
    feed: Arc<dyn MatchFeed>,
}

impl App {
    pub fn new(
        settings: AppSettings,
        feed: Arc<dyn MatchFeed>,
        events: mpsc::UnboundedSender<SyncEvent>,
    ) -> Self {
        let state = AppState::new(settings.poll_interval, events);
        Self { settings, state, feed }
    }

    /// Start the match list sync. It runs until [`App::shutdown`].
    pub fn start(&mut self) {
        self.state.list.activate(self.feed.clone());
    }

    pub fn shutdown(&mut self) {
        self.state.detail.close();
        self.state.list.deactivate();
        info!("sync stopped");
    }

    // -----------------------------------------------------------------------
    // Sync results, applied only from main_ui_loop
    // -----------------------------------------------------------------------

    /// Returns true when the screen needs a redraw.
    pub fn on_sync_event(&mut self, event: SyncEvent) -> bool {
        match event {
            SyncEvent::Matches(update) => {
                let changed = self.state.list.apply(update);
                let len = self.state.list.matches().map_or(0, <[MatchSummary]>::len);
                self.state.list_view.clamp(len);
                changed
            }
            SyncEvent::Detail(update) => self.state.detail.apply(update),
        }
    }

    // -----------------------------------------------------------------------
    // Tab management
    // -----------------------------------------------------------------------

    pub fn update_tab(&mut self, next: MenuItem) {
        if self.state.active_tab == next {
            return;
        }
        self.state.previous_tab = self.state.active_tab;
        self.state.active_tab = next;
    }

    pub fn exit_help(&mut self) {
        if self.state.active_tab == MenuItem::Help {
            self.state.active_tab = self.state.previous_tab;
        }
    }

    pub fn toggle_show_logs(&mut self) {
        self.state.show_logs = !self.state.show_logs;
    }

    pub fn toggle_full_screen(&mut self) {
        self.settings.full_screen = !self.settings.full_screen;
    }

    // -----------------------------------------------------------------------
    // Match list navigation
    // -----------------------------------------------------------------------

    pub fn list_down(&mut self) {
        let len = self.state.list.matches().map_or(0, <[MatchSummary]>::len);
        self.state.list_view.move_down(len);
    }

    pub fn list_up(&mut self) {
        self.state.list_view.move_up();
    }

    pub fn selected_match(&self) -> Option<&MatchSummary> {
        self.state.list.matches()?.get(self.state.list_view.selected)
    }

    /// Open the selected match in the detail view. This is the only place a
    /// detail session starts.
    pub fn open_selected_match(&mut self) -> bool {
        let Some(match_id) = self.selected_match().map(|m| m.match_id.clone()) else {
            return false;
        };
        if match_id.trim().is_empty() {
            warn!("selected match has no id, cannot open it");
            return false;
        }
        if self.state.detail.open(&match_id, self.feed.clone()) {
            self.state.detail_view.scroll_offset = 0;
        }
        self.update_tab(MenuItem::MatchDetail);
        true
    }

    /// Leave the detail view. Its session is torn down.
    pub fn back_to_list(&mut self) {
        self.state.detail.close();
        self.state.detail_view.scroll_offset = 0;
        self.update_tab(MenuItem::Matches);
    }

    // -----------------------------------------------------------------------
    // Match detail navigation
    // -----------------------------------------------------------------------

    pub fn detail_scroll_down(&mut self) {
        self.state.detail_view.scroll_offset = self.state.detail_view.scroll_offset.saturating_add(1);
    }

    pub fn detail_scroll_up(&mut self) {
        self.state.detail_view.scroll_offset = self.state.detail_view.scroll_offset.saturating_sub(1);
    }

    // -----------------------------------------------------------------------
    // Animation tick, every 80ms from AnimationTick event
    // -----------------------------------------------------------------------

    pub fn advance_animation(&mut self) {
        self.state.animation.advance();
    }

    /// A spinner is on screen, so animation ticks should redraw.
    pub fn needs_animation(&self) -> bool {
        match self.state.active_tab {
            MenuItem::Matches => self.state.list.matches().is_none(),
            MenuItem::MatchDetail => self.state.detail.phase() == DetailPhase::Loading,
            MenuItem::Help => false,
        }
    }
}
