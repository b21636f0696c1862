use crate::app::{App, MenuItem};
use crossterm::event::KeyCode::Char;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Continue,
    Quit,
}

pub async fn handle_key_bindings(key_event: KeyEvent, app: &Arc<Mutex<App>>) -> KeyAction {
    let mut guard = app.lock().await;
    apply_key(&mut guard, key_event)
}

fn apply_key(app: &mut App, key_event: KeyEvent) -> KeyAction {
    match (app.state.active_tab, key_event.code, key_event.modifiers) {
        // Quit
        (_, Char('q'), _) | (_, Char('c'), KeyModifiers::CONTROL) => return KeyAction::Quit,

        // Tab switching
        (_, Char('1'), _) => app.back_to_list(),
        (_, Char('?'), _) => app.update_tab(MenuItem::Help),
        (MenuItem::Help, KeyCode::Esc, _) => app.exit_help(),

        // Match list navigation
        (MenuItem::Matches, Char('j') | KeyCode::Down, _) => app.list_down(),
        (MenuItem::Matches, Char('k') | KeyCode::Up, _) => app.list_up(),
        (MenuItem::Matches, KeyCode::Enter, _) => {
            app.open_selected_match();
        }

        // Match detail navigation
        (MenuItem::MatchDetail, Char('j') | KeyCode::Down, _) => app.detail_scroll_down(),
        (MenuItem::MatchDetail, Char('k') | KeyCode::Up, _) => app.detail_scroll_up(),
        (MenuItem::MatchDetail, KeyCode::Esc, _) => app.back_to_list(),

        // Global
        (_, Char('f'), _) => app.toggle_full_screen(),
        (_, Char('"'), _) => app.toggle_show_logs(),

        _ => {}
    }
    KeyAction::Continue
}
