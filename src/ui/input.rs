//! Key routing.
//!
//! Two input contexts: the search box (when active, printable keys edit the
//! query) and list browsing (tab switching, cursor movement, refresh).

use crossterm::event::{KeyCode, KeyModifiers};
use tokio::sync::mpsc;

use crate::app::{App, AppEvent};

use super::loop_runner::Action;

/// Maximum allowed search query length (UI layer validation)
const MAX_SEARCH_LENGTH: usize = 256;

pub(super) fn handle_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    tx: &mpsc::Sender<AppEvent>,
) -> Action {
    if modifiers.contains(KeyModifiers::CONTROL) && code == KeyCode::Char('c') {
        return Action::Quit;
    }

    if app.search_active {
        handle_search_input(app, code, tx);
        return Action::Continue;
    }

    match code {
        KeyCode::Char('q') => return Action::Quit,
        KeyCode::Char('/') => {
            app.search_active = true;
        }
        KeyCode::Char('r') => {
            app.set_status("Refreshing...");
            app.refresh(tx);
        }
        KeyCode::Esc => {
            // Leaves company focus; a no-op while browsing
            app.clear_search(tx);
        }
        KeyCode::Tab | KeyCode::Right => {
            if !app.tabs.is_empty() {
                let next = (app.selected_tab + 1) % app.tabs.len();
                app.select_category(app.tabs[next], tx);
            }
        }
        KeyCode::BackTab | KeyCode::Left => {
            if !app.tabs.is_empty() {
                let prev = (app.selected_tab + app.tabs.len() - 1) % app.tabs.len();
                app.select_category(app.tabs[prev], tx);
            }
        }
        KeyCode::Down | KeyCode::Char('j') => {
            let len = app.items().len();
            if len > 0 && app.selected_item + 1 < len {
                app.selected_item += 1;
            }
        }
        KeyCode::Up | KeyCode::Char('k') => {
            app.selected_item = app.selected_item.saturating_sub(1);
        }
        _ => {}
    }

    Action::Continue
}

fn handle_search_input(app: &mut App, code: KeyCode, tx: &mpsc::Sender<AppEvent>) {
    match code {
        KeyCode::Esc => {
            app.clear_search(tx);
        }
        KeyCode::Enter => {
            let suggestions = app.suggest.suggestions();
            if let Some(name) = suggestions.get(app.selected_suggestion).cloned() {
                app.select_company(name, tx);
            }
        }
        KeyCode::Down => {
            let len = app.suggest.suggestions().len();
            if len > 0 && app.selected_suggestion + 1 < len {
                app.selected_suggestion += 1;
            }
        }
        KeyCode::Up => {
            app.selected_suggestion = app.selected_suggestion.saturating_sub(1);
        }
        KeyCode::Backspace => {
            let mut query = app.suggest.query().to_string();
            query.pop();
            app.suggest.on_input(&query);
            app.selected_suggestion = 0;
        }
        KeyCode::Char(c) => {
            let query = app.suggest.query();
            if query.chars().count() < MAX_SEARCH_LENGTH {
                let mut query = query.to_string();
                query.push(c);
                app.suggest.on_input(&query);
                app.selected_suggestion = 0;
            }
        }
        _ => {}
    }
}
