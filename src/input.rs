//! Keyboard input handling.
//!
//! Maps terminal key events to [`App`] actions.  Adding a new keybinding is
//! a single match arm in [`handle_key_event`].
//!
//! ## For contributors
//!
//! To add a new keybinding:
//!
//! 1. Add a method on [`App`] for the action (if one doesn't exist).
//! 2. Add a `KeyCode` match arm in [`handle_key_event`] that calls it.
//! 3. Update the help text in `ui::draw_status_bar`.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};

use crate::app::App;
use crate::source::Cursor;

/// Process a single key event, updating app state accordingly.
///
/// Returns the cursor to hand to the loader when the key asked for more
/// posts.  Only reacts to key-press events (ignoring release / repeat) so
/// that each physical keypress triggers exactly one action.
pub fn handle_key_event(app: &mut App, key: KeyEvent) -> Option<Cursor> {
    if key.kind != KeyEventKind::Press {
        return None;
    }

    match key.code {
        KeyCode::Char('q') => app.quit = true,
        KeyCode::Esc => {
            if !app.dismiss_notice() {
                app.quit = true;
            }
        }
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Up | KeyCode::Char('k') => app.select_previous(),
        KeyCode::Home | KeyCode::Char('g') => app.select_first(),
        KeyCode::End | KeyCode::Char('G') => app.select_last(),
        KeyCode::Char('m') => return app.request_load_more(),
        KeyCode::Enter => return app.activate_selected(),
        _ => {}
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::app_with;
    use crossterm::event::{KeyEventState, KeyModifiers};

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn q_quits() {
        let mut app = app_with(&["a"], None);
        handle_key_event(&mut app, press(KeyCode::Char('q')));
        assert!(app.quit);
    }

    #[test]
    fn esc_dismisses_notice_before_quitting() {
        let mut app = app_with(&["a"], None);
        handle_key_event(&mut app, press(KeyCode::Char('m')));
        assert!(app.notice.is_some());

        handle_key_event(&mut app, press(KeyCode::Esc));
        assert!(app.notice.is_none());
        assert!(!app.quit);

        handle_key_event(&mut app, press(KeyCode::Esc));
        assert!(app.quit);
    }

    #[test]
    fn m_returns_cursor_once() {
        let mut app = app_with(&["a"], Some("/p2"));
        assert_eq!(
            handle_key_event(&mut app, press(KeyCode::Char('m'))),
            Some(Cursor::new("/p2"))
        );
        assert_eq!(handle_key_event(&mut app, press(KeyCode::Char('m'))), None);
    }

    #[test]
    fn enter_on_load_more_row_returns_cursor() {
        let mut app = app_with(&["a"], Some("/p2"));
        handle_key_event(&mut app, press(KeyCode::End));
        assert_eq!(
            handle_key_event(&mut app, press(KeyCode::Enter)),
            Some(Cursor::new("/p2"))
        );
    }

    #[test]
    fn vim_keys_navigate() {
        let mut app = app_with(&["a", "b", "c"], None);
        handle_key_event(&mut app, press(KeyCode::Char('j')));
        handle_key_event(&mut app, press(KeyCode::Char('j')));
        assert_eq!(app.list_state.selected(), Some(1));
        handle_key_event(&mut app, press(KeyCode::Char('k')));
        assert_eq!(app.list_state.selected(), Some(0));
        handle_key_event(&mut app, press(KeyCode::Char('G')));
        assert_eq!(app.list_state.selected(), Some(2));
    }

    #[test]
    fn key_release_is_ignored() {
        let mut app = app_with(&["a"], None);
        let release = KeyEvent {
            code: KeyCode::Char('q'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        handle_key_event(&mut app, release);
        assert!(!app.quit);
    }
}
