use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::App;
use crate::tui::AppEvent;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub async fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => {
            app.tick_animation();
            app.poll_request().await;
        }
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    match key.code {
        KeyCode::Esc => app.should_quit = true,

        // Submission goes through the session guard: a blank draft or an
        // in-flight request makes Enter a no-op.
        KeyCode::Enter => app.submit(),

        KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.show_sources = !app.show_sources;
        }

        // Thread scrolling; the input stays live while a request is pending
        KeyCode::Up => app.scroll_chat_up(),
        KeyCode::Down => app.scroll_chat_down(),
        KeyCode::PageUp => app.scroll_chat_half_page_up(),
        KeyCode::PageDown => app.scroll_chat_half_page_down(),

        // Draft editing
        KeyCode::Backspace => {
            if app.input_cursor > 0 {
                app.input_cursor -= 1;
                let byte_pos = char_to_byte_index(&app.session.draft, app.input_cursor);
                app.session.draft.remove(byte_pos);
            }
        }
        KeyCode::Delete => {
            if app.input_cursor < app.session.draft.chars().count() {
                let byte_pos = char_to_byte_index(&app.session.draft, app.input_cursor);
                app.session.draft.remove(byte_pos);
            }
        }
        KeyCode::Left => {
            app.input_cursor = app.input_cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            let len = app.session.draft.chars().count();
            app.input_cursor = (app.input_cursor + 1).min(len);
        }
        KeyCode::Home => app.input_cursor = 0,
        KeyCode::End => app.input_cursor = app.session.draft.chars().count(),
        KeyCode::Char(c) => {
            let byte_pos = char_to_byte_index(&app.session.draft, app.input_cursor);
            app.session.draft.insert(byte_pos, c);
            app.input_cursor += 1;
        }

        _ => {}
    }
}
