//! Keyboard and input event handling.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::app::App;

/// Process a key event and update the application state.
pub fn handle_key_event(app: &mut App, key: KeyEvent) -> anyhow::Result<()> {
    let page = app.viewport_height.saturating_sub(1).max(1);

    match (key.modifiers, key.code) {
        // Ctrl+C always quits
        (KeyModifiers::CONTROL, KeyCode::Char('c')) => app.should_quit = true,
        (_, KeyCode::Char('q') | KeyCode::Esc) => app.should_quit = true,

        // ── Scrolling ─────────────────────────────
        (_, KeyCode::Char('j') | KeyCode::Down) => app.scroll_down(1),
        (_, KeyCode::Char('k') | KeyCode::Up) => app.scroll_up(1),
        (_, KeyCode::PageDown | KeyCode::Char(' ')) => app.scroll_down(page),
        (_, KeyCode::PageUp) => app.scroll_up(page),
        (_, KeyCode::Home | KeyCode::Char('g')) => app.scroll_to_top(),
        (_, KeyCode::End | KeyCode::Char('G')) => app.scroll_to_bottom(),

        // ── Display toggles ───────────────────────
        (_, KeyCode::Char('i')) => app.toggle_images(),
        (_, KeyCode::Char('b')) => app.toggle_bare_mode(),
        (_, KeyCode::Char('c')) => app.cycle_color_depth(),
        (_, KeyCode::Char('s')) => app.save_settings(),
        _ => {}
    }

    Ok(())
}
