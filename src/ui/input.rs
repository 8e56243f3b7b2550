//! Keyboard input handling for the TUI.
//!
//! Translates key events into account actions. Returns `true` when the
//! application should exit.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

use crate::app::{App, AppState};

pub async fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => {
            app.quit();
            return Ok(true);
        }
        KeyCode::Enter if !app.is_signed_in() && app.state != AppState::SigningIn => {
            app.start_sign_in();
        }
        KeyCode::Char('s') if app.is_signed_in() => {
            app.start_sign_out();
        }
        _ => {}
    }

    Ok(false)
}
