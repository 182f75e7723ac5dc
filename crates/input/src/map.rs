//! Key mapping from terminal events to board actions.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// What the player asked for, independent of the engine's state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UiAction {
    /// Move the cursor by one cell.
    MoveCursor { d_row: i16, d_col: i16 },
    /// Click the cell under the cursor.
    Select,
    /// Drop the current selection.
    Cancel,
    Restart,
    NextLevel,
    PrevLevel,
}

/// Map keyboard input to board actions.
pub fn handle_key_event(key: KeyEvent) -> Option<UiAction> {
    let cursor = |d_row, d_col| Some(UiAction::MoveCursor { d_row, d_col });
    match key.code {
        // Cursor
        KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('H') | KeyCode::Char('a') | KeyCode::Char('A') => {
            cursor(0, -1)
        }
        KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('L') | KeyCode::Char('d') | KeyCode::Char('D') => {
            cursor(0, 1)
        }
        KeyCode::Up | KeyCode::Char('k') | KeyCode::Char('K') | KeyCode::Char('w') | KeyCode::Char('W') => {
            cursor(-1, 0)
        }
        KeyCode::Down | KeyCode::Char('j') | KeyCode::Char('J') | KeyCode::Char('s') | KeyCode::Char('S') => {
            cursor(1, 0)
        }

        // Selection
        KeyCode::Char(' ') | KeyCode::Enter => Some(UiAction::Select),
        KeyCode::Esc | KeyCode::Backspace => Some(UiAction::Cancel),

        // Level flow
        KeyCode::Char('r') | KeyCode::Char('R') => Some(UiAction::Restart),
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Tab => Some(UiAction::NextLevel),
        KeyCode::Char('p') | KeyCode::Char('P') | KeyCode::BackTab => Some(UiAction::PrevLevel),

        _ => None,
    }
}

/// Check if key should quit the game.
pub fn should_quit(key: KeyEvent) -> bool {
    matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q'))
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}
