use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// A key press translated into what the user meant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Action {
    Quit,
    ToggleOpen,
    Dismiss,
    ResetKey,
    Submit,
    Newline,
    Insert(char),
    Backspace,
    Left,
    Right,
    ScrollUp(u16),
    ScrollDown(u16),
    Ignore,
}

pub(super) fn map_key(key: KeyEvent) -> Action {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let newline_mod = key
        .modifiers
        .intersects(KeyModifiers::SHIFT | KeyModifiers::ALT);

    match key.code {
        KeyCode::Char('c') if ctrl => Action::Quit,
        KeyCode::Char('o') if ctrl => Action::ToggleOpen,
        KeyCode::Char('r') if ctrl => Action::ResetKey,
        // Some terminals report Shift+Enter as Ctrl+J.
        KeyCode::Char('j') if ctrl => Action::Newline,
        KeyCode::Char(_) if ctrl => Action::Ignore,
        KeyCode::Char(c) => Action::Insert(c),
        KeyCode::Enter if newline_mod => Action::Newline,
        KeyCode::Enter => Action::Submit,
        KeyCode::Esc => Action::Dismiss,
        KeyCode::Backspace => Action::Backspace,
        KeyCode::Left => Action::Left,
        KeyCode::Right => Action::Right,
        KeyCode::Up => Action::ScrollUp(3),
        KeyCode::Down => Action::ScrollDown(3),
        KeyCode::PageUp => Action::ScrollUp(10),
        KeyCode::PageDown => Action::ScrollDown(10),
        _ => Action::Ignore,
    }
}
