//! Keyboard handling for the terminal client.
//!
//! Owns the key bindings so the engine only ever sees [`KeyPress`] values.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use termsweeper_core::{Input, KeyPress};

/// High-level outcome of a key event while a round is played.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum KeyAction {
    Quit,
    Press(KeyPress),
    None,
}

/// Choice made on the end-of-round screen.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EndKey {
    Again,
    Exit,
    Other,
}

fn is_interrupt(key: &KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C'))
}

fn is_release(key: &KeyEvent) -> bool {
    key.kind == KeyEventKind::Release
}

pub fn map_key(key: KeyEvent) -> KeyAction {
    if is_release(&key) {
        return KeyAction::None;
    }
    if is_interrupt(&key) {
        return KeyAction::Quit;
    }

    let press = match key.code {
        KeyCode::Esc => return KeyAction::Quit,
        KeyCode::Up => KeyPress::from(Input::MoveUp),
        KeyCode::Down => KeyPress::from(Input::MoveDown),
        KeyCode::Left => KeyPress::from(Input::MoveLeft),
        KeyCode::Right => KeyPress::from(Input::MoveRight),
        KeyCode::Enter => KeyPress::from(Input::Reveal),
        KeyCode::Char(ch) => KeyPress::new(Some(ch), char_binding(ch)),
        // keys without a character still break a half-typed cheat code
        _ => KeyPress::new(None, None),
    };
    KeyAction::Press(press)
}

fn char_binding(ch: char) -> Option<Input> {
    match ch.to_ascii_lowercase() {
        'w' => Some(Input::MoveUp),
        'a' => Some(Input::MoveLeft),
        's' => Some(Input::MoveDown),
        'd' => Some(Input::MoveRight),
        'e' | 'f' => Some(Input::ToggleFlag),
        ' ' => Some(Input::Reveal),
        _ => None,
    }
}

pub fn map_end_key(key: KeyEvent) -> EndKey {
    if is_release(&key) {
        return EndKey::Other;
    }
    if is_interrupt(&key) {
        return EndKey::Exit;
    }

    match key.code {
        KeyCode::Char('x') | KeyCode::Char('X') | KeyCode::Esc => EndKey::Exit,
        KeyCode::Enter | KeyCode::Char(' ') => EndKey::Again,
        _ => EndKey::Other,
    }
}
