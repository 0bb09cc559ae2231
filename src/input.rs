//! Key bindings: arrows, WASD and vim-style hjkl.

use crate::direction::Direction;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Action from a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Turn(Direction),
    /// Start, pause/resume, or restart after the session ended.
    Primary,
    Reset,
    CycleMode,
    SpeedUp,
    SpeedDown,
    GridUp,
    GridDown,
    ToggleWrap,
    ToggleTrail,
    ToggleGrid,
    ToggleSound,
    CycleTheme,
    Surprise,
    Quit,
    None,
}

/// Map key event to action. Ctrl+C quits; other modifier combinations are ignored.
pub fn key_to_action(key: KeyEvent) -> Action {
    let KeyEvent { code, modifiers, .. } = key;
    if modifiers == KeyModifiers::CONTROL {
        return match code {
            KeyCode::Char('c') => Action::Quit,
            _ => Action::None,
        };
    }
    if !(modifiers.is_empty() || modifiers == KeyModifiers::SHIFT) {
        return Action::None;
    }
    match code {
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') | KeyCode::Char('k') => {
            Action::Turn(Direction::Up)
        }
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') | KeyCode::Char('j') => {
            Action::Turn(Direction::Down)
        }
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') | KeyCode::Char('h') => {
            Action::Turn(Direction::Left)
        }
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') | KeyCode::Char('l') => {
            Action::Turn(Direction::Right)
        }
        KeyCode::Enter | KeyCode::Char(' ') => Action::Primary,
        KeyCode::Char('r') | KeyCode::Char('R') => Action::Reset,
        KeyCode::Char('m') => Action::CycleMode,
        KeyCode::Char('+') | KeyCode::Char('=') => Action::SpeedUp,
        KeyCode::Char('-') | KeyCode::Char('_') => Action::SpeedDown,
        KeyCode::Char(']') => Action::GridUp,
        KeyCode::Char('[') => Action::GridDown,
        KeyCode::Char('o') => Action::ToggleWrap,
        KeyCode::Char('t') => Action::ToggleTrail,
        KeyCode::Char('g') => Action::ToggleGrid,
        KeyCode::Char('b') => Action::ToggleSound,
        KeyCode::Char('c') => Action::CycleTheme,
        KeyCode::Char('x') => Action::Surprise,
        _ => Action::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn all_turn_layouts_agree() {
        for code in [KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('k')] {
            assert_eq!(key_to_action(key(code)), Action::Turn(Direction::Up));
        }
        for code in [KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('h')] {
            assert_eq!(key_to_action(key(code)), Action::Turn(Direction::Left));
        }
    }

    #[test]
    fn modifiers() {
        assert_eq!(
            key_to_action(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Action::Quit
        );
        assert_eq!(
            key_to_action(KeyEvent::new(KeyCode::Char('w'), KeyModifiers::ALT)),
            Action::None
        );
        assert_eq!(
            key_to_action(KeyEvent::new(KeyCode::Char('+'), KeyModifiers::SHIFT)),
            Action::SpeedUp
        );
    }

    #[test]
    fn settings_keys() {
        assert_eq!(key_to_action(key(KeyCode::Char(' '))), Action::Primary);
        assert_eq!(key_to_action(key(KeyCode::Char(']'))), Action::GridUp);
        assert_eq!(key_to_action(key(KeyCode::Char('x'))), Action::Surprise);
        assert_eq!(key_to_action(key(KeyCode::Char('z'))), Action::None);
    }
}
