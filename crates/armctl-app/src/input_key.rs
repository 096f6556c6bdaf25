//! Abstract input key event, independent of terminal library.
//!
//! Keeps armctl-app free of crossterm types so the headless runner and tests
//! can drive the same key handling as the TUI.

use armctl_core::Direction;

/// Abstract key press, converted from crossterm at the TUI boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKey {
    /// Regular character key (a-z, 0-9, symbols)
    Char(char),
    /// Character with Ctrl modifier (Ctrl+c, ...)
    CharCtrl(char),

    Up,
    Down,
    Left,
    Right,

    Enter,
    Esc,
    Backspace,
}

impl InputKey {
    /// Arrow keys map to D-pad directions.
    pub fn direction(self) -> Option<Direction> {
        match self {
            InputKey::Up => Some(Direction::Up),
            InputKey::Down => Some(Direction::Down),
            InputKey::Left => Some(Direction::Left),
            InputKey::Right => Some(Direction::Right),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_key_equality() {
        assert_eq!(InputKey::Char('a'), InputKey::Char('a'));
        assert_ne!(InputKey::Char('a'), InputKey::Char('b'));
        assert_ne!(InputKey::CharCtrl('c'), InputKey::Char('c'));
    }

    #[test]
    fn test_arrow_directions() {
        assert_eq!(InputKey::Left.direction(), Some(Direction::Left));
        assert_eq!(InputKey::Up.direction(), Some(Direction::Up));
        assert_eq!(InputKey::Enter.direction(), None);
        assert_eq!(InputKey::Char('k').direction(), None);
    }
}
