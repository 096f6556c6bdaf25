//! Key event handlers for different UI modes

use armctl_core::Direction;

use crate::input_key::InputKey;
use crate::message::Message;
use crate::state::{AppState, UiMode};

/// Convert key events to messages based on current UI mode
pub fn handle_key(state: &AppState, key: InputKey) -> Option<Message> {
    match state.ui_mode {
        UiMode::Normal => handle_key_normal(key),
        UiMode::EditingAddress => handle_key_editing_address(key),
    }
}

/// Handle key events in normal mode
fn handle_key_normal(key: InputKey) -> Option<Message> {
    if let Some(direction) = key.direction() {
        return Some(Message::DirectionPressed(direction));
    }

    match key {
        // Quit
        InputKey::Char('q') | InputKey::Esc | InputKey::CharCtrl('c') => Some(Message::Quit),

        // Arm
        InputKey::Char('p') => Some(Message::TogglePower),
        InputKey::Char('r') => Some(Message::Reset),
        InputKey::Char('o') => Some(Message::GripperOpen),
        InputKey::Char('c') => Some(Message::GripperClose),

        // Joystick nudges (vim-style cluster, no collision with the arrows)
        InputKey::Char('i') => Some(Message::JoystickNudge(Direction::Up)),
        InputKey::Char('k') => Some(Message::JoystickNudge(Direction::Down)),
        InputKey::Char('j') => Some(Message::JoystickNudge(Direction::Left)),
        InputKey::Char('l') => Some(Message::JoystickNudge(Direction::Right)),

        // Connection
        InputKey::Enter => Some(Message::Connect),
        InputKey::Char('d') => Some(Message::Disconnect),
        InputKey::Char('m') => Some(Message::ToggleMode),
        InputKey::Char('e') => Some(Message::StartEditAddress),

        _ => None,
    }
}

/// Handle key events while editing the device address
fn handle_key_editing_address(key: InputKey) -> Option<Message> {
    match key {
        InputKey::Enter => Some(Message::CommitAddress),
        InputKey::Esc => Some(Message::CancelEditAddress),
        InputKey::Backspace => Some(Message::AddressBackspace),
        // Force quit with Ctrl+C even while editing
        InputKey::CharCtrl('c') => Some(Message::Quit),
        InputKey::Char(c) => Some(Message::AddressInput(c)),
        _ => None,
    }
}
