//! Terminal event polling and translation into engine messages

use std::time::{Duration, Instant};

use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use ratatui::layout::Rect;

use armctl_app::input_key::InputKey;
use armctl_app::Message;
use armctl_core::prelude::*;
use armctl_core::Direction;

use crate::widgets::PadGeometry;

/// Poll timeout; a timeout produces a `Tick`.
pub const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Without key release reporting, an arrow counts as released once no
/// press or auto-repeat has arrived for this long.
pub const RELEASE_FALLBACK: Duration = Duration::from_millis(400);

/// Convert crossterm KeyEvent to InputKey
pub fn key_event_to_input(key: KeyEvent) -> Option<InputKey> {
    match key.code {
        KeyCode::Char(c) if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(InputKey::CharCtrl(c))
        }
        KeyCode::Char(c) => Some(InputKey::Char(c)),
        KeyCode::Enter => Some(InputKey::Enter),
        KeyCode::Esc => Some(InputKey::Esc),
        KeyCode::Backspace => Some(InputKey::Backspace),
        KeyCode::Up => Some(InputKey::Up),
        KeyCode::Down => Some(InputKey::Down),
        KeyCode::Left => Some(InputKey::Left),
        KeyCode::Right => Some(InputKey::Right),
        _ => None,
    }
}

/// Poll for a terminal event. `None` on timeout.
pub fn poll() -> Result<Option<Event>> {
    if event::poll(POLL_INTERVAL)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

#[derive(Debug, Clone, Copy)]
struct HeldArrow {
    direction: Direction,
    last_seen: Instant,
}

/// Stateful translation of terminal events into messages.
///
/// Tracks the held arrow (for synthesized releases) and an active joystick
/// drag.
#[derive(Debug)]
pub struct EventTranslator {
    reports_release: bool,
    held: Option<HeldArrow>,
    dragging: bool,
}

impl EventTranslator {
    /// `reports_release`: the terminal delivers `KeyEventKind::Release`.
    pub fn new(reports_release: bool) -> Self {
        Self {
            reports_release,
            held: None,
            dragging: false,
        }
    }

    /// Translate one event. `pad` is the joystick pad area of the last frame.
    pub fn translate(&mut self, event: Event, pad: Rect, now: Instant) -> Vec<Message> {
        match event {
            Event::Key(key) => self.translate_key(key, now),
            Event::Mouse(mouse) => self.translate_mouse(mouse, pad).into_iter().collect(),
            _ => Vec::new(),
        }
    }

    fn translate_key(&mut self, key: KeyEvent, now: Instant) -> Vec<Message> {
        let Some(input) = key_event_to_input(key) else {
            return Vec::new();
        };

        if key.kind == KeyEventKind::Release {
            return match input.direction() {
                Some(direction) => {
                    self.held = None;
                    vec![Message::DirectionReleased(direction)]
                }
                None => Vec::new(),
            };
        }

        let mut messages = Vec::new();
        if let Some(direction) = input.direction() {
            if !self.reports_release {
                if let Some(previous) = self.held {
                    if previous.direction != direction {
                        messages.push(Message::DirectionReleased(previous.direction));
                    }
                }
                self.held = Some(HeldArrow {
                    direction,
                    last_seen: now,
                });
            }
        }
        messages.push(Message::Key(input));
        messages
    }

    fn translate_mouse(&mut self, mouse: MouseEvent, pad: Rect) -> Option<Message> {
        let geometry = PadGeometry::for_area(pad)?;
        let (column, row) = (mouse.column, mouse.row);

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) if geometry.contains(column, row) => {
                self.dragging = true;
                Some(Message::JoystickMoved(geometry.vector_at(column, row)))
            }
            MouseEventKind::Drag(MouseButton::Left) if self.dragging => {
                Some(Message::JoystickMoved(geometry.vector_at(column, row)))
            }
            MouseEventKind::Up(MouseButton::Left) if self.dragging => {
                self.dragging = false;
                trace!("Joystick drag ended at ({}, {})", column, row);
                Some(Message::JoystickReleased)
            }
            _ => None,
        }
    }

    /// Synthesized release for the held arrow once [`RELEASE_FALLBACK`] has
    /// passed without a repeat. Always `None` when releases are reported.
    pub fn release_due(&mut self, now: Instant) -> Option<Message> {
        let held = self.held?;
        if now.saturating_duration_since(held.last_seen) < RELEASE_FALLBACK {
            return None;
        }
        self.held = None;
        Some(Message::DirectionReleased(held.direction))
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn press(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn release(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new_with_kind_and_state(
            code,
            KeyModifiers::NONE,
            KeyEventKind::Release,
            KeyEventState::NONE,
        ))
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    fn left_down(column: u16, row: u16) -> Event {
        mouse(MouseEventKind::Down(MouseButton::Left), column, row)
    }

    fn left_drag(column: u16, row: u16) -> Event {
        mouse(MouseEventKind::Drag(MouseButton::Left), column, row)
    }

    fn left_up(column: u16, row: u16) -> Event {
        mouse(MouseEventKind::Up(MouseButton::Left), column, row)
    }

    /// Pad with inner area 19 x 11 and centre (10, 6).
    const PAD: Rect = Rect::new(0, 0, 21, 13);

    #[test]
    fn test_char_conversion() {
        let key = KeyEvent::new(KeyCode::Char('a'), KeyModifiers::NONE);
        assert_eq!(key_event_to_input(key), Some(InputKey::Char('a')));
    }

    #[test]
    fn test_char_with_ctrl_conversion() {
        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(key_event_to_input(key), Some(InputKey::CharCtrl('c')));
    }

    #[test]
    fn test_arrow_and_editing_keys() {
        let convert = |code| key_event_to_input(KeyEvent::new(code, KeyModifiers::NONE));
        assert_eq!(convert(KeyCode::Up), Some(InputKey::Up));
        assert_eq!(convert(KeyCode::Left), Some(InputKey::Left));
        assert_eq!(convert(KeyCode::Enter), Some(InputKey::Enter));
        assert_eq!(convert(KeyCode::Backspace), Some(InputKey::Backspace));
        assert_eq!(convert(KeyCode::Esc), Some(InputKey::Esc));
    }

    #[test]
    fn test_unsupported_keys_ignored() {
        let key = KeyEvent::new(KeyCode::F(5), KeyModifiers::NONE);
        assert_eq!(key_event_to_input(key), None);
        let mut translator = EventTranslator::new(true);
        assert!(translator
            .translate(Event::Key(key), PAD, Instant::now())
            .is_empty());
    }

    #[test]
    fn test_reported_release_becomes_direction_released() {
        let mut translator = EventTranslator::new(true);
        let now = Instant::now();

        let pressed = translator.translate(press(KeyCode::Left), PAD, now);
        assert!(matches!(pressed.as_slice(), [Message::Key(InputKey::Left)]));

        let released = translator.translate(release(KeyCode::Left), PAD, now);
        assert!(matches!(
            released.as_slice(),
            [Message::DirectionReleased(Direction::Left)]
        ));
        assert!(translator.release_due(now + Duration::from_secs(5)).is_none());
    }

    #[test]
    fn test_release_of_other_keys_ignored() {
        let mut translator = EventTranslator::new(true);
        let released = translator.translate(release(KeyCode::Char('p')), PAD, Instant::now());
        assert!(released.is_empty());
    }

    #[test]
    fn test_fallback_release_after_quiet_period() {
        let mut translator = EventTranslator::new(false);
        let start = Instant::now();

        translator.translate(press(KeyCode::Up), PAD, start);
        assert!(translator.release_due(start + Duration::from_millis(100)).is_none());

        // Auto-repeat keeps the arrow held
        translator.translate(press(KeyCode::Up), PAD, start + Duration::from_millis(300));
        assert!(translator
            .release_due(start + Duration::from_millis(600))
            .is_none());

        let due = translator.release_due(start + Duration::from_millis(800));
        assert!(matches!(due, Some(Message::DirectionReleased(Direction::Up))));
        assert!(translator.release_due(start + Duration::from_secs(5)).is_none());
    }

    #[test]
    fn test_fallback_switching_arrows_releases_previous() {
        let mut translator = EventTranslator::new(false);
        let now = Instant::now();

        translator.translate(press(KeyCode::Up), PAD, now);
        let messages = translator.translate(press(KeyCode::Right), PAD, now);

        assert!(matches!(
            messages.as_slice(),
            [
                Message::DirectionReleased(Direction::Up),
                Message::Key(InputKey::Right)
            ]
        ));
    }

    #[test]
    fn test_mouse_drag_inside_pad() {
        let mut translator = EventTranslator::new(true);
        let now = Instant::now();

        let down = translator.translate(left_down(10, 6), PAD, now);
        match down.as_slice() {
            [Message::JoystickMoved(v)] => assert!(v.is_centered()),
            other => panic!("expected JoystickMoved, got {:?}", other),
        }
        assert!(translator.is_dragging());

        let drag = translator.translate(left_drag(10, 1), PAD, now);
        match drag.as_slice() {
            [Message::JoystickMoved(v)] => assert!((v.y + 1.0).abs() < 1e-9),
            other => panic!("expected JoystickMoved, got {:?}", other),
        }

        let up = translator.translate(left_up(10, 1), PAD, now);
        assert!(matches!(up.as_slice(), [Message::JoystickReleased]));
        assert!(!translator.is_dragging());
    }

    #[test]
    fn test_drag_outside_pad_is_capped() {
        let mut translator = EventTranslator::new(true);
        let now = Instant::now();

        translator.translate(left_down(12, 6), PAD, now);
        let drag = translator.translate(left_drag(70, 6), PAD, now);

        match drag.as_slice() {
            [Message::JoystickMoved(v)] => assert!((v.x - 1.0).abs() < 1e-9),
            other => panic!("expected JoystickMoved, got {:?}", other),
        }
    }

    #[test]
    fn test_click_outside_pad_ignored() {
        let mut translator = EventTranslator::new(true);
        let now = Instant::now();

        let down = translator.translate(left_down(40, 6), PAD, now);
        assert!(down.is_empty());
        let up = translator.translate(left_up(40, 6), PAD, now);
        assert!(up.is_empty());
    }
}
