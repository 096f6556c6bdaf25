//! Status bar widget
//!
//! One row: a blocked notice while one is showing, otherwise key hints for
//! the current UI mode.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::Widget,
};

use armctl_app::{AppState, UiMode};

use crate::theme::styles;

const NORMAL_HINTS: &[(&str, &str)] = &[
    ("p", "power"),
    ("←↑↓→", "move"),
    ("ijkl", "joystick"),
    ("o/c", "grip"),
    ("r", "reset"),
    ("⏎", "connect"),
    ("d", "disconnect"),
    ("m", "mode"),
    ("e", "address"),
    ("q", "quit"),
];

const EDITING_HINTS: &[(&str, &str)] = &[("⏎", "confirm"), ("Esc", "cancel")];

pub struct StatusBar<'a> {
    state: &'a AppState,
}

impl<'a> StatusBar<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    fn hints(hints: &[(&'static str, &'static str)]) -> Line<'static> {
        let mut spans = vec![Span::raw(" ")];
        for (i, (key, action)) in hints.iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled(" · ", styles::text_muted()));
            }
            spans.push(Span::styled(*key, styles::keybinding()));
            spans.push(Span::raw(" "));
            spans.push(Span::styled(*action, styles::text_secondary()));
        }
        Line::from(spans)
    }
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 {
            return;
        }

        let line = match (&self.state.blocked, self.state.ui_mode) {
            (Some(notice), _) => Line::from(vec![
                Span::styled(" ⚠ ", styles::status_red()),
                Span::styled(notice.reason.as_str(), styles::status_red()),
            ]),
            (None, UiMode::EditingAddress) => Self::hints(EDITING_HINTS),
            (None, UiMode::Normal) => Self::hints(NORMAL_HINTS),
        };

        buf.set_line(area.x, area.y, &line, area.width);
    }
}
