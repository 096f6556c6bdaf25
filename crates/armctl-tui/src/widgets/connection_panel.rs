//! Connection panel: mode, address (or the address editor), base URL and
//! the last connection error.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
};

use armctl_app::{AppState, UiMode};
use armctl_core::ConnectionMode;

use crate::theme::styles;

pub struct ConnectionPanel<'a> {
    state: &'a AppState,
}

impl<'a> ConnectionPanel<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    fn field(name: &'static str, value: Span<'a>) -> Line<'a> {
        Line::from(vec![Span::styled(format!("{:<9}", name), styles::text_muted()), value])
    }

    fn address_line(&self) -> Line<'a> {
        let connection = &self.state.connection;
        if self.state.ui_mode == UiMode::EditingAddress {
            return Line::from(vec![
                Span::styled(format!("{:<9}", "Address"), styles::text_muted()),
                Span::styled(self.state.address_input.as_str(), styles::accent()),
                Span::styled("▏", styles::accent_bold()),
            ]);
        }
        let value = match connection.mode {
            ConnectionMode::Wifi => connection.address.as_str(),
            ConnectionMode::Localhost => connection.localhost_url.as_str(),
        };
        Self::field("Address", Span::styled(value, styles::text_primary()))
    }
}

impl Widget for ConnectionPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let connection = &self.state.connection;
        let editing = self.state.ui_mode == UiMode::EditingAddress;

        let block = styles::glass_block(editing)
            .title(Line::styled(" Connection ", styles::text_secondary()));

        let (icon, label, style) = styles::connection_indicator(connection.status);
        let mut lines = vec![
            Self::field("Status", Span::styled(format!("{} {}", icon, label), style)),
            Self::field("Mode", Span::styled(connection.mode.as_str(), styles::text_primary())),
            self.address_line(),
        ];

        let url = connection
            .base_url
            .as_ref()
            .map(|u| u.to_string())
            .unwrap_or_else(|| "-".to_string());
        lines.push(Self::field("URL", Span::styled(url, styles::text_secondary())));

        if let Some(error) = &connection.last_error {
            lines.push(Self::field(
                "Error",
                Span::styled(error.as_str(), styles::status_red()),
            ));
        }

        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: true })
            .render(area, buf);
    }
}
