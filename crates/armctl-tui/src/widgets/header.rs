//! Header bar widget
//!
//! Title on the left, power and connection indicators on the right.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::Widget,
};

use armctl_core::{ConnectionMode, ConnectionStatus};

use crate::theme::styles;

pub struct MainHeader {
    power: bool,
    status: ConnectionStatus,
    mode: ConnectionMode,
}

impl MainHeader {
    pub fn new(power: bool, status: ConnectionStatus, mode: ConnectionMode) -> Self {
        Self {
            power,
            status,
            mode,
        }
    }
}

impl Widget for MainHeader {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = styles::glass_block(false);
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.height == 0 || inner.width == 0 {
            return;
        }

        let title = Line::from(vec![
            Span::raw(" "),
            Span::styled("armctl", styles::accent_bold()),
            Span::styled(" / ", styles::text_muted()),
            Span::styled("robotic arm", styles::text_secondary()),
        ]);

        let (power_icon, power_label, power_style) = styles::power_indicator(self.power);
        let (link_icon, link_label, link_style) = styles::connection_indicator(self.status);
        let indicators = Line::from(vec![
            Span::styled(format!("{} {}", power_icon, power_label), power_style),
            Span::styled("  │  ", styles::text_muted()),
            Span::styled(format!("{} {}", link_icon, link_label), link_style),
            Span::styled(format!(" ({}) ", self.mode), styles::text_muted()),
        ]);

        let indicators_width = indicators.width() as u16;
        buf.set_line(inner.x, inner.y, &title, inner.width);
        if indicators_width <= inner.width {
            let x = inner.right() - indicators_width;
            buf.set_line(x, inner.y, &indicators, indicators_width);
        }
    }
}
