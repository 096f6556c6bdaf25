//! D-pad widget: four arrows around a centre dot, the held one highlighted.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Widget,
};

use armctl_core::Direction;

use crate::theme::styles;

pub struct DPad {
    active: Option<Direction>,
    enabled: bool,
}

impl DPad {
    pub fn new(active: Option<Direction>, enabled: bool) -> Self {
        Self { active, enabled }
    }

    fn arrow_style(&self, direction: Direction) -> Style {
        if self.active == Some(direction) {
            styles::focused_selected()
        } else if self.enabled {
            styles::text_primary()
        } else {
            styles::text_muted()
        }
    }

    fn arrow(&self, direction: Direction) -> Span<'static> {
        let symbol = match direction {
            Direction::Up => " ▲ ",
            Direction::Down => " ▼ ",
            Direction::Left => " ◀ ",
            Direction::Right => " ▶ ",
        };
        Span::styled(symbol, self.arrow_style(direction))
    }
}

impl Widget for DPad {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = styles::glass_block(self.active.is_some())
            .title(Line::styled(" D-pad ", styles::text_secondary()));
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.height < 3 || inner.width < 9 {
            return;
        }

        let rows = [
            Line::from(vec![Span::raw("   "), self.arrow(Direction::Up)]),
            Line::from(vec![
                self.arrow(Direction::Left),
                Span::styled(" ● ", styles::text_muted()),
                self.arrow(Direction::Right),
            ]),
            Line::from(vec![Span::raw("   "), self.arrow(Direction::Down)]),
        ];

        let x = inner.x + (inner.width - 9) / 2;
        let top = inner.y + (inner.height - 3) / 2;
        for (i, row) in rows.iter().enumerate() {
            buf.set_line(x, top + i as u16, row, 9);
        }
    }
}
