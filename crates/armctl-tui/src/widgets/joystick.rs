//! Joystick pad widget and pointer geometry
//!
//! Terminal cells are roughly twice as tall as they are wide, so horizontal
//! distances are halved before they are compared with the pad radius.

use ratatui::{buffer::Buffer, layout::Rect, text::Line, widgets::Widget};

use armctl_core::JoystickVector;

use crate::theme::styles;

/// Width of a cell relative to its height.
const CELL_ASPECT: f64 = 0.5;

/// Maps pointer cells inside the pad to joystick vectors and back.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PadGeometry {
    inner: Rect,
    center_col: f64,
    center_row: f64,
    /// Radius in row units
    radius: f64,
}

impl PadGeometry {
    /// Geometry for the pad drawn in `area` (border included).
    ///
    /// Returns `None` when the pad is too small to hold a knob.
    pub fn for_area(area: Rect) -> Option<Self> {
        let inner = styles::glass_block(false).inner(area);
        if inner.width < 3 || inner.height < 3 {
            return None;
        }
        let half_width = (inner.width - 1) as f64 / 2.0;
        let half_height = (inner.height - 1) as f64 / 2.0;
        Some(Self {
            inner,
            center_col: inner.x as f64 + half_width,
            center_row: inner.y as f64 + half_height,
            radius: (half_width * CELL_ASPECT).min(half_height),
        })
    }

    pub fn contains(&self, column: u16, row: u16) -> bool {
        column >= self.inner.x
            && column < self.inner.right()
            && row >= self.inner.y
            && row < self.inner.bottom()
    }

    /// Vector for a pointer at (`column`, `row`); capped at the radius.
    pub fn vector_at(&self, column: u16, row: u16) -> JoystickVector {
        let dx = (column as f64 - self.center_col) * CELL_ASPECT;
        let dy = row as f64 - self.center_row;
        JoystickVector::from_offset(dx, dy, self.radius)
    }

    /// Cell where the knob for `vector` is drawn.
    pub fn knob_cell(&self, vector: JoystickVector) -> (u16, u16) {
        let col = self.center_col + vector.x * self.radius / CELL_ASPECT;
        let row = self.center_row + vector.y * self.radius;
        let clamp = |v: f64, lo: u16, hi: u16| (v.round().max(lo as f64) as u16).min(hi);
        (
            clamp(col, self.inner.x, self.inner.right() - 1),
            clamp(row, self.inner.y, self.inner.bottom() - 1),
        )
    }

    fn center_cell(&self) -> (u16, u16) {
        self.knob_cell(JoystickVector::CENTER)
    }
}

/// Joystick pad: crosshair plus a knob at the current vector.
pub struct JoystickPad {
    vector: JoystickVector,
    enabled: bool,
}

impl JoystickPad {
    pub fn new(vector: JoystickVector, enabled: bool) -> Self {
        Self { vector, enabled }
    }
}

impl Widget for JoystickPad {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = styles::glass_block(!self.vector.is_centered())
            .title(Line::styled(" Joystick ", styles::text_secondary()));
        block.render(area, buf);

        let Some(geometry) = PadGeometry::for_area(area) else {
            return;
        };

        let guide = styles::text_muted();
        let (cx, cy) = geometry.center_cell();
        let inner = geometry.inner;
        for x in inner.x..inner.right() {
            buf[(x, cy)].set_symbol("·").set_style(guide);
        }
        for y in inner.y..inner.bottom() {
            buf[(cx, y)].set_symbol("·").set_style(guide);
        }
        buf[(cx, cy)].set_symbol("+").set_style(guide);

        let knob_style = if self.enabled {
            styles::focused_selected()
        } else {
            styles::text_muted()
        };
        let (kx, ky) = geometry.knob_cell(self.vector);
        buf[(kx, ky)].set_symbol("◉").set_style(knob_style);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TestTerminal;

    fn geometry() -> PadGeometry {
        // Inner area 19 x 11, centre (10, 6), radius 4.5 rows
        PadGeometry::for_area(Rect::new(0, 0, 21, 13)).unwrap()
    }

    #[test]
    fn test_centre_maps_to_zero_vector() {
        let g = geometry();
        assert!(g.vector_at(10, 6).is_centered());
    }

    #[test]
    fn test_vertical_offset_is_screen_down_positive() {
        let g = geometry();
        let down = g.vector_at(10, 11);
        assert!(down.x.abs() < 1e-9);
        assert!((down.y - 1.0).abs() < 1e-9);

        let up = g.vector_at(10, 1);
        assert!((up.y + 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_offset_is_capped_at_radius() {
        let g = geometry();
        // 9 columns right = 4.5 rows, exactly the radius
        let edge = g.vector_at(19, 6);
        assert!((edge.x - 1.0).abs() < 1e-9);

        let beyond = g.vector_at(40, 6);
        assert!((beyond.x - 1.0).abs() < 1e-9);
        assert!(beyond.y.abs() < 1e-9);
    }

    #[test]
    fn test_contains_excludes_border() {
        let g = geometry();
        assert!(g.contains(1, 1));
        assert!(g.contains(19, 11));
        assert!(!g.contains(0, 5));
        assert!(!g.contains(20, 5));
    }

    #[test]
    fn test_knob_cell_follows_vector() {
        let g = geometry();
        assert_eq!(g.knob_cell(JoystickVector::CENTER), (10, 6));
        assert_eq!(g.knob_cell(JoystickVector::new(1.0, 0.0)), (19, 6));
        assert_eq!(g.knob_cell(JoystickVector::new(0.0, -1.0)), (10, 2));
    }

    #[test]
    fn test_too_small_pad_has_no_geometry() {
        assert!(PadGeometry::for_area(Rect::new(0, 0, 4, 4)).is_none());
    }

    #[test]
    fn test_pad_renders_knob() {
        let mut term = TestTerminal::with_size(21, 13);
        term.render_widget(JoystickPad::new(JoystickVector::CENTER, true), term.area());

        assert!(term.buffer_contains("Joystick"));
        assert_eq!(term.cell_at(10, 6), Some("◉"));
    }

    #[test]
    fn test_pad_knob_moves_with_vector() {
        let mut term = TestTerminal::with_size(21, 13);
        term.render_widget(
            JoystickPad::new(JoystickVector::new(1.0, 0.0), true),
            term.area(),
        );

        assert_eq!(term.cell_at(19, 6), Some("◉"));
        assert_eq!(term.cell_at(10, 6), Some("+"));
    }
}
