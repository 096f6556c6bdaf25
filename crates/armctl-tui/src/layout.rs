//! Screen layout definitions for the TUI
//!
//! ```text
//! ┌ header ──────────────────────────────────────┐
//! ├ gauges ──────────────┬ connection ───────────┤
//! ├ dpad ──────┬ joystick┤ event log             │
//! └────────────┴─────────┴───────────────────────┘
//!   status bar
//! ```

use ratatui::layout::{Constraint, Layout, Rect};

/// Header: top border + title row + bottom border
pub const HEADER_HEIGHT: u16 = 3;

/// Four gauge rows plus borders
pub const GAUGES_HEIGHT: u16 = 6;

/// Connection panel: status, mode, address, URL, error plus borders
pub const CONNECTION_HEIGHT: u16 = 7;

/// Screen areas for the main layout
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScreenAreas {
    pub header: Rect,
    pub gauges: Rect,
    pub dpad: Rect,
    /// Joystick pad; mouse events are hit-tested against this area
    pub joystick: Rect,
    pub connection: Rect,
    /// `None` when the event log is hidden in settings
    pub log: Option<Rect>,
    pub status: Rect,
}

/// Create the main screen layout.
pub fn create(area: Rect, show_log: bool) -> ScreenAreas {
    let rows = Layout::vertical([
        Constraint::Length(HEADER_HEIGHT),
        Constraint::Min(8),
        Constraint::Length(1),
    ])
    .split(area);

    let columns =
        Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).split(rows[1]);

    let left =
        Layout::vertical([Constraint::Length(GAUGES_HEIGHT), Constraint::Min(3)]).split(columns[0]);
    let controls =
        Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).split(left[1]);

    let (connection, log) = if show_log {
        let right = Layout::vertical([Constraint::Length(CONNECTION_HEIGHT), Constraint::Min(3)])
            .split(columns[1]);
        (right[0], Some(right[1]))
    } else {
        (columns[1], None)
    };

    ScreenAreas {
        header: rows[0],
        gauges: left[0],
        dpad: controls[0],
        joystick: controls[1],
        connection,
        log,
        status: rows[2],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_layout_standard() {
        let layout = create(Rect::new(0, 0, 80, 24), true);

        assert_eq!(layout.header.height, 3);
        assert_eq!(layout.status.y, 23);
        assert_eq!(layout.status.height, 1);

        assert_eq!(layout.gauges, Rect::new(0, 3, 40, 6));
        assert_eq!(layout.dpad, Rect::new(0, 9, 20, 14));
        assert_eq!(layout.joystick, Rect::new(20, 9, 20, 14));

        assert_eq!(layout.connection, Rect::new(40, 3, 40, 7));
        assert_eq!(layout.log, Some(Rect::new(40, 10, 40, 13)));
    }

    #[test]
    fn test_create_layout_without_log() {
        let layout = create(Rect::new(0, 0, 80, 24), false);

        assert!(layout.log.is_none());
        // Connection panel takes the whole right column
        assert_eq!(layout.connection.height, 20);
    }

    #[test]
    fn test_areas_do_not_overlap_controls() {
        let layout = create(Rect::new(0, 0, 120, 40), true);

        assert!(layout.dpad.intersection(layout.joystick).is_empty());
        assert!(layout.joystick.intersection(layout.connection).is_empty());
        assert!(layout.gauges.intersection(layout.dpad).is_empty());
    }

    #[test]
    fn test_create_layout_small_terminal() {
        let layout = create(Rect::new(0, 0, 40, 12), true);

        // Header and status bar keep their fixed heights
        assert_eq!(layout.header.height, 3);
        assert_eq!(layout.status.height, 1);
        assert_eq!(layout.status.y, 11);
    }
}
