//! Main render/view function (View in TEA pattern)


use ratatui::style::Style;
use ratatui::widgets::Block;
use ratatui::Frame;

use armctl_app::AppState;

use super::{layout, widgets};
use crate::theme::palette;

/// Render the complete UI (View function in TEA)
///
/// Pure with respect to `state`. Returns the layout used so the runner can
/// hit-test mouse events against the joystick pad.
pub fn view(frame: &mut Frame, state: &AppState) -> layout::ScreenAreas {
    let area = frame.area();

    let bg_block = Block::default().style(Style::default().bg(palette::DEEPEST_BG));
    frame.render_widget(bg_block, area);

    let areas = layout::create(area, state.settings.ui.show_event_log);
    let arm = &state.arm;
    let connection = &state.connection;
    let controls_enabled = state.can_send_commands();

    frame.render_widget(
        widgets::MainHeader::new(arm.power, connection.status, connection.mode),
        areas.header,
    );
    frame.render_widget(
        widgets::ServoGauges::new(arm, state.positions_source),
        areas.gauges,
    );
    frame.render_widget(
        widgets::DPad::new(arm.active_direction, controls_enabled),
        areas.dpad,
    );
    frame.render_widget(
        widgets::JoystickPad::new(arm.joystick, controls_enabled),
        areas.joystick,
    );
    frame.render_widget(widgets::ConnectionPanel::new(state), areas.connection);
    if let Some(log_area) = areas.log {
        frame.render_widget(widgets::EventLog::new(&state.logs), log_area);
    }
    frame.render_widget(widgets::StatusBar::new(state), areas.status);

    areas
}
