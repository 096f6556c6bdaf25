//! Custom widgets for the armctl TUI

mod connection_panel;
mod dpad;
mod event_log;
mod header;
mod joystick;
mod servo_gauges;
mod status_bar;

pub use connection_panel::ConnectionPanel;
pub use dpad::DPad;
pub use event_log::EventLog;
pub use header::MainHeader;
pub use joystick::{JoystickPad, PadGeometry};
pub use servo_gauges::ServoGauges;
pub use status_bar::StatusBar;
