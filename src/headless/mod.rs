//! Headless mode - JSON event output for scripting and E2E testing
//!
//! Runs the engine without a terminal UI. Commands are read line by line
//! from stdin; engine events are written to stdout as NDJSON
//! (newline-delimited JSON), one event per line, each with an `event` field
//! naming its type.
//!
//! # Example Output
//!
//! ```json
//! {"event":"connection_changed","old":"disconnected","new":"connecting","mode":"wifi","base_url":"http://192.168.4.1/","error":null,"timestamp":1704700001000}
//! {"event":"power_changed","power":true,"timestamp":1704700002000}
//! {"event":"positions_changed","positions":{"base":90,"shoulder":90,"elbow":90,"gripper":90},"source":"power_on","timestamp":1704700002001}
//! ```

pub mod command;
pub mod runner;

use std::io::{self, Write};

use chrono::Utc;
use serde::Serialize;
use tracing::error;

use armctl_app::{AppState, EngineEvent, PositionSource};
use armctl_core::{ConnectionMode, ConnectionStatus, LogLevel, LogSource, ServoPositions};

pub use runner::run_headless;

/// Events emitted in headless mode
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum HeadlessEvent {
    ConnectionChanged {
        old: ConnectionStatus,
        new: ConnectionStatus,
        mode: ConnectionMode,
        base_url: Option<String>,
        error: Option<String>,
        timestamp: i64,
    },

    PollFailed {
        consecutive: u32,
        error: String,
        timestamp: i64,
    },

    PowerChanged { power: bool, timestamp: i64 },

    PositionsChanged {
        positions: ServoPositions,
        source: PositionSource,
        timestamp: i64,
    },

    CommandFailed {
        servo: String,
        angle: u8,
        status: Option<u16>,
        error: String,
        timestamp: i64,
    },

    InputBlocked { reason: String, timestamp: i64 },

    /// Event log entry
    Log {
        level: LogLevel,
        source: LogSource,
        message: String,
        timestamp: i64,
    },

    /// Answer to the `status` command
    Status {
        power: bool,
        connection: ConnectionStatus,
        mode: ConnectionMode,
        base_url: Option<String>,
        positions: ServoPositions,
        pending_commands: usize,
        last_error: Option<String>,
        timestamp: i64,
    },

    /// Unparseable command or a dropped-events warning
    Error { message: String, timestamp: i64 },

    Shutdown { timestamp: i64 },
}

impl HeadlessEvent {
    /// Emit this event to stdout as JSON
    pub fn emit(&self) {
        let json = match serde_json::to_string(self) {
            Ok(json) => json,
            Err(e) => {
                error!("Failed to serialize headless event: {}", e);
                return;
            }
        };

        let mut stdout = io::stdout().lock();
        if let Err(e) = writeln!(stdout, "{}", json) {
            error!("Failed to write headless event to stdout: {}", e);
            return;
        }

        // Flush so line-buffered consumers see each event immediately
        if let Err(e) = stdout.flush() {
            error!("Failed to flush headless stdout: {}", e);
        }
    }

    /// Current timestamp in milliseconds
    fn now() -> i64 {
        Utc::now().timestamp_millis()
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
            timestamp: Self::now(),
        }
    }

    /// Snapshot of the controller state.
    pub fn status(state: &AppState) -> Self {
        let connection = &state.connection;
        Self::Status {
            power: state.arm.power,
            connection: connection.status,
            mode: connection.mode,
            base_url: connection.base_url.as_ref().map(|u| u.to_string()),
            positions: state.arm.positions,
            pending_commands: state.arm.pending_count(),
            last_error: connection.last_error.clone(),
            timestamp: Self::now(),
        }
    }
}

impl From<&EngineEvent> for HeadlessEvent {
    fn from(event: &EngineEvent) -> Self {
        let timestamp = Self::now();
        match event {
            EngineEvent::ConnectionChanged {
                old,
                new,
                mode,
                base_url,
                error,
            } => Self::ConnectionChanged {
                old: *old,
                new: *new,
                mode: *mode,
                base_url: base_url.clone(),
                error: error.clone(),
                timestamp,
            },
            EngineEvent::PollFailed { consecutive, error } => Self::PollFailed {
                consecutive: *consecutive,
                error: error.to_string(),
                timestamp,
            },
            EngineEvent::PowerChanged { power } => Self::PowerChanged {
                power: *power,
                timestamp,
            },
            EngineEvent::PositionsChanged { positions, source } => Self::PositionsChanged {
                positions: *positions,
                source: *source,
                timestamp,
            },
            EngineEvent::CommandFailed {
                servo,
                angle,
                error,
            } => Self::CommandFailed {
                servo: servo.name().to_string(),
                angle: angle.degrees(),
                status: error.status(),
                error: error.to_string(),
                timestamp,
            },
            EngineEvent::InputBlocked { reason } => Self::InputBlocked {
                reason: reason.clone(),
                timestamp,
            },
            EngineEvent::LogEntry { entry } => Self::Log {
                level: entry.level,
                source: entry.source,
                message: entry.message.clone(),
                timestamp,
            },
            EngineEvent::Shutdown => Self::Shutdown { timestamp },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use armctl_core::{Angle, DeviceError, LogEntry, ServoId};

    fn to_json(event: &HeadlessEvent) -> serde_json::Value {
        let json = serde_json::to_string(event).expect("serialization failed");
        serde_json::from_str(&json).expect("invalid JSON")
    }

    #[test]
    fn test_connection_changed_serialization() {
        let event = HeadlessEvent::from(&EngineEvent::ConnectionChanged {
            old: ConnectionStatus::Connecting,
            new: ConnectionStatus::Disconnected,
            mode: ConnectionMode::Wifi,
            base_url: Some("http://192.168.4.1/".into()),
            error: Some("Connection failed: refused".into()),
        });
        let value = to_json(&event);

        assert_eq!(value["event"], "connection_changed");
        assert_eq!(value["old"], "connecting");
        assert_eq!(value["new"], "disconnected");
        assert_eq!(value["mode"], "wifi");
        assert_eq!(value["error"], "Connection failed: refused");
        assert!(value["timestamp"].is_number());
    }

    #[test]
    fn test_positions_changed_serialization() {
        let event = HeadlessEvent::from(&EngineEvent::PositionsChanged {
            positions: ServoPositions::neutral(),
            source: PositionSource::PowerOn,
        });
        let value = to_json(&event);

        assert_eq!(value["event"], "positions_changed");
        assert_eq!(value["positions"]["base"], 90);
        assert_eq!(value["positions"]["gripper"], 90);
        assert_eq!(value["source"], "power_on");
    }

    #[test]
    fn test_command_failed_serialization() {
        let event = HeadlessEvent::from(&EngineEvent::CommandFailed {
            servo: ServoId::Gripper,
            angle: Angle::MAX,
            error: DeviceError::rejected(400, "servo out of range"),
        });
        let value = to_json(&event);

        assert_eq!(value["event"], "command_failed");
        assert_eq!(value["servo"], "gripper");
        assert_eq!(value["angle"], 180);
        assert_eq!(value["status"], 400);
        assert_eq!(value["error"], "command rejected (400): servo out of range");
    }

    #[test]
    fn test_log_serialization() {
        let entry = LogEntry::warn(LogSource::Connection, "status poll failed");
        let value = to_json(&HeadlessEvent::from(&EngineEvent::LogEntry { entry }));

        assert_eq!(value["event"], "log");
        assert_eq!(value["level"], "warning");
        assert_eq!(value["source"], "connection");
        assert_eq!(value["message"], "status poll failed");
    }

    #[test]
    fn test_status_snapshot() {
        let state = AppState::new();
        let value = to_json(&HeadlessEvent::status(&state));

        assert_eq!(value["event"], "status");
        assert_eq!(value["power"], false);
        assert_eq!(value["connection"], "disconnected");
        assert_eq!(value["pending_commands"], 0);
        assert!(value["base_url"].is_null());
    }

    #[test]
    fn test_shutdown_and_error_serialization() {
        let value = to_json(&HeadlessEvent::from(&EngineEvent::Shutdown));
        assert_eq!(value["event"], "shutdown");

        let value = to_json(&HeadlessEvent::error("unknown command: fly"));
        assert_eq!(value["event"], "error");
        assert_eq!(value["message"], "unknown command: fly");
    }
}
