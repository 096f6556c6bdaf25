//! Domain events emitted by the Engine for external consumers
//!
//! Events are broadcast after each message processing cycle via
//! `Engine::subscribe()`. The headless runner turns them into NDJSON.

use armctl_core::{
    Angle, ConnectionMode, ConnectionStatus, DeviceError, LogEntry, ServoId, ServoPositions,
};

use crate::state::PositionSource;

/// Domain events emitted by the Engine for external consumers.
///
/// Events are derived from state differences before and after each message,
/// so subscribers see a consistent view of state changes.
#[derive(Debug, Clone)]
pub enum EngineEvent {
    // ─────────────────────────────────────────────────────────
    // Connection
    // ─────────────────────────────────────────────────────────
    /// The connection state machine moved
    ConnectionChanged {
        old: ConnectionStatus,
        new: ConnectionStatus,
        mode: ConnectionMode,
        base_url: Option<String>,
        /// Last error, when the transition ended in `disconnected`
        error: Option<String>,
    },

    /// A reconciliation poll failed (the connection may still be up)
    PollFailed {
        consecutive: u32,
        error: DeviceError,
    },

    // ─────────────────────────────────────────────────────────
    // Arm
    // ─────────────────────────────────────────────────────────
    /// Power toggled
    PowerChanged { power: bool },

    /// Displayed servo positions changed
    PositionsChanged {
        positions: ServoPositions,
        source: PositionSource,
    },

    /// A servo command was answered with an error or timed out
    CommandFailed {
        servo: ServoId,
        angle: Angle,
        error: DeviceError,
    },

    /// An input or power-on was rejected
    InputBlocked { reason: String },

    // ─────────────────────────────────────────────────────────
    // Logging
    // ─────────────────────────────────────────────────────────
    /// A new entry in the user-visible event log
    LogEntry { entry: LogEntry },

    // ─────────────────────────────────────────────────────────
    // Engine Lifecycle
    // ─────────────────────────────────────────────────────────
    /// Engine is shutting down
    Shutdown,
}

impl EngineEvent {
    /// Returns a short string label for this event type (for logging/debugging).
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::ConnectionChanged { .. } => "connection_changed",
            Self::PollFailed { .. } => "poll_failed",
            Self::PowerChanged { .. } => "power_changed",
            Self::PositionsChanged { .. } => "positions_changed",
            Self::CommandFailed { .. } => "command_failed",
            Self::InputBlocked { .. } => "input_blocked",
            Self::LogEntry { .. } => "log_entry",
            Self::Shutdown => "shutdown",
        }
    }
}
