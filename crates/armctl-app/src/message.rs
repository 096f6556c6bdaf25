//! Message types for the application (TEA pattern)

use armctl_core::{Angle, ConnectionMode, DeviceError, Direction, JoystickVector, ServoId};
use armctl_device::DeviceStatus;

use crate::input_key::InputKey;

/// All possible messages/actions in the application
#[derive(Debug, Clone)]
pub enum Message {
    /// Keyboard event from terminal
    Key(InputKey),

    /// Tick event for periodic updates (expires transient notices)
    Tick,

    /// Quit (q, Esc, Ctrl+C, signal handler, stdin)
    Quit,

    // ─────────────────────────────────────────────────────────
    // Arm Control
    // ─────────────────────────────────────────────────────────
    /// Power toggle
    TogglePower,

    /// D-pad press; moves base or shoulder by one step
    DirectionPressed(Direction),

    /// D-pad release; clears the highlight only
    DirectionReleased(Direction),

    /// Joystick position update (normalized vector)
    JoystickMoved(JoystickVector),

    /// Joystick returned to centre; does not move servos
    JoystickReleased,

    /// One full-deflection joystick step followed by a release (keyboard)
    JoystickNudge(Direction),

    /// Move all servos to neutral
    Reset,

    /// Gripper to 180°
    GripperOpen,

    /// Gripper to 0°
    GripperClose,

    // ─────────────────────────────────────────────────────────
    // Connection
    // ─────────────────────────────────────────────────────────
    /// Probe the currently selected target
    Connect,

    /// Select a mode (and optionally an address), then probe
    ConnectTo {
        mode: ConnectionMode,
        address: Option<String>,
    },

    /// User-initiated disconnect
    Disconnect,

    /// Switch wifi/localhost; takes effect on the next connect
    ToggleMode,

    /// Replace the wifi address; takes effect on the next connect
    SetAddress(String),

    // ─────────────────────────────────────────────────────────
    // Address Editing (TUI)
    // ─────────────────────────────────────────────────────────
    StartEditAddress,
    AddressInput(char),
    AddressBackspace,
    CommitAddress,
    CancelEditAddress,

    // ─────────────────────────────────────────────────────────
    // Device I/O Completions
    // ─────────────────────────────────────────────────────────
    /// Connectivity probe settled (cancelled probes never report)
    ProbeCompleted {
        attempt: u64,
        result: Result<DeviceStatus, DeviceError>,
    },

    /// One reconciliation poll settled
    StatusPolled {
        session: u64,
        result: Result<DeviceStatus, DeviceError>,
    },

    /// A servo command settled (superseded commands never report)
    ServoCommandCompleted {
        servo: ServoId,
        token: u64,
        angle: Angle,
        result: Result<(), DeviceError>,
    },

    /// Follow-up status read after a failed command
    ReconcileCompleted {
        attempt: u64,
        result: Result<DeviceStatus, DeviceError>,
    },
}
