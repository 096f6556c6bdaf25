//! Core domain type definitions

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::angle::Angle;

// ─────────────────────────────────────────────────────────────────────────────
// Servos
// ─────────────────────────────────────────────────────────────────────────────

/// Logical servo names with their fixed device channel (1-4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServoId {
    Base,
    Shoulder,
    Elbow,
    Gripper,
}

impl ServoId {
    /// All servos in channel order.
    pub const ALL: [ServoId; 4] = [
        ServoId::Base,
        ServoId::Shoulder,
        ServoId::Elbow,
        ServoId::Gripper,
    ];

    /// Device channel number used on the wire.
    pub fn channel(self) -> u8 {
        match self {
            ServoId::Base => 1,
            ServoId::Shoulder => 2,
            ServoId::Elbow => 3,
            ServoId::Gripper => 4,
        }
    }

    pub fn from_channel(channel: u8) -> Option<ServoId> {
        match channel {
            1 => Some(ServoId::Base),
            2 => Some(ServoId::Shoulder),
            3 => Some(ServoId::Elbow),
            4 => Some(ServoId::Gripper),
            _ => None,
        }
    }

    fn index(self) -> usize {
        self.channel() as usize - 1
    }

    pub fn name(self) -> &'static str {
        match self {
            ServoId::Base => "base",
            ServoId::Shoulder => "shoulder",
            ServoId::Elbow => "elbow",
            ServoId::Gripper => "gripper",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ServoId::Base => "Base",
            ServoId::Shoulder => "Shoulder",
            ServoId::Elbow => "Elbow",
            ServoId::Gripper => "Gripper",
        }
    }
}

impl std::fmt::Display for ServoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-servo lookup table, always fully populated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PerServo<T>([T; 4]);

impl<T> PerServo<T> {
    pub fn from_fn(mut f: impl FnMut(ServoId) -> T) -> Self {
        Self(ServoId::ALL.map(&mut f))
    }

    pub fn get(&self, servo: ServoId) -> &T {
        &self.0[servo.index()]
    }

    pub fn get_mut(&mut self, servo: ServoId) -> &mut T {
        &mut self.0[servo.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (ServoId, &T)> {
        ServoId::ALL.into_iter().zip(self.0.iter())
    }
}

/// Angle of every servo. Created at neutral, never partial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServoPositions {
    pub base: Angle,
    pub shoulder: Angle,
    pub elbow: Angle,
    pub gripper: Angle,
}

impl ServoPositions {
    pub const fn neutral() -> Self {
        Self {
            base: Angle::NEUTRAL,
            shoulder: Angle::NEUTRAL,
            elbow: Angle::NEUTRAL,
            gripper: Angle::NEUTRAL,
        }
    }

    pub fn get(&self, servo: ServoId) -> Angle {
        match servo {
            ServoId::Base => self.base,
            ServoId::Shoulder => self.shoulder,
            ServoId::Elbow => self.elbow,
            ServoId::Gripper => self.gripper,
        }
    }

    pub fn set(&mut self, servo: ServoId, angle: Angle) {
        match servo {
            ServoId::Base => self.base = angle,
            ServoId::Shoulder => self.shoulder = angle,
            ServoId::Elbow => self.elbow = angle,
            ServoId::Gripper => self.gripper = angle,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (ServoId, Angle)> + '_ {
        ServoId::ALL.into_iter().map(move |s| (s, self.get(s)))
    }
}

impl Default for ServoPositions {
    fn default() -> Self {
        Self::neutral()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Input
// ─────────────────────────────────────────────────────────────────────────────

/// D-pad direction. Left/right drive the base, up/down the shoulder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn parse(s: &str) -> Option<Direction> {
        match s.to_ascii_lowercase().as_str() {
            "up" => Some(Direction::Up),
            "down" => Some(Direction::Down),
            "left" => Some(Direction::Left),
            "right" => Some(Direction::Right),
            _ => None,
        }
    }
}

/// Joystick deflection, each axis normalized to `[-1, 1]`.
///
/// Screen convention: positive `y` points down.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct JoystickVector {
    pub x: f64,
    pub y: f64,
}

impl JoystickVector {
    pub const CENTER: JoystickVector = JoystickVector { x: 0.0, y: 0.0 };

    /// Clamp both axes into `[-1, 1]`. Non-finite axes become 0.
    pub fn new(x: f64, y: f64) -> Self {
        let axis = |v: f64| if v.is_finite() { v.clamp(-1.0, 1.0) } else { 0.0 };
        Self {
            x: axis(x),
            y: axis(y),
        }
    }

    /// Vector for a pointer offset from the control's centre.
    ///
    /// The offset is capped at `radius` (keeping its direction), then each
    /// axis is divided by `radius`.
    pub fn from_offset(dx: f64, dy: f64, radius: f64) -> Self {
        if radius <= 0.0 || !radius.is_finite() {
            return Self::CENTER;
        }
        let distance = dx.hypot(dy);
        if distance == 0.0 || !distance.is_finite() {
            return Self::CENTER;
        }
        let capped = distance.min(radius);
        let angle = dy.atan2(dx);
        Self::new(angle.cos() * capped / radius, angle.sin() * capped / radius)
    }

    pub fn is_centered(&self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Connection
// ─────────────────────────────────────────────────────────────────────────────

/// How the device base URL is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionMode {
    /// Fixed LAN address of the device's access point (user-editable).
    #[default]
    Wifi,
    /// Local test endpoint (mock device).
    Localhost,
}

impl ConnectionMode {
    pub fn toggled(self) -> Self {
        match self {
            ConnectionMode::Wifi => ConnectionMode::Localhost,
            ConnectionMode::Localhost => ConnectionMode::Wifi,
        }
    }

    pub fn parse(s: &str) -> Option<ConnectionMode> {
        match s.to_ascii_lowercase().as_str() {
            "wifi" => Some(ConnectionMode::Wifi),
            "localhost" | "local" => Some(ConnectionMode::Localhost),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ConnectionMode::Wifi => "wifi",
            ConnectionMode::Localhost => "localhost",
        }
    }
}

impl std::fmt::Display for ConnectionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Link state to the remote device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

impl ConnectionStatus {
    pub fn is_connected(self) -> bool {
        self == ConnectionStatus::Connected
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ConnectionStatus::Disconnected => "disconnected",
            ConnectionStatus::Connecting => "connecting",
            ConnectionStatus::Connected => "connected",
        }
    }
}

impl std::fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Event log
// ─────────────────────────────────────────────────────────────────────────────

/// Counter for generating unique log entry IDs
static LOG_ENTRY_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Log severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl LogLevel {
    pub fn prefix(&self) -> &'static str {
        match self {
            LogLevel::Debug => "·",
            LogLevel::Info => "•",
            LogLevel::Warning => "!",
            LogLevel::Error => "✗",
        }
    }
}

/// Where an event log entry originated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogSource {
    /// The controller itself
    App,
    /// Connection state machine and status poll
    Connection,
    /// Servo command dispatch
    Command,
    /// User input handling
    Input,
}

impl LogSource {
    pub fn prefix(&self) -> &'static str {
        match self {
            LogSource::App => "app",
            LogSource::Connection => "link",
            LogSource::Command => "cmd",
            LogSource::Input => "input",
        }
    }
}

/// A user-visible event log line
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub level: LogLevel,
    pub source: LogSource,
    pub message: String,
    pub id: u64,
}

impl LogEntry {
    pub fn new(level: LogLevel, source: LogSource, message: impl Into<String>) -> Self {
        Self {
            timestamp: Local::now(),
            level,
            source,
            message: message.into(),
            id: LOG_ENTRY_COUNTER.fetch_add(1, Ordering::Relaxed),
        }
    }

    pub fn info(source: LogSource, message: impl Into<String>) -> Self {
        Self::new(LogLevel::Info, source, message)
    }

    pub fn warn(source: LogSource, message: impl Into<String>) -> Self {
        Self::new(LogLevel::Warning, source, message)
    }

    pub fn error(source: LogSource, message: impl Into<String>) -> Self {
        Self::new(LogLevel::Error, source, message)
    }

    pub fn formatted_time(&self) -> String {
        self.timestamp.format("%H:%M:%S").to_string()
    }
}
