//! Configuration types for armctl
//!
//! Defines `Settings` and its sections. Every field has a serde default so a
//! partial `config.toml` is always valid.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use armctl_core::ConnectionMode;

/// Lower bound for the reconciliation poll interval.
pub const MIN_POLL_INTERVAL_MS: u64 = 100;

/// Application settings (`config.toml`)
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub connection: ConnectionSettings,

    #[serde(default)]
    pub control: ControlSettings,

    #[serde(default)]
    pub ui: UiSettings,
}

/// Device link settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ConnectionSettings {
    /// `wifi` (fixed LAN address) or `localhost` (test endpoint)
    #[serde(default)]
    pub mode: ConnectionMode,

    /// Device address used in `wifi` mode
    #[serde(default = "default_address")]
    pub address: String,

    /// Endpoint used in `localhost` mode
    #[serde(default = "default_localhost_url")]
    pub localhost_url: String,

    /// Deadline for the connectivity probe
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,

    /// Deadline for status polls and servo commands
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Reconciliation poll period
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Consecutive poll failures tolerated before disconnecting (0 = never)
    #[serde(default = "default_max_poll_failures")]
    pub max_poll_failures: u32,

    /// Re-read device status after a failed servo command
    #[serde(default)]
    pub reconcile_on_command_failure: bool,

    /// Persist the wifi address after a successful connect
    #[serde(default = "default_true")]
    pub remember_address: bool,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            mode: ConnectionMode::default(),
            address: default_address(),
            localhost_url: default_localhost_url(),
            probe_timeout_ms: default_probe_timeout_ms(),
            request_timeout_ms: default_request_timeout_ms(),
            poll_interval_ms: default_poll_interval_ms(),
            max_poll_failures: default_max_poll_failures(),
            reconcile_on_command_failure: false,
            remember_address: true,
        }
    }
}

impl ConnectionSettings {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Poll period, never shorter than [`MIN_POLL_INTERVAL_MS`].
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(MIN_POLL_INTERVAL_MS))
    }
}

fn default_address() -> String {
    "192.168.4.1".to_string()
}

fn default_localhost_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_probe_timeout_ms() -> u64 {
    5000
}

fn default_request_timeout_ms() -> u64 {
    3000
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_max_poll_failures() -> u32 {
    3
}

fn default_true() -> bool {
    true
}

/// Input mapping settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ControlSettings {
    /// Degrees per D-pad press
    #[serde(default = "default_dpad_step")]
    pub dpad_step: u8,

    /// Degrees per joystick update at full deflection
    #[serde(default = "default_joystick_step")]
    pub joystick_step: f64,

    /// Axis magnitude at or below which joystick input is ignored
    #[serde(default = "default_joystick_dead_zone")]
    pub joystick_dead_zone: f64,
}

impl Default for ControlSettings {
    fn default() -> Self {
        Self {
            dpad_step: default_dpad_step(),
            joystick_step: default_joystick_step(),
            joystick_dead_zone: default_joystick_dead_zone(),
        }
    }
}

fn default_dpad_step() -> u8 {
    5
}

fn default_joystick_step() -> f64 {
    2.0
}

fn default_joystick_dead_zone() -> f64 {
    0.1
}

/// UI settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct UiSettings {
    #[serde(default = "default_true")]
    pub show_event_log: bool,

    /// Maximum entries kept in the event log
    #[serde(default = "default_event_log_size")]
    pub event_log_size: usize,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            show_event_log: true,
            event_log_size: default_event_log_size(),
        }
    }
}

fn default_event_log_size() -> usize {
    200
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.connection.mode, ConnectionMode::Wifi);
        assert_eq!(settings.connection.address, "192.168.4.1");
        assert_eq!(settings.connection.probe_timeout(), Duration::from_secs(5));
        assert_eq!(settings.connection.request_timeout(), Duration::from_secs(3));
        assert_eq!(settings.connection.poll_interval(), Duration::from_secs(1));
        assert_eq!(settings.connection.max_poll_failures, 3);
        assert!(!settings.connection.reconcile_on_command_failure);
        assert_eq!(settings.control.dpad_step, 5);
        assert_eq!(settings.control.joystick_step, 2.0);
        assert_eq!(settings.control.joystick_dead_zone, 0.1);
    }

    #[test]
    fn test_empty_toml_is_default() {
        let settings: Settings = toml::from_str("").unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_partial_section() {
        let settings: Settings = toml::from_str(
            r#"
[connection]
mode = "localhost"
max_poll_failures = 0
"#,
        )
        .unwrap();
        assert_eq!(settings.connection.mode, ConnectionMode::Localhost);
        assert_eq!(settings.connection.max_poll_failures, 0);
        assert_eq!(settings.connection.address, "192.168.4.1");
        assert!(settings.connection.remember_address);
    }

    #[test]
    fn test_poll_interval_has_floor() {
        let connection = ConnectionSettings {
            poll_interval_ms: 5,
            ..Default::default()
        };
        assert_eq!(connection.poll_interval(), Duration::from_millis(100));
    }

    #[test]
    fn test_unknown_mode_is_rejected() {
        let result: std::result::Result<Settings, _> =
            toml::from_str("[connection]\nmode = \"bluetooth\"\n");
        assert!(result.is_err());
    }
}
