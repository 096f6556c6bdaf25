//! Application error types with rich context

use std::time::Duration;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Application error types organized by layer/domain
#[derive(Debug, Error)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────
    // Common/Infrastructure Errors
    // ─────────────────────────────────────────────────────────────
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    // ─────────────────────────────────────────────────────────────
    // Terminal/TUI Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Terminal error: {message}")]
    Terminal { message: String },

    // ─────────────────────────────────────────────────────────────
    // Device Errors
    // ─────────────────────────────────────────────────────────────
    #[error(transparent)]
    Device(#[from] DeviceError),

    #[error("Invalid device address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("HTTP client error: {message}")]
    HttpClient { message: String },

    // ─────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

// ─────────────────────────────────────────────────────────────────
// Convenience Constructors
// ─────────────────────────────────────────────────────────────────

impl Error {
    pub fn terminal(message: impl Into<String>) -> Self {
        Self::Terminal {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn invalid_address(address: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidAddress {
            address: address.into(),
            reason: reason.into(),
        }
    }

    pub fn http_client(message: impl Into<String>) -> Self {
        Self::HttpClient {
            message: message.into(),
        }
    }

    /// Check if this is a recoverable error
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::Io(_)
                | Error::Device(_)
                | Error::InvalidAddress { .. }
                | Error::Config { .. }
        )
    }

    /// Check if this error should trigger application exit
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Terminal { .. } | Error::HttpClient { .. })
    }
}

// ─────────────────────────────────────────────────────────────────
// Device link taxonomy
// ─────────────────────────────────────────────────────────────────

/// Failure of a single request to the remote device.
///
/// Cloneable so it can travel inside messages back to the update loop.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeviceError {
    /// The request exceeded its client-side deadline and was aborted.
    #[error("request timed out after {}ms", after.as_millis())]
    ConnectivityTimeout { after: Duration },

    /// Transport failure or a non-success status on a status request.
    #[error("{message}")]
    ConnectivityRefused {
        message: String,
        status: Option<u16>,
    },

    /// The device answered a servo command with a non-success status.
    #[error("command rejected ({status}): {reason}")]
    CommandRejected { status: u16, reason: String },

    /// Status payload did not carry the expected fields.
    #[error("malformed status response: {message}")]
    MalformedResponse { message: String },
}

impl DeviceError {
    pub fn timeout(after: Duration) -> Self {
        Self::ConnectivityTimeout { after }
    }

    pub fn refused(message: impl Into<String>) -> Self {
        Self::ConnectivityRefused {
            message: message.into(),
            status: None,
        }
    }

    pub fn bad_status(status: u16) -> Self {
        Self::ConnectivityRefused {
            message: format!("Status request failed ({})", status),
            status: Some(status),
        }
    }

    pub fn rejected(status: u16, reason: impl Into<String>) -> Self {
        Self::CommandRejected {
            status,
            reason: reason.into(),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            message: message.into(),
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, DeviceError::ConnectivityTimeout { .. })
    }

    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            DeviceError::ConnectivityRefused { status, .. } => *status,
            DeviceError::CommandRejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Message suitable for the connection panel after a failed connect.
    pub fn user_message(&self) -> String {
        match self {
            DeviceError::ConnectivityTimeout { .. } => {
                "Connection timeout - device not responding. Make sure it's powered on."
                    .to_string()
            }
            other => format!("Connection failed: {}", other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_messages() {
        let err = Error::config("bad mode");
        assert_eq!(err.to_string(), "Configuration error: bad mode");

        let err = Error::invalid_address("::", "empty host");
        assert!(err.to_string().contains("empty host"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_error_from_device_is_transparent() {
        let err: Error = DeviceError::bad_status(503).into();
        assert_eq!(err.to_string(), "Status request failed (503)");
        assert!(err.is_recoverable());
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_error_is_fatal() {
        assert!(Error::terminal("no tty").is_fatal());
        assert!(!Error::config("x").is_fatal());
        assert!(Error::config("x").is_recoverable());
    }

    #[test]
    fn test_timeout_user_message_differs_from_refused() {
        let timeout = DeviceError::timeout(Duration::from_secs(5));
        assert!(timeout.user_message().contains("timeout"));
        assert!(timeout.is_timeout());

        let refused = DeviceError::refused("connection refused");
        assert_eq!(
            refused.user_message(),
            "Connection failed: connection refused"
        );
        assert!(!refused.is_timeout());
    }

    #[test]
    fn test_device_error_status() {
        assert_eq!(DeviceError::bad_status(404).status(), Some(404));
        assert_eq!(DeviceError::rejected(400, "servo out of range").status(), Some(400));
        assert_eq!(DeviceError::timeout(Duration::from_secs(3)).status(), None);
    }

    #[test]
    fn test_malformed_display() {
        let err = DeviceError::malformed("missing a1");
        assert_eq!(err.to_string(), "malformed status response: missing a1");
        assert_eq!(err.status(), None);
    }

    #[test]
    fn test_timeout_display() {
        let err = DeviceError::timeout(Duration::from_millis(3000));
        assert_eq!(err.to_string(), "request timed out after 3000ms");
    }
}
