//! # armctl-core - Core Domain Types
//!
//! Foundation crate for armctl. Provides domain types, the angle model,
//! error handling, and logging setup.
//!
//! This crate has **zero internal dependencies** -- it only depends on external
//! crates (serde, chrono, thiserror, tracing).
//!
//! ## Public API
//!
//! ### Angle Model (`angle`)
//! - [`Angle`] - Integer servo angle, always clamped into `[0, 180]`
//!
//! ### Domain Types (`types`)
//! - [`ServoId`] - The four servos and their fixed device channels
//! - [`ServoPositions`] - Fully populated servo → angle mapping
//! - [`Direction`], [`JoystickVector`] - Normalized user input
//! - [`ConnectionMode`], [`ConnectionStatus`] - Link configuration and state
//! - [`LogEntry`], [`LogLevel`], [`LogSource`] - User-visible event log
//!
//! ### Error Handling (`error`)
//! - [`Error`] - Custom error enum with `fatal` vs `recoverable` classification
//! - [`DeviceError`] - Per-request device failures (timeout, refused, rejected, malformed)
//! - [`Result`] - Type alias for `std::result::Result<T, Error>`
//!
//! ## Prelude
//!
//! Import commonly used types with:
//! ```rust
//! use armctl_core::prelude::*;
//! ```

pub mod angle;
pub mod error;
pub mod logging;
pub mod types;

/// Prelude for common imports used throughout all armctl crates
pub mod prelude {
    pub use super::error::{DeviceError, Error, Result};
    pub use tracing::{debug, error, info, instrument, trace, warn};
}

// Re-export commonly used types at crate root for convenience
pub use angle::{Angle, MAX_DEGREES, MIN_DEGREES, NEUTRAL_DEGREES};
pub use error::{DeviceError, Error, Result};
pub use types::{
    ConnectionMode, ConnectionStatus, Direction, JoystickVector, LogEntry, LogLevel, LogSource,
    PerServo, ServoId, ServoPositions,
};
