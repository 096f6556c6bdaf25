//! # armctl-device - Servo Controller Link
//!
//! Talks to the robotic arm's servo controller over HTTP and provides the
//! cancellation primitive every device request runs under.
//!
//! Depends on [`armctl_core`] for domain types and error handling.
//!
//! ## Public API
//!
//! ### Client
//! - [`DeviceClient`] - `GET /status` and `GET /setServo` with per-request deadlines
//! - [`base_url_for()`] - Resolve the base URL from connection mode and address
//!
//! ### Protocol
//! - [`DeviceStatus`] - Decoded status payload (angles may be absent)
//! - [`parse_status()`] - Lenient status decoding; never fails
//!
//! ### Cancellation
//! - [`OperationHandle`] / [`CancelToken`] - Owner and task halves of one operation
//! - [`run_cancellable()`] - Run a request future until done or cancelled
//! - [`Outcome`] - Completed, failed or cancelled
//!
//! ### Testing
//! - `test_utils::MockDevice` (feature `test-helpers`) - in-process firmware mock

pub mod client;
pub mod operation;
pub mod protocol;
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_utils;

pub use client::{base_url_for, DeviceClient};
pub use operation::{run_cancellable, CancelToken, OperationHandle, Outcome};
pub use protocol::{parse_status, DeviceStatus};
