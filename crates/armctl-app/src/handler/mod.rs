//! Handler module - TEA update function and event handlers
//!
//! Organized into submodules:
//! - `update`: Main update() function and message dispatch
//! - `arm`: Power, D-pad, joystick and button handlers, servo dispatch
//! - `connection`: Connection state machine, probe and poll results
//! - `keys`: Key event handlers for UI modes

pub(crate) mod arm;
pub(crate) mod connection;
pub(crate) mod keys;
pub(crate) mod update;


use std::path::PathBuf;
use std::time::Duration;

use armctl_core::{Angle, ServoId};
use armctl_device::{CancelToken, DeviceClient};

use crate::config::Settings;
use crate::message::Message;

// Re-export main entry point
pub use update::update;

#[cfg(test)]
pub(crate) use keys::handle_key;

/// One `setServo` request ready to be spawned.
#[derive(Debug, Clone)]
pub struct ServoCommand {
    pub servo: ServoId,
    pub angle: Angle,
    /// Generation token; the completion is applied only if it still matches
    pub token: u64,
    pub cancel: CancelToken,
}

/// Actions that the event loop should perform after update
#[derive(Debug, Clone)]
pub enum UpdateAction {
    /// Connectivity probe (`GET /status`) for a connection attempt
    ProbeDevice {
        attempt: u64,
        client: DeviceClient,
        cancel: CancelToken,
        timeout: Duration,
    },

    /// Fire-and-forget `setServo` requests, one task per servo
    SendServoCommands {
        client: DeviceClient,
        commands: Vec<ServoCommand>,
        timeout: Duration,
    },

    /// Start the recurring reconciliation poll.
    ///
    /// The task runs until `cancel` fires, which happens whenever the
    /// connection leaves `connected`, power goes off, or the engine shuts down.
    StartStatusPoll {
        session: u64,
        client: DeviceClient,
        cancel: CancelToken,
        interval: Duration,
        timeout: Duration,
    },

    /// One-off status read after a failed servo command
    ReconcileStatus {
        attempt: u64,
        client: DeviceClient,
        cancel: CancelToken,
        timeout: Duration,
    },

    /// Persist settings (remembered address)
    SaveSettings {
        path: PathBuf,
        settings: Box<Settings>,
    },

    /// Several independent actions from one update
    Batch(Vec<UpdateAction>),
}

impl UpdateAction {
    /// Combine optional actions; `None` when there is nothing to do.
    pub fn batch(actions: impl IntoIterator<Item = Option<UpdateAction>>) -> Option<UpdateAction> {
        let mut actions: Vec<UpdateAction> = actions.into_iter().flatten().collect();
        match actions.len() {
            0 => None,
            1 => actions.pop(),
            _ => Some(UpdateAction::Batch(actions)),
        }
    }
}

/// Result of processing a message
#[derive(Debug, Default)]
pub struct UpdateResult {
    /// Optional follow-up message to process
    pub message: Option<Message>,
    /// Optional action for the event loop to perform
    pub action: Option<UpdateAction>,
}

impl UpdateResult {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn message(msg: Message) -> Self {
        Self {
            message: Some(msg),
            action: None,
        }
    }

    pub fn action(action: UpdateAction) -> Self {
        Self {
            message: None,
            action: Some(action),
        }
    }

    pub fn maybe_action(action: Option<UpdateAction>) -> Self {
        Self {
            message: None,
            action,
        }
    }
}
