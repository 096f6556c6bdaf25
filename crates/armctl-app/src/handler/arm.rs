//! Arm control handlers: power, input mapping and servo dispatch

use armctl_core::prelude::*;
use armctl_core::{Angle, DeviceError, LogSource, ServoId, ServoPositions};

use crate::input::{apply_instructions, ArmInput};
use crate::state::{AppState, CommandFailure, PositionSource};

use super::{connection, ServoCommand, UpdateAction, UpdateResult};

/// Reason recorded when power-on is attempted without a connection.
pub const NOT_CONNECTED: &str = "Not connected to device";

/// Handle the power toggle.
///
/// Power-on requires `connected`; it resets every servo to neutral, sends one
/// command per servo and starts the reconciliation poll. Power-off is always
/// allowed and stops the poll and any command in flight.
pub fn handle_toggle_power(state: &mut AppState) -> UpdateResult {
    if state.arm.power {
        state.arm.power = false;
        state.cancel_all_operations();
        info!("Power off");
        state.log_info(LogSource::App, "Power off");
        return UpdateResult::none();
    }

    if !state.connection.is_connected() {
        state.connection.last_error = Some(NOT_CONNECTED.to_string());
        state.block(NOT_CONNECTED);
        state.log_warn(LogSource::App, "Power on refused: not connected");
        return UpdateResult::none();
    }

    state.arm.power = true;
    state.arm.active_direction = None;
    state.arm.positions = ServoPositions::neutral();
    state.positions_source = PositionSource::PowerOn;
    info!("Power on, resetting servos to neutral");
    state.log_info(LogSource::App, "Power on");

    let changed: Vec<(ServoId, Angle)> = ServoId::ALL
        .into_iter()
        .map(|servo| (servo, Angle::NEUTRAL))
        .collect();
    let dispatch = dispatch_servos(state, changed);
    let poll = connection::start_poll_if_ready(state);

    UpdateResult::maybe_action(UpdateAction::batch([dispatch, poll]))
}

/// Map an input through the power/connection gate, apply it and dispatch.
pub fn handle_arm_input(state: &mut AppState, input: ArmInput) -> UpdateResult {
    let instructions = match state.mapper.map(state.arm.power, input) {
        Ok(instructions) => instructions,
        Err(_) => {
            state.block(format!("Power is off: {} ignored", input.label()));
            return UpdateResult::none();
        }
    };

    if !state.connection.is_connected() {
        state.block(format!("{}: {} ignored", NOT_CONNECTED, input.label()));
        return UpdateResult::none();
    }

    if instructions.is_empty() {
        return UpdateResult::none();
    }

    let changed = apply_instructions(&mut state.arm.positions, &instructions);
    state.positions_source = PositionSource::Input;
    if matches!(input, ArmInput::Reset) {
        state.log_info(LogSource::Input, "Reset to neutral");
    }

    UpdateResult::maybe_action(dispatch_servos(state, changed))
}

/// Issue one `setServo` per changed servo, superseding anything in flight for
/// the same servo. Nothing is sent unless powered and connected.
pub fn dispatch_servos(
    state: &mut AppState,
    changed: Vec<(ServoId, Angle)>,
) -> Option<UpdateAction> {
    if changed.is_empty() || !state.can_send_commands() {
        return None;
    }
    let client = state.connection.client()?.clone();

    let commands: Vec<ServoCommand> = changed
        .into_iter()
        .map(|(servo, angle)| {
            let (token, cancel) = state.arm.begin_command(servo, angle);
            debug!("Dispatch {} -> {} (token {})", servo, angle, token);
            ServoCommand {
                servo,
                angle,
                token,
                cancel,
            }
        })
        .collect();
    state.counters.commands_sent += commands.len() as u64;

    Some(UpdateAction::SendServoCommands {
        client,
        commands,
        timeout: state.settings.connection.request_timeout(),
    })
}

/// A servo command settled. Stale results (superseded by a newer command for
/// the same servo, or cancelled by a state change) are dropped. Failures are
/// reported but never roll back the optimistic local angle.
pub fn handle_command_completed(
    state: &mut AppState,
    servo: ServoId,
    token: u64,
    angle: Angle,
    result: std::result::Result<(), DeviceError>,
) -> UpdateResult {
    let Some(pending) = state.arm.complete_command(servo, token) else {
        debug!("Dropping stale {} result (token {})", servo, token);
        return UpdateResult::none();
    };

    match result {
        Ok(()) => {
            trace!(
                "{} -> {} acknowledged in {:?}",
                servo,
                angle,
                pending.issued_at.elapsed()
            );
            UpdateResult::none()
        }
        Err(error) => {
            warn!("Servo command {} -> {} failed: {}", servo, angle, error);
            state.log_warn(
                LogSource::Command,
                format!("{} -> {} failed: {}", servo.label(), angle, error),
            );
            state.counters.command_failures += 1;
            state.last_command_failure = Some(CommandFailure {
                servo,
                angle,
                error,
            });

            if state.settings.connection.reconcile_on_command_failure {
                UpdateResult::maybe_action(connection::start_reconcile(state))
            } else {
                UpdateResult::none()
            }
        }
    }
}
