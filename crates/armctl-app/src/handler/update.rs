//! Main update function - handles state transitions (TEA pattern)
//!
//! Handler implementations live in:
//! - `arm`: power, D-pad, joystick and buttons, servo command completions
//! - `connection`: connect/disconnect, probe and poll results
//! - `keys`: key → message mapping per UI mode

use std::time::Instant;

use armctl_core::prelude::*;
use armctl_core::{Direction, JoystickVector, LogSource};

use crate::input::ArmInput;
use crate::message::Message;
use crate::state::{AppPhase, AppState, UiMode, MAX_ADDRESS_LEN};

use super::{arm, connection, keys::handle_key, UpdateResult};

/// Process a message and update state
/// Returns optional follow-up message and/or action
pub fn update(state: &mut AppState, message: Message) -> UpdateResult {
    match message {
        Message::Quit => {
            if state.phase != AppPhase::Quitting {
                info!("Quit requested");
                state.phase = AppPhase::Quitting;
                state.cancel_all_operations();
                state.connection.disconnect(None);
            }
            UpdateResult::none()
        }

        Message::Key(key) => match handle_key(state, key) {
            Some(msg) => UpdateResult::message(msg),
            None => UpdateResult::none(),
        },

        Message::Tick => {
            state.expire_notices(Instant::now());
            UpdateResult::none()
        }

        // ─────────────────────────────────────────────────────────
        // Arm Control
        // ─────────────────────────────────────────────────────────
        Message::TogglePower => arm::handle_toggle_power(state),

        Message::DirectionPressed(direction) => {
            // The D-pad only lights up for presses that can reach the arm
            if state.can_send_commands() {
                state.arm.active_direction = Some(direction);
            }
            arm::handle_arm_input(state, ArmInput::Press(direction))
        }

        Message::DirectionReleased(direction) => {
            if state.arm.active_direction == Some(direction) {
                state.arm.active_direction = None;
            }
            UpdateResult::none()
        }

        Message::JoystickMoved(vector) => {
            state.arm.joystick = vector;
            arm::handle_arm_input(state, ArmInput::Joystick(vector))
        }

        Message::JoystickReleased => {
            state.arm.joystick = JoystickVector::CENTER;
            UpdateResult::none()
        }

        Message::JoystickNudge(direction) => {
            let vector = nudge_vector(direction);
            state.arm.joystick = vector;
            let mut result = arm::handle_arm_input(state, ArmInput::Joystick(vector));
            result.message = Some(Message::JoystickReleased);
            result
        }

        Message::Reset => arm::handle_arm_input(state, ArmInput::Reset),
        Message::GripperOpen => arm::handle_arm_input(state, ArmInput::GripperOpen),
        Message::GripperClose => arm::handle_arm_input(state, ArmInput::GripperClose),

        // ─────────────────────────────────────────────────────────
        // Connection
        // ─────────────────────────────────────────────────────────
        Message::Connect => connection::handle_connect(state),
        Message::ConnectTo { mode, address } => connection::handle_connect_to(state, mode, address),
        Message::Disconnect => connection::handle_disconnect(state),
        Message::ToggleMode => connection::handle_toggle_mode(state),
        Message::SetAddress(address) => connection::handle_set_address(state, &address),

        // ─────────────────────────────────────────────────────────
        // Address Editing
        // ─────────────────────────────────────────────────────────
        Message::StartEditAddress => {
            state.address_input = state.connection.address.clone();
            state.ui_mode = UiMode::EditingAddress;
            UpdateResult::none()
        }

        Message::AddressInput(c) => {
            if state.ui_mode == UiMode::EditingAddress
                && !c.is_whitespace()
                && !c.is_control()
                && state.address_input.len() + c.len_utf8() <= MAX_ADDRESS_LEN
            {
                state.address_input.push(c);
            }
            UpdateResult::none()
        }

        Message::AddressBackspace => {
            state.address_input.pop();
            UpdateResult::none()
        }

        Message::CommitAddress => {
            if state.ui_mode != UiMode::EditingAddress {
                return UpdateResult::none();
            }
            state.ui_mode = UiMode::Normal;
            let address = std::mem::take(&mut state.address_input);
            if address.trim().is_empty() {
                state.log_warn(LogSource::Input, "Address unchanged: empty input");
                return UpdateResult::none();
            }
            connection::handle_set_address(state, &address)
        }

        Message::CancelEditAddress => {
            state.ui_mode = UiMode::Normal;
            state.address_input.clear();
            UpdateResult::none()
        }

        // ─────────────────────────────────────────────────────────
        // Device I/O Completions
        // ─────────────────────────────────────────────────────────
        Message::ProbeCompleted { attempt, result } => {
            connection::handle_probe_completed(state, attempt, result)
        }

        Message::StatusPolled { session, result } => {
            connection::handle_status_polled(state, session, result)
        }

        Message::ServoCommandCompleted {
            servo,
            token,
            angle,
            result,
        } => arm::handle_command_completed(state, servo, token, angle, result),

        Message::ReconcileCompleted { attempt, result } => {
            connection::handle_reconcile_completed(state, attempt, result)
        }
    }
}

/// Full deflection toward `direction` (screen convention: down is +y).
fn nudge_vector(direction: Direction) -> JoystickVector {
    match direction {
        Direction::Up => JoystickVector::new(0.0, -1.0),
        Direction::Down => JoystickVector::new(0.0, 1.0),
        Direction::Left => JoystickVector::new(-1.0, 0.0),
        Direction::Right => JoystickVector::new(1.0, 0.0),
    }
}
