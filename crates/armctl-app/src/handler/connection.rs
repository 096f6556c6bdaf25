//! Connection state machine handlers
//!
//! ```text
//! disconnected --connect()--> connecting --probe ok--> connected
//!                                  |                       |
//!                                  +--probe failed--+      +--poll failures / disconnect()
//!                                                   v      v
//!                                                 disconnected
//! ```

use armctl_core::prelude::*;
use armctl_core::{ConnectionMode, LogSource};
use armctl_device::DeviceStatus;

use crate::state::{AppState, DeviceInfo, PositionSource};

use super::{UpdateAction, UpdateResult};

/// Probe the currently selected target.
///
/// From any state: stops the poll, cancels an in-flight probe and pending
/// commands, then moves to `connecting`. An address that cannot form a URL
/// leaves the state `disconnected` with the reason as last error.
pub fn handle_connect(state: &mut AppState) -> UpdateResult {
    let was = state.connection.status;
    state.arm.cancel_all_commands();

    let url = match state.connection.target_url() {
        Ok(url) => url,
        Err(e) => return fail_before_probe(state, e),
    };
    let client = match state.connection.client_for(url.clone()) {
        Ok(client) => client,
        Err(e) => return fail_before_probe(state, e),
    };

    let (attempt, cancel) = state.connection.begin_attempt(url.clone(), client.clone());
    info!(
        "Connecting to {} ({} mode, attempt {}, was {})",
        url, state.connection.mode, attempt, was
    );
    state.log_info(LogSource::Connection, format!("Connecting to {}", url));

    UpdateResult::action(UpdateAction::ProbeDevice {
        attempt,
        client,
        cancel,
        timeout: state.settings.connection.probe_timeout(),
    })
}

fn fail_before_probe(state: &mut AppState, error: Error) -> UpdateResult {
    warn!("Cannot connect: {}", error);
    state.connection.disconnect(Some(format!("Connection failed: {}", error)));
    state.log_error(LogSource::Connection, error.to_string());
    UpdateResult::none()
}

/// Select a mode (and optionally an address), then probe.
pub fn handle_connect_to(
    state: &mut AppState,
    mode: ConnectionMode,
    address: Option<String>,
) -> UpdateResult {
    state.connection.mode = mode;
    if let Some(address) = address {
        set_address(state, &address);
    }
    handle_connect(state)
}

/// The probe for `attempt` settled.
pub fn handle_probe_completed(
    state: &mut AppState,
    attempt: u64,
    result: std::result::Result<DeviceStatus, DeviceError>,
) -> UpdateResult {
    if !state.connection.is_current_probe(attempt) {
        debug!("Dropping stale probe result for attempt {}", attempt);
        return UpdateResult::none();
    }

    match result {
        Ok(status) => {
            state.connection.probe_succeeded(DeviceInfo {
                ip: status.ip.clone(),
                mode: status.mode.clone(),
            });
            let url = state
                .connection
                .base_url
                .as_ref()
                .map(|u| u.to_string())
                .unwrap_or_default();
            info!("Connected to {}", url);
            state.log_info(LogSource::Connection, format!("Connected to {}", url));

            apply_status(state, &status);

            let poll = start_poll_if_ready(state);
            let save = remember_address(state);
            UpdateResult::maybe_action(UpdateAction::batch([poll, save]))
        }
        Err(error) => {
            let message = error.user_message();
            warn!("Probe failed (attempt {}): {}", attempt, error);
            state.connection.probe_failed(message.clone());
            state.log_error(LogSource::Connection, message);
            UpdateResult::none()
        }
    }
}

/// One reconciliation poll settled.
///
/// A single failure never drops the connection; `max_poll_failures`
/// consecutive failures do (0 disables the limit).
pub fn handle_status_polled(
    state: &mut AppState,
    session: u64,
    result: std::result::Result<DeviceStatus, DeviceError>,
) -> UpdateResult {
    if state.connection.poll_session() != Some(session) || !state.connection.is_connected() {
        debug!("Dropping stale poll result (session {})", session);
        return UpdateResult::none();
    }

    match result {
        Ok(status) => {
            if state.connection.consecutive_poll_failures > 0 {
                info!(
                    "Status poll recovered after {} failure(s)",
                    state.connection.consecutive_poll_failures
                );
            }
            state.connection.consecutive_poll_failures = 0;
            state.last_poll_error = None;
            apply_status(state, &status);
            UpdateResult::none()
        }
        Err(error) => {
            state.connection.consecutive_poll_failures += 1;
            state.counters.poll_failures += 1;
            let failures = state.connection.consecutive_poll_failures;
            warn!("Status poll failed ({} in a row): {}", failures, error);
            state.last_poll_error = Some(error.clone());

            let limit = state.settings.connection.max_poll_failures;
            if limit > 0 && failures >= limit {
                let message = format!(
                    "Lost connection: {} consecutive status polls failed ({})",
                    failures, error
                );
                error!("{}", message);
                state.arm.cancel_all_commands();
                state.connection.disconnect(Some(message.clone()));
                state.log_error(LogSource::Connection, message);
            } else {
                state.log_warn(LogSource::Connection, format!("Status poll failed: {}", error));
            }
            UpdateResult::none()
        }
    }
}

/// Follow-up status read after a command failure settled.
pub fn handle_reconcile_completed(
    state: &mut AppState,
    attempt: u64,
    result: std::result::Result<DeviceStatus, DeviceError>,
) -> UpdateResult {
    if !state.connection.finish_reconcile(attempt) {
        debug!("Dropping stale reconcile result (attempt {})", attempt);
        return UpdateResult::none();
    }
    match result {
        Ok(status) => apply_status(state, &status),
        Err(error) => debug!("Reconcile after command failure failed: {}", error),
    }
    UpdateResult::none()
}

/// User-initiated disconnect: cancels the poll, the probe and every command.
pub fn handle_disconnect(state: &mut AppState) -> UpdateResult {
    let was = state.connection.status;
    let cancelled = state.arm.cancel_all_commands();
    state.connection.disconnect(None);
    info!("Disconnected (was {}, {} command(s) cancelled)", was, cancelled);
    state.log_info(LogSource::Connection, "Disconnected");
    UpdateResult::none()
}

/// Switch wifi/localhost. Does not disconnect; the next connect re-probes.
pub fn handle_toggle_mode(state: &mut AppState) -> UpdateResult {
    state.connection.mode = state.connection.mode.toggled();
    info!("Connection mode: {}", state.connection.mode);
    state.log_info(
        LogSource::Connection,
        format!("Mode set to {}", state.connection.mode),
    );
    UpdateResult::none()
}

pub fn handle_set_address(state: &mut AppState, address: &str) -> UpdateResult {
    set_address(state, address);
    UpdateResult::none()
}

fn set_address(state: &mut AppState, address: &str) {
    let address = address.trim();
    if address != state.connection.address {
        info!("Device address set to {}", address);
        state.connection.address = address.to_string();
        state.log_info(LogSource::Connection, format!("Address set to {}", address));
    }
}

/// Start the reconciliation poll when connected and powered.
pub fn start_poll_if_ready(state: &mut AppState) -> Option<UpdateAction> {
    if !state.arm.power || !state.connection.is_connected() {
        return None;
    }
    let client = state.connection.client()?.clone();
    let (session, cancel) = state.connection.start_poll();
    debug!("Starting status poll session {}", session);
    Some(UpdateAction::StartStatusPoll {
        session,
        client,
        cancel,
        interval: state.settings.connection.poll_interval(),
        timeout: state.settings.connection.request_timeout(),
    })
}

/// Queue one status read unless one is already outstanding.
pub fn start_reconcile(state: &mut AppState) -> Option<UpdateAction> {
    if !state.connection.is_connected() || state.connection.is_reconciling() {
        return None;
    }
    let client = state.connection.client()?.clone();
    let cancel = state.connection.begin_reconcile();
    Some(UpdateAction::ReconcileStatus {
        attempt: state.connection.attempt(),
        client,
        cancel,
        timeout: state.settings.connection.request_timeout(),
    })
}

/// Overwrite local positions with device-reported angles, when present.
fn apply_status(state: &mut AppState, status: &DeviceStatus) {
    match &status.positions {
        Some(reported) => {
            if state.arm.reconcile(reported) {
                state.positions_source = PositionSource::Device;
                debug!("Positions reconciled from device");
            }
        }
        None => {
            let reason = status.malformed.as_deref().unwrap_or("no angles");
            debug!("{}", DeviceError::malformed(reason));
        }
    }
}

/// Persist the wifi address after a successful connect.
fn remember_address(state: &mut AppState) -> Option<UpdateAction> {
    if !state.settings.connection.remember_address
        || state.connection.mode != ConnectionMode::Wifi
        || state.settings.connection.address == state.connection.address
    {
        return None;
    }
    let path = state.config_path.clone()?;
    state.settings.connection.address = state.connection.address.clone();
    Some(UpdateAction::SaveSettings {
        path,
        settings: Box::new(state.settings.clone()),
    })
}
