//! Application state (Model in TEA pattern)
//!
//! [`AppState`] is mutated only by `handler::update()`. Device I/O runs in
//! spawned tasks that report back through messages; each outstanding
//! operation is tracked here by an [`OperationHandle`] so that a late or
//! superseded result can be recognised and dropped.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use serde::Serialize;
use url::Url;

use armctl_core::prelude::*;
use armctl_core::{
    Angle, ConnectionMode, ConnectionStatus, Direction, JoystickVector, LogEntry, LogSource,
    PerServo, ServoId, ServoPositions,
};
use armctl_device::{base_url_for, CancelToken, DeviceClient, OperationHandle};

use crate::config::Settings;
use crate::input::InputMapper;

/// How long a "blocked" notice stays visible.
pub const BLOCKED_NOTICE_TTL: Duration = Duration::from_secs(2);

/// Longest address accepted from the address editor.
pub const MAX_ADDRESS_LEN: usize = 253;

/// Current UI mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UiMode {
    #[default]
    Normal,

    /// Capturing text for the wifi address
    EditingAddress,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppPhase {
    #[default]
    Running,
    Quitting,
}

/// What last wrote the servo positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionSource {
    #[default]
    Initial,
    /// D-pad, joystick, reset or gripper buttons
    Input,
    /// Power-on reset to neutral
    PowerOn,
    /// Reconciliation against device-reported status
    Device,
}

// ─────────────────────────────────────────────────────────────────────────────
// Arm State
// ─────────────────────────────────────────────────────────────────────────────

/// In-flight `setServo` request for one servo.
#[derive(Debug)]
pub struct PendingCommand {
    pub token: u64,
    pub angle: Angle,
    pub issued_at: Instant,
    handle: OperationHandle,
}

impl PendingCommand {
    pub fn operation_id(&self) -> u64 {
        self.handle.id()
    }
}

/// Canonical arm model: power, positions and per-servo command tracking.
#[derive(Debug, Default)]
pub struct ArmState {
    pub power: bool,
    pub positions: ServoPositions,
    /// D-pad highlight; display only
    pub active_direction: Option<Direction>,
    /// Last reported joystick vector; display only
    pub joystick: JoystickVector,
    generations: PerServo<u64>,
    pending: PerServo<Option<PendingCommand>>,
}

impl ArmState {
    /// Register a new command for `servo`, superseding (and cancelling) any
    /// command still in flight. Returns the generation token and the cancel
    /// token for the task that performs the request.
    pub fn begin_command(&mut self, servo: ServoId, angle: Angle) -> (u64, CancelToken) {
        let generation = self.generations.get_mut(servo);
        *generation += 1;
        let token = *generation;

        let (handle, cancel) = OperationHandle::new();
        let previous = self.pending.get_mut(servo).replace(PendingCommand {
            token,
            angle,
            issued_at: Instant::now(),
            handle,
        });
        if let Some(previous) = previous {
            trace!(
                "{} command {} superseded by {} (op {})",
                servo,
                previous.token,
                token,
                previous.operation_id()
            );
        }
        (token, cancel)
    }

    /// Settle the command carrying `token`. Returns `None` when a newer
    /// command has been issued since (the result is stale).
    pub fn complete_command(&mut self, servo: ServoId, token: u64) -> Option<PendingCommand> {
        let slot = self.pending.get_mut(servo);
        if slot.as_ref().is_some_and(|pending| pending.token == token) {
            slot.take()
        } else {
            None
        }
    }

    /// Current generation for `servo` (0 before the first command).
    pub fn generation(&self, servo: ServoId) -> u64 {
        *self.generations.get(servo)
    }

    pub fn is_pending(&self, servo: ServoId) -> bool {
        self.pending.get(servo).is_some()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.iter().filter(|(_, p)| p.is_some()).count()
    }

    /// Cancel every in-flight command. Returns how many were cancelled.
    pub fn cancel_all_commands(&mut self) -> usize {
        let mut cancelled = 0;
        for servo in ServoId::ALL {
            if self.pending.get_mut(servo).take().is_some() {
                cancelled += 1;
            }
        }
        cancelled
    }

    /// Overwrite positions with device-reported angles, skipping servos with a
    /// command in flight (their reported angle predates the command).
    /// Returns true when any angle changed.
    pub fn reconcile(&mut self, reported: &ServoPositions) -> bool {
        let mut changed = false;
        for (servo, angle) in reported.iter() {
            if self.is_pending(servo) {
                trace!("Skipping reconcile of {}: command in flight", servo);
                continue;
            }
            if self.positions.get(servo) != angle {
                self.positions.set(servo, angle);
                changed = true;
            }
        }
        changed
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Connection State
// ─────────────────────────────────────────────────────────────────────────────

/// Identity reported by the firmware in `/status`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeviceInfo {
    pub ip: Option<String>,
    pub mode: Option<String>,
}

#[derive(Debug)]
struct PollTask {
    session: u64,
    _handle: OperationHandle,
}

/// Connection state machine: disconnected → connecting → {connected | disconnected}.
#[derive(Debug)]
pub struct ConnectionState {
    pub status: ConnectionStatus,
    pub mode: ConnectionMode,
    /// Device address used in wifi mode
    pub address: String,
    /// Endpoint used in localhost mode
    pub localhost_url: String,
    /// Base URL of the current (or last) attempt
    pub base_url: Option<Url>,
    pub last_error: Option<String>,
    pub device: DeviceInfo,
    pub connected_at: Option<DateTime<Local>>,
    pub consecutive_poll_failures: u32,
    attempt: u64,
    client: Option<DeviceClient>,
    probe: Option<OperationHandle>,
    poll: Option<PollTask>,
    poll_sessions: u64,
    reconcile: Option<OperationHandle>,
}

impl ConnectionState {
    pub fn new(mode: ConnectionMode, address: String, localhost_url: String) -> Self {
        Self {
            status: ConnectionStatus::Disconnected,
            mode,
            address,
            localhost_url,
            base_url: None,
            last_error: None,
            device: DeviceInfo::default(),
            connected_at: None,
            consecutive_poll_failures: 0,
            attempt: 0,
            client: None,
            probe: None,
            poll: None,
            poll_sessions: 0,
            reconcile: None,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.status.is_connected()
    }

    /// Base URL the next `connect()` would probe.
    pub fn target_url(&self) -> Result<Url> {
        base_url_for(self.mode, &self.address, &self.localhost_url)
    }

    /// Client for the connected device.
    pub fn client(&self) -> Option<&DeviceClient> {
        self.client.as_ref()
    }

    /// Client for `url`, reusing the existing connection pool when possible.
    pub fn client_for(&self, url: Url) -> Result<DeviceClient> {
        match &self.client {
            Some(client) => Ok(client.with_base_url(url)),
            None => DeviceClient::new(url),
        }
    }

    pub fn attempt(&self) -> u64 {
        self.attempt
    }

    /// Start a new attempt: stops the poll, cancels any in-flight probe and
    /// moves to `connecting`.
    pub fn begin_attempt(&mut self, url: Url, client: DeviceClient) -> (u64, CancelToken) {
        self.stop_poll();
        self.reconcile = None;
        self.attempt += 1;

        let (handle, cancel) = OperationHandle::new();
        if let Some(previous) = self.probe.replace(handle) {
            debug!("Cancelling probe op {} for new attempt", previous.id());
        }

        self.status = ConnectionStatus::Connecting;
        self.base_url = Some(url);
        self.client = Some(client);
        self.consecutive_poll_failures = 0;
        (self.attempt, cancel)
    }

    /// True when `attempt` is the probe still awaited.
    pub fn is_current_probe(&self, attempt: u64) -> bool {
        self.status == ConnectionStatus::Connecting
            && self.probe.is_some()
            && attempt == self.attempt
    }

    pub fn probe_succeeded(&mut self, device: DeviceInfo) {
        self.probe = None;
        self.status = ConnectionStatus::Connected;
        self.last_error = None;
        self.device = device;
        self.connected_at = Some(Local::now());
        self.consecutive_poll_failures = 0;
    }

    pub fn probe_failed(&mut self, message: String) {
        self.probe = None;
        self.status = ConnectionStatus::Disconnected;
        self.last_error = Some(message);
    }

    /// Leave any state for `disconnected`, cancelling the probe, the poll
    /// and any follow-up status read.
    pub fn disconnect(&mut self, error: Option<String>) {
        self.stop_poll();
        self.probe = None;
        self.reconcile = None;
        self.status = ConnectionStatus::Disconnected;
        self.connected_at = None;
        self.last_error = error;
    }

    // ─────────────────────────────────────────────────────────
    // Poll task ownership
    // ─────────────────────────────────────────────────────────

    /// Register a new poll task, replacing (and stopping) any previous one.
    pub fn start_poll(&mut self) -> (u64, CancelToken) {
        self.poll_sessions += 1;
        let (handle, cancel) = OperationHandle::new();
        self.poll = Some(PollTask {
            session: self.poll_sessions,
            _handle: handle,
        });
        (self.poll_sessions, cancel)
    }

    /// Stop the poll task. Returns true if one was running.
    pub fn stop_poll(&mut self) -> bool {
        self.poll.take().is_some()
    }

    pub fn is_polling(&self) -> bool {
        self.poll.is_some()
    }

    pub fn poll_session(&self) -> Option<u64> {
        self.poll.as_ref().map(|p| p.session)
    }

    // ─────────────────────────────────────────────────────────
    // Follow-up status read
    // ─────────────────────────────────────────────────────────

    pub fn begin_reconcile(&mut self) -> CancelToken {
        let (handle, cancel) = OperationHandle::new();
        self.reconcile = Some(handle);
        cancel
    }

    pub fn is_reconciling(&self) -> bool {
        self.reconcile.is_some()
    }

    /// Settle the follow-up read for `attempt`. False if stale.
    pub fn finish_reconcile(&mut self, attempt: u64) -> bool {
        if attempt != self.attempt || !self.is_connected() {
            return false;
        }
        self.reconcile.take().is_some()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Feedback
// ─────────────────────────────────────────────────────────────────────────────

/// Transient notice shown when an action is rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockedNotice {
    pub reason: String,
    pub at: Instant,
}

/// Most recent servo command failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandFailure {
    pub servo: ServoId,
    pub angle: Angle,
    pub error: DeviceError,
}

/// Monotonic counters used for change detection by the engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counters {
    pub blocked: u64,
    pub command_failures: u64,
    pub poll_failures: u64,
    pub commands_sent: u64,
    /// Entries ever added to the event log
    pub logged: u64,
}

// ─────────────────────────────────────────────────────────────────────────────
// AppState
// ─────────────────────────────────────────────────────────────────────────────

/// Complete application state (the Model in TEA)
#[derive(Debug)]
pub struct AppState {
    pub phase: AppPhase,
    pub ui_mode: UiMode,
    pub settings: Settings,
    /// Where to persist settings (remembered address)
    pub config_path: Option<PathBuf>,
    pub mapper: InputMapper,
    pub arm: ArmState,
    pub connection: ConnectionState,
    pub positions_source: PositionSource,
    /// User-visible event log, bounded by `settings.ui.event_log_size`
    pub logs: VecDeque<LogEntry>,
    /// Address editor buffer
    pub address_input: String,
    pub blocked: Option<BlockedNotice>,
    pub last_command_failure: Option<CommandFailure>,
    pub last_poll_error: Option<DeviceError>,
    pub counters: Counters,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::with_settings(Settings::default(), None)
    }

    pub fn with_settings(settings: Settings, config_path: Option<PathBuf>) -> Self {
        let connection = ConnectionState::new(
            settings.connection.mode,
            settings.connection.address.clone(),
            settings.connection.localhost_url.clone(),
        );
        Self {
            phase: AppPhase::Running,
            ui_mode: UiMode::Normal,
            mapper: InputMapper::from_settings(&settings.control),
            config_path,
            arm: ArmState::default(),
            connection,
            positions_source: PositionSource::Initial,
            logs: VecDeque::new(),
            address_input: String::new(),
            blocked: None,
            last_command_failure: None,
            last_poll_error: None,
            counters: Counters::default(),
            settings,
        }
    }

    pub fn should_quit(&self) -> bool {
        self.phase == AppPhase::Quitting
    }

    /// Commands may be sent only while powered and connected.
    pub fn can_send_commands(&self) -> bool {
        self.arm.power && self.connection.is_connected() && self.connection.client().is_some()
    }

    pub fn add_log(&mut self, entry: LogEntry) {
        let max = self.settings.ui.event_log_size.max(1);
        while self.logs.len() >= max {
            self.logs.pop_front();
        }
        self.logs.push_back(entry);
        self.counters.logged += 1;
    }

    pub fn log_info(&mut self, source: LogSource, message: impl Into<String>) {
        self.add_log(LogEntry::info(source, message));
    }

    pub fn log_warn(&mut self, source: LogSource, message: impl Into<String>) {
        self.add_log(LogEntry::warn(source, message));
    }

    pub fn log_error(&mut self, source: LogSource, message: impl Into<String>) {
        self.add_log(LogEntry::error(source, message));
    }

    /// Record a rejected action for feedback.
    pub fn block(&mut self, reason: impl Into<String>) {
        let reason = reason.into();
        debug!("Input blocked: {}", reason);
        self.counters.blocked += 1;
        self.blocked = Some(BlockedNotice {
            reason,
            at: Instant::now(),
        });
    }

    /// Drop the blocked notice once it has been visible long enough.
    pub fn expire_notices(&mut self, now: Instant) {
        if let Some(notice) = &self.blocked {
            if now.saturating_duration_since(notice.at) >= BLOCKED_NOTICE_TTL {
                self.blocked = None;
            }
        }
    }

    /// Cancel every outstanding device operation (poll, probe, commands).
    pub fn cancel_all_operations(&mut self) {
        let cancelled = self.arm.cancel_all_commands();
        if cancelled > 0 {
            debug!("Cancelled {} pending servo command(s)", cancelled);
        }
        if self.connection.stop_poll() {
            debug!("Status poll stopped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url() -> Url {
        Url::parse("http://127.0.0.1:9/").unwrap()
    }

    #[test]
    fn test_initial_state() {
        let state = AppState::new();
        assert!(!state.arm.power);
        assert_eq!(state.arm.positions, ServoPositions::neutral());
        assert_eq!(state.connection.status, ConnectionStatus::Disconnected);
        assert_eq!(state.connection.address, "192.168.4.1");
        assert!(!state.can_send_commands());
    }

    #[test]
    fn test_begin_command_supersedes_previous() {
        let mut arm = ArmState::default();
        let (first, first_cancel) = arm.begin_command(ServoId::Base, Angle::from_degrees(45));
        let (second, second_cancel) = arm.begin_command(ServoId::Base, Angle::from_degrees(60));

        assert!(second > first);
        assert!(first_cancel.is_cancelled());
        assert!(!second_cancel.is_cancelled());
        assert_eq!(arm.pending_count(), 1);

        assert!(arm.complete_command(ServoId::Base, first).is_none());
        let settled = arm.complete_command(ServoId::Base, second).unwrap();
        assert_eq!(settled.angle, Angle::from_degrees(60));
        assert!(!arm.is_pending(ServoId::Base));
    }

    #[test]
    fn test_generations_are_per_servo() {
        let mut arm = ArmState::default();
        arm.begin_command(ServoId::Base, Angle::NEUTRAL);
        arm.begin_command(ServoId::Base, Angle::NEUTRAL);
        arm.begin_command(ServoId::Elbow, Angle::NEUTRAL);

        assert_eq!(arm.generation(ServoId::Base), 2);
        assert_eq!(arm.generation(ServoId::Elbow), 1);
        assert_eq!(arm.generation(ServoId::Gripper), 0);
        assert_eq!(arm.pending_count(), 2);
    }

    #[test]
    fn test_cancel_all_commands() {
        let mut arm = ArmState::default();
        let (_, base) = arm.begin_command(ServoId::Base, Angle::NEUTRAL);
        let (_, gripper) = arm.begin_command(ServoId::Gripper, Angle::MAX);

        assert_eq!(arm.cancel_all_commands(), 2);
        assert!(base.is_cancelled());
        assert!(gripper.is_cancelled());
        assert_eq!(arm.pending_count(), 0);
    }

    #[test]
    fn test_reconcile_skips_pending_servos() {
        let mut arm = ArmState::default();
        arm.positions.set(ServoId::Base, Angle::from_degrees(60));
        arm.begin_command(ServoId::Base, Angle::from_degrees(60));

        let mut reported = ServoPositions::neutral();
        reported.set(ServoId::Base, Angle::from_degrees(45));
        reported.set(ServoId::Elbow, Angle::from_degrees(10));

        assert!(arm.reconcile(&reported));
        assert_eq!(arm.positions.base, Angle::from_degrees(60));
        assert_eq!(arm.positions.elbow, Angle::from_degrees(10));
        assert!(!arm.reconcile(&reported));
    }

    #[test]
    fn test_connection_attempt_lifecycle() {
        let mut conn = ConnectionState::new(
            ConnectionMode::Wifi,
            "127.0.0.1:9".into(),
            "http://localhost:3000".into(),
        );
        let client = conn.client_for(url()).unwrap();
        let (attempt, cancel) = conn.begin_attempt(url(), client);

        assert_eq!(conn.status, ConnectionStatus::Connecting);
        assert!(conn.is_current_probe(attempt));
        assert!(!conn.is_current_probe(attempt + 1));

        conn.probe_succeeded(DeviceInfo::default());
        assert!(conn.is_connected());
        assert!(!conn.is_current_probe(attempt));
        assert!(cancel.is_cancelled(), "settled probe handle is released");
    }

    #[test]
    fn test_new_attempt_cancels_probe_and_poll() {
        let mut conn = ConnectionState::new(ConnectionMode::Localhost, String::new(), "http://localhost:3000".into());
        let client = conn.client_for(url()).unwrap();
        let (_, first_probe) = conn.begin_attempt(url(), client.clone());
        conn.probe_succeeded(DeviceInfo::default());
        let (_, poll) = conn.start_poll();

        let (_, _second_probe) = conn.begin_attempt(url(), client);
        assert!(first_probe.is_cancelled());
        assert!(poll.is_cancelled());
        assert!(!conn.is_polling());
        assert_eq!(conn.status, ConnectionStatus::Connecting);
    }

    #[test]
    fn test_poll_sessions_increase() {
        let mut conn = ConnectionState::new(ConnectionMode::Wifi, "a".into(), "b".into());
        let (first, first_cancel) = conn.start_poll();
        let (second, _) = conn.start_poll();
        assert!(second > first);
        assert!(first_cancel.is_cancelled());
        assert_eq!(conn.poll_session(), Some(second));
        assert!(conn.stop_poll());
        assert!(!conn.stop_poll());
    }

    #[test]
    fn test_disconnect_clears_everything() {
        let mut conn = ConnectionState::new(ConnectionMode::Wifi, "a".into(), "b".into());
        let (_, poll) = conn.start_poll();
        conn.disconnect(Some("Lost connection".into()));
        assert!(poll.is_cancelled());
        assert_eq!(conn.status, ConnectionStatus::Disconnected);
        assert_eq!(conn.last_error.as_deref(), Some("Lost connection"));
    }

    #[test]
    fn test_log_is_bounded() {
        let mut state = AppState::new();
        state.settings.ui.event_log_size = 3;
        for i in 0..5 {
            state.log_info(LogSource::App, format!("entry {}", i));
        }
        assert_eq!(state.logs.len(), 3);
        assert_eq!(state.logs.front().unwrap().message, "entry 2");
    }

    #[test]
    fn test_blocked_notice_expires() {
        let mut state = AppState::new();
        state.block("Power is off");
        let at = state.blocked.as_ref().unwrap().at;

        state.expire_notices(at + Duration::from_millis(500));
        assert!(state.blocked.is_some());

        state.expire_notices(at + BLOCKED_NOTICE_TTL);
        assert!(state.blocked.is_none());
        assert_eq!(state.counters.blocked, 1);
    }
}
