//! Engine - shared orchestration for the TUI and headless runners
//!
//! The Engine owns the TEA state, the message channel, the shutdown signal
//! and the event broadcaster. Frontends feed it messages and render (or
//! serialize) what it exposes.

use std::path::PathBuf;

use tokio::sync::{broadcast, mpsc, watch};
use tracing::{debug, info};

use armctl_core::{ConnectionStatus, ServoPositions};

use crate::config::{self, Settings};
use crate::engine_event::EngineEvent;
use crate::message::Message;
use crate::process;
use crate::signals;
use crate::state::{AppState, Counters};

/// Capacity of the message channel shared by every input source.
const MESSAGE_CHANNEL_CAPACITY: usize = 256;

/// Capacity of the engine event broadcast channel.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Lightweight snapshot of state for change detection.
///
/// Captured before message processing, compared after to detect
/// what changed and emit appropriate EngineEvents.
#[derive(Debug, Clone, PartialEq)]
struct StateSnapshot {
    status: ConnectionStatus,
    power: bool,
    positions: ServoPositions,
    counters: Counters,
}

impl StateSnapshot {
    fn capture(state: &AppState) -> Self {
        Self {
            status: state.connection.status,
            power: state.arm.power,
            positions: state.arm.positions,
            counters: state.counters,
        }
    }
}

/// Orchestration engine for armctl.
pub struct Engine {
    /// TEA application state (the Model)
    pub state: AppState,

    /// Sender half of the unified message channel.
    /// Clone this to give to input sources (signal handler, stdin, terminal).
    pub msg_tx: mpsc::Sender<Message>,

    /// Receiver half of the unified message channel.
    pub msg_rx: mpsc::Receiver<Message>,

    /// Send `true` to stop background tasks.
    pub shutdown_tx: watch::Sender<bool>,

    pub shutdown_rx: watch::Receiver<bool>,

    event_tx: broadcast::Sender<EngineEvent>,
}

impl Engine {
    /// Create an engine with settings from `config_path`.
    ///
    /// A missing config file is created with commented defaults (non-fatal
    /// if that fails). Without a path, built-in defaults are used.
    pub fn new(config_path: Option<PathBuf>) -> Self {
        let settings = config::load_or_init(config_path.as_deref());
        Self::with_settings(settings, config_path)
    }

    /// Create an engine with already-resolved settings (CLI overrides applied).
    ///
    /// Must be called inside a tokio runtime: spawns the signal handler.
    pub fn with_settings(settings: Settings, config_path: Option<PathBuf>) -> Self {
        let state = AppState::with_settings(settings, config_path);
        let (msg_tx, msg_rx) = mpsc::channel::<Message>(MESSAGE_CHANNEL_CAPACITY);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        signals::spawn_signal_handler(msg_tx.clone());

        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Self {
            state,
            msg_tx,
            msg_rx,
            shutdown_tx,
            shutdown_rx,
            event_tx,
        }
    }

    /// Subscribe to engine events.
    ///
    /// A subscriber that falls behind loses the oldest events
    /// (`broadcast::error::RecvError::Lagged`).
    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.event_tx.subscribe()
    }

    /// Process a single message through the TEA update cycle and emit
    /// EngineEvents for whatever changed.
    pub fn process_message(&mut self, msg: Message) {
        let pre = StateSnapshot::capture(&self.state);

        process::process_message(&mut self.state, msg, &self.msg_tx, &self.shutdown_rx);

        let post = StateSnapshot::capture(&self.state);
        if pre != post {
            self.emit_events(&pre, &post);
        }
    }

    /// Drain and process all pending messages from the channel.
    ///
    /// Returns the number of messages processed.
    pub fn drain_pending_messages(&mut self) -> usize {
        let mut count = 0;
        while let Ok(msg) = self.msg_rx.try_recv() {
            self.process_message(msg);
            count += 1;
        }
        count
    }

    /// Wait for the next message. `None` when every sender is gone.
    pub async fn next_message(&mut self) -> Option<Message> {
        self.msg_rx.recv().await
    }

    /// Get a clone of the message sender for spawning input sources.
    pub fn msg_sender(&self) -> mpsc::Sender<Message> {
        self.msg_tx.clone()
    }

    /// Get a clone of the shutdown receiver for background tasks.
    pub fn shutdown_receiver(&self) -> watch::Receiver<bool> {
        self.shutdown_rx.clone()
    }

    pub fn should_quit(&self) -> bool {
        self.state.should_quit()
    }

    /// Cancel every outstanding operation and signal background tasks to stop.
    pub fn shutdown(&mut self) {
        self.emit(EngineEvent::Shutdown);

        self.state.cancel_all_operations();
        if self.state.connection.status != ConnectionStatus::Disconnected {
            self.state.connection.disconnect(None);
        }

        let _ = self.shutdown_tx.send(true);
        info!("Engine shut down");
    }

    fn emit_events(&self, pre: &StateSnapshot, post: &StateSnapshot) {
        let state = &self.state;

        if pre.status != post.status {
            debug!("Connection {} -> {}", pre.status, post.status);
            self.emit(EngineEvent::ConnectionChanged {
                old: pre.status,
                new: post.status,
                mode: state.connection.mode,
                base_url: state.connection.base_url.as_ref().map(|u| u.to_string()),
                error: state.connection.last_error.clone(),
            });
        }

        if pre.power != post.power {
            self.emit(EngineEvent::PowerChanged { power: post.power });
        }

        if pre.positions != post.positions {
            self.emit(EngineEvent::PositionsChanged {
                positions: post.positions,
                source: state.positions_source,
            });
        }

        if post.counters.blocked > pre.counters.blocked {
            if let Some(notice) = &state.blocked {
                self.emit(EngineEvent::InputBlocked {
                    reason: notice.reason.clone(),
                });
            }
        }

        if post.counters.command_failures > pre.counters.command_failures {
            if let Some(failure) = &state.last_command_failure {
                self.emit(EngineEvent::CommandFailed {
                    servo: failure.servo,
                    angle: failure.angle,
                    error: failure.error.clone(),
                });
            }
        }

        if post.counters.poll_failures > pre.counters.poll_failures {
            if let Some(error) = &state.last_poll_error {
                self.emit(EngineEvent::PollFailed {
                    consecutive: state.connection.consecutive_poll_failures,
                    error: error.clone(),
                });
            }
        }

        let new_logs = (post.counters.logged - pre.counters.logged) as usize;
        if new_logs > 0 {
            let skip = state.logs.len().saturating_sub(new_logs);
            for entry in state.logs.iter().skip(skip) {
                self.emit(EngineEvent::LogEntry {
                    entry: entry.clone(),
                });
            }
        }
    }

    /// send() fails only when nobody is subscribed, which is fine.
    fn emit(&self, event: EngineEvent) {
        let _ = self.event_tx.send(event);
    }
}
