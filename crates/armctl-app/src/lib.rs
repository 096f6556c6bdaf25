//! armctl-app - Application state and orchestration for armctl
//!
//! This crate implements the TEA (The Elm Architecture) pattern for the arm
//! controller: [`Message`] in, [`handler::update`] mutates [`AppState`],
//! [`UpdateAction`]s are spawned as cancellable device operations whose
//! results come back as messages. The [`Engine`] wires the loop together for
//! both the TUI and the headless runner.

pub mod actions;
pub mod config;
pub mod engine;
pub mod engine_event;
pub mod handler;
pub mod input;
pub mod input_key;
pub mod message;
pub mod process;
pub mod signals;
pub mod state;

// Re-export primary types
pub use engine::Engine;
pub use engine_event::EngineEvent;
pub use handler::{ServoCommand, UpdateAction, UpdateResult};
pub use input::{ArmInput, InputMapper};
pub use message::Message;
pub use state::{AppState, PositionSource, UiMode};
