//! armctl-tui - Terminal UI for armctl
//!
//! Renders the engine state with ratatui and turns crossterm key and mouse
//! events into engine messages. The engine itself is created by the binary
//! so that CLI overrides are already applied.

pub mod event;
pub mod layout;
pub mod render;
pub mod runner;
pub mod terminal;
pub mod theme;
pub mod widgets;

#[cfg(test)]
pub mod test_utils;

pub use runner::run;
