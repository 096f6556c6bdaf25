//! Headless mode runner - main event loop without TUI

use std::io::BufRead;

use tokio::sync::{broadcast, mpsc};
use tracing::{error, info, warn};

use armctl_app::{Engine, EngineEvent};
use armctl_core::prelude::Result;

use super::command::{parse_command, Command};
use super::HeadlessEvent;

/// Capacity of the stdin command channel.
const COMMAND_CHANNEL_CAPACITY: usize = 64;

/// Run in headless mode - output JSON events instead of TUI
pub async fn run_headless(mut engine: Engine) -> Result<()> {
    info!("armctl starting in headless mode");

    let mut events = engine.subscribe();

    let (cmd_tx, cmd_rx) = mpsc::channel::<Command>(COMMAND_CHANNEL_CAPACITY);
    std::thread::spawn(move || read_stdin_commands(cmd_tx));

    // Anything queued before the loop starts (e.g. `--connect`)
    forward_events(&mut events);

    let result = headless_event_loop(&mut engine, cmd_rx, &mut events).await;

    engine.shutdown();
    forward_events(&mut events);

    info!("armctl headless mode exiting");
    result
}

/// Main headless event loop
async fn headless_event_loop(
    engine: &mut Engine,
    mut cmd_rx: mpsc::Receiver<Command>,
    events: &mut broadcast::Receiver<EngineEvent>,
) -> Result<()> {
    let mut stdin_open = true;

    while !engine.should_quit() {
        tokio::select! {
            msg = engine.next_message() => match msg {
                Some(msg) => engine.process_message(msg),
                None => {
                    info!("Message channel closed");
                    break;
                }
            },
            cmd = cmd_rx.recv(), if stdin_open => match cmd {
                Some(Command::Engine(msg)) => engine.process_message(msg),
                Some(Command::Status) => HeadlessEvent::status(&engine.state).emit(),
                None => {
                    // Keep running until quit or a signal; scripts may pipe a
                    // few commands and wait for the results.
                    info!("Stdin closed");
                    stdin_open = false;
                }
            },
        }

        forward_events(events);
    }

    Ok(())
}

/// Write every buffered engine event to stdout.
fn forward_events(events: &mut broadcast::Receiver<EngineEvent>) {
    loop {
        match events.try_recv() {
            Ok(event) => HeadlessEvent::from(&event).emit(),
            Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                warn!("Headless output lagged, {} events dropped", skipped);
                HeadlessEvent::error(format!("{} events dropped", skipped)).emit();
            }
            Err(broadcast::error::TryRecvError::Empty)
            | Err(broadcast::error::TryRecvError::Closed) => break,
        }
    }
}

/// Blocking stdin reader; runs on its own thread.
fn read_stdin_commands(cmd_tx: mpsc::Sender<Command>) {
    let stdin = std::io::stdin();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                error!("Failed to read stdin: {}", e);
                break;
            }
        };

        match parse_command(&line) {
            Ok(Some(command)) => {
                info!("Stdin: {}", line.trim());
                let quit = matches!(
                    &command,
                    Command::Engine(armctl_app::Message::Quit)
                );
                if cmd_tx.blocking_send(command).is_err() || quit {
                    break;
                }
            }
            Ok(None) => {}
            Err(message) => {
                warn!("Rejected stdin command: {}", message);
                HeadlessEvent::error(message).emit();
            }
        }
    }

    info!("Stdin reader exiting");
}
