//! Main TUI runner - terminal lifecycle and event loop

use std::time::Instant;

use ratatui::layout::Rect;

use armctl_app::{Engine, Message};
use armctl_core::prelude::*;
use armctl_core::LogSource;

use crate::event::EventTranslator;
use crate::{event, render, terminal};

/// Run the TUI on an already-configured engine until the user quits or a
/// signal arrives. The engine is shut down before the terminal is restored.
pub async fn run(mut engine: Engine) -> Result<()> {
    terminal::install_panic_hook();

    let mut term = ratatui::init();
    let releases_reported = terminal::enable_input_reporting();
    let mut translator = EventTranslator::new(releases_reported);

    engine
        .state
        .log_info(LogSource::App, "armctl started. Press p to power on, Enter to connect.");

    let result = run_loop(&mut term, &mut engine, &mut translator);
    match &result {
        Err(e) if e.is_fatal() => error!("TUI loop failed: {}", e),
        Err(e) => warn!("TUI loop ended: {}", e),
        Ok(()) => {}
    }

    engine.shutdown();
    terminal::disable_input_reporting(releases_reported);
    ratatui::restore();

    result
}

/// Main event loop
fn run_loop(
    term: &mut ratatui::DefaultTerminal,
    engine: &mut Engine,
    translator: &mut EventTranslator,
) -> Result<()> {
    let mut pad = Rect::default();

    while !engine.should_quit() {
        // Completions from device tasks, signal handler
        engine.drain_pending_messages();
        if engine.should_quit() {
            break;
        }

        term.draw(|frame| pad = render::view(frame, &engine.state).joystick)
            .map_err(|e| Error::terminal(format!("Failed to draw frame: {}", e)))?;

        match event::poll()? {
            Some(terminal_event) => {
                for message in translator.translate(terminal_event, pad, Instant::now()) {
                    engine.process_message(message);
                }
            }
            None => engine.process_message(Message::Tick),
        }

        if let Some(release) = translator.release_due(Instant::now()) {
            engine.process_message(release);
        }
    }

    Ok(())
}
