//! Terminal setup and restoration

use std::io::stdout;

use crossterm::event::{
    DisableMouseCapture, EnableMouseCapture, KeyboardEnhancementFlags,
    PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use crossterm::terminal::supports_keyboard_enhancement;

use armctl_core::prelude::*;

/// Install a panic hook that restores the terminal
pub fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = execute!(stdout(), PopKeyboardEnhancementFlags, DisableMouseCapture);
        ratatui::restore();
        original_hook(panic_info);
    }));
}

/// Enable mouse capture and, where the terminal supports it, key release
/// reporting.
///
/// Returns true when key releases will be reported.
pub fn enable_input_reporting() -> bool {
    if let Err(e) = execute!(stdout(), EnableMouseCapture) {
        warn!("Failed to enable mouse capture: {}", e);
    }

    if !matches!(supports_keyboard_enhancement(), Ok(true)) {
        debug!("Keyboard enhancement unsupported; arrow releases use a timer");
        return false;
    }

    let flags = KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
        | KeyboardEnhancementFlags::REPORT_EVENT_TYPES;
    match execute!(stdout(), PushKeyboardEnhancementFlags(flags)) {
        Ok(()) => true,
        Err(e) => {
            warn!("Failed to enable key release reporting: {}", e);
            false
        }
    }
}

/// Undo [`enable_input_reporting`].
pub fn disable_input_reporting(releases_enabled: bool) {
    if releases_enabled {
        let _ = execute!(stdout(), PopKeyboardEnhancementFlags);
    }
    let _ = execute!(stdout(), DisableMouseCapture);
}
