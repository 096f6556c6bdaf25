//! Semantic style builders.

use armctl_core::{ConnectionStatus, LogLevel, LogSource};
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, BorderType, Borders};

use super::palette;

// --- Text styles ---
pub fn text_primary() -> Style {
    Style::default().fg(palette::TEXT_PRIMARY)
}

pub fn text_secondary() -> Style {
    Style::default().fg(palette::TEXT_SECONDARY)
}

pub fn text_muted() -> Style {
    Style::default().fg(palette::TEXT_MUTED)
}

// --- Border styles ---
pub fn border_inactive() -> Style {
    Style::default().fg(palette::BORDER_DIM)
}

pub fn border_active() -> Style {
    Style::default().fg(palette::BORDER_ACTIVE)
}

// --- Accent styles ---
pub fn accent() -> Style {
    Style::default().fg(palette::ACCENT)
}

pub fn accent_bold() -> Style {
    Style::default()
        .fg(palette::ACCENT)
        .add_modifier(Modifier::BOLD)
}

// --- Status styles ---
pub fn status_green() -> Style {
    Style::default().fg(palette::STATUS_GREEN)
}

pub fn status_red() -> Style {
    Style::default().fg(palette::STATUS_RED)
}

pub fn status_yellow() -> Style {
    Style::default().fg(palette::STATUS_YELLOW)
}

// --- Keybinding hint style ---
pub fn keybinding() -> Style {
    Style::default().fg(palette::STATUS_YELLOW)
}

/// "Black on Cyan" - active D-pad arrow, joystick knob
pub fn focused_selected() -> Style {
    Style::default()
        .fg(palette::CONTRAST_FG)
        .bg(palette::ACCENT)
        .add_modifier(Modifier::BOLD)
}

// --- Block builders ---
pub fn glass_block(focused: bool) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(if focused {
            border_active()
        } else {
            border_inactive()
        })
        .style(Style::default().bg(palette::CARD_BG))
}

/// Returns (icon, label, style) for a connection status.
pub fn connection_indicator(status: ConnectionStatus) -> (&'static str, &'static str, Style) {
    match status {
        ConnectionStatus::Disconnected => ("○", "Disconnected", status_red()),
        ConnectionStatus::Connecting => ("◐", "Connecting", status_yellow()),
        ConnectionStatus::Connected => ("●", "Connected", status_green()),
    }
}

pub fn power_indicator(power: bool) -> (&'static str, &'static str, Style) {
    if power {
        ("⏻", "Power ON", status_green().add_modifier(Modifier::BOLD))
    } else {
        ("⏻", "Power OFF", text_muted())
    }
}

pub fn log_level(level: LogLevel) -> Style {
    let color = match level {
        LogLevel::Error => palette::LOG_ERROR,
        LogLevel::Warning => palette::LOG_WARNING,
        LogLevel::Info => palette::LOG_INFO,
        LogLevel::Debug => palette::LOG_DEBUG,
    };
    Style::default().fg(color)
}

pub fn log_source(source: LogSource) -> Style {
    let color = match source {
        LogSource::App => palette::SOURCE_APP,
        LogSource::Connection => palette::SOURCE_CONNECTION,
        LogSource::Command => palette::SOURCE_COMMAND,
        LogSource::Input => palette::SOURCE_INPUT,
    };
    Style::default().fg(color)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_indicator_labels() {
        assert_eq!(
            connection_indicator(ConnectionStatus::Connected).1,
            "Connected"
        );
        assert_eq!(
            connection_indicator(ConnectionStatus::Connecting).1,
            "Connecting"
        );
        assert_eq!(
            connection_indicator(ConnectionStatus::Disconnected).2,
            status_red()
        );
    }

    #[test]
    fn test_power_indicator() {
        assert_eq!(power_indicator(true).1, "Power ON");
        assert_eq!(power_indicator(false).1, "Power OFF");
        assert_eq!(power_indicator(false).2, text_muted());
    }

    #[test]
    fn test_log_level_colors() {
        assert_eq!(log_level(LogLevel::Error).fg, Some(palette::LOG_ERROR));
        assert_eq!(log_level(LogLevel::Info).fg, Some(palette::LOG_INFO));
    }
}
