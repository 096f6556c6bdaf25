//! Color palette.
//!
//! Named terminal colors only, so the UI follows the user's terminal theme.

use ratatui::style::Color;

// --- Background layers ---
pub const DEEPEST_BG: Color = Color::Black;
pub const CARD_BG: Color = Color::Black;

// --- Borders ---
pub const BORDER_DIM: Color = Color::DarkGray;
pub const BORDER_ACTIVE: Color = Color::Cyan;

// --- Accent ---
pub const ACCENT: Color = Color::Cyan;
pub const CONTRAST_FG: Color = Color::Black;

// --- Text ---
pub const TEXT_PRIMARY: Color = Color::White;
pub const TEXT_SECONDARY: Color = Color::Gray;
pub const TEXT_MUTED: Color = Color::DarkGray;

// --- Status ---
pub const STATUS_GREEN: Color = Color::Green;
pub const STATUS_RED: Color = Color::Red;
pub const STATUS_YELLOW: Color = Color::Yellow;

// --- Gauges ---
pub const GAUGE_FILLED: Color = Color::Cyan;
pub const GAUGE_UNFILLED: Color = Color::DarkGray;

// --- Log level colors ---
pub const LOG_ERROR: Color = Color::Red;
pub const LOG_WARNING: Color = Color::Yellow;
pub const LOG_INFO: Color = Color::Green;
pub const LOG_DEBUG: Color = Color::DarkGray;

// --- Log source colors ---
pub const SOURCE_APP: Color = Color::Magenta;
pub const SOURCE_CONNECTION: Color = Color::Blue;
pub const SOURCE_COMMAND: Color = Color::Cyan;
pub const SOURCE_INPUT: Color = Color::Yellow;
