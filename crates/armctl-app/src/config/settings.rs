//! Settings parser for `<config_dir>/armctl/config.toml`

use super::types::Settings;
use armctl_core::prelude::*;
use std::path::{Path, PathBuf};

const CONFIG_FILENAME: &str = "config.toml";
const APP_DIR: &str = "armctl";

/// Default location of the config file, if the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILENAME))
}

// ─────────────────────────────────────────────────────────────────────────────
// Settings Loading
// ─────────────────────────────────────────────────────────────────────────────

/// Load settings from `config_path`.
///
/// Returns default settings if the file doesn't exist or can't be parsed.
pub fn load_settings(config_path: &Path) -> Settings {
    if !config_path.exists() {
        debug!("No config file at {:?}, using defaults", config_path);
        return Settings::default();
    }

    match std::fs::read_to_string(config_path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(settings) => {
                debug!("Loaded settings from {:?}", config_path);
                settings
            }
            Err(e) => {
                warn!("Failed to parse {:?}: {}", config_path, e);
                Settings::default()
            }
        },
        Err(e) => {
            warn!("Failed to read {:?}: {}", config_path, e);
            Settings::default()
        }
    }
}

/// Settings for an optional config path.
///
/// A missing file is first created with commented defaults (non-fatal if
/// that fails). Without a path, built-in defaults are used.
pub fn load_or_init(config_path: Option<&Path>) -> Settings {
    let Some(path) = config_path else {
        return Settings::default();
    };
    if let Err(e) = init_config_dir(path) {
        warn!("Failed to initialize config file: {}", e);
    }
    load_settings(path)
}

/// Write a commented default config file if none exists.
pub fn init_config_dir(config_path: &Path) -> Result<()> {
    if let Some(dir) = config_path.parent() {
        if !dir.exists() {
            std::fs::create_dir_all(dir)
                .map_err(|e| Error::config(format!("Failed to create config dir: {}", e)))?;
        }
    }

    if !config_path.exists() {
        let default_content = r#"# armctl Configuration

[connection]
mode = "wifi"                           # "wifi" or "localhost"
address = "192.168.4.1"                 # Device address in wifi mode
localhost_url = "http://localhost:3000" # Mock device endpoint
probe_timeout_ms = 5000
request_timeout_ms = 3000
poll_interval_ms = 1000
max_poll_failures = 3                   # 0 = never disconnect on poll failures
reconcile_on_command_failure = false
remember_address = true

[control]
dpad_step = 5
joystick_step = 2.0
joystick_dead_zone = 0.1

[ui]
show_event_log = true
event_log_size = 200
"#;
        std::fs::write(config_path, default_content)
            .map_err(|e| Error::config(format!("Failed to write config.toml: {}", e)))?;
    }

    Ok(())
}

/// Save settings to `config_path`.
///
/// Uses atomic write (temp file + rename).
pub fn save_settings(config_path: &Path, settings: &Settings) -> Result<()> {
    let dir = config_path
        .parent()
        .ok_or_else(|| Error::config(format!("Invalid config path: {:?}", config_path)))?;

    if !dir.as_os_str().is_empty() && !dir.exists() {
        std::fs::create_dir_all(dir)
            .map_err(|e| Error::config(format!("Failed to create config dir: {}", e)))?;
    }

    let temp_path = dir.join(".config.toml.tmp");

    let content = toml::to_string_pretty(settings)
        .map_err(|e| Error::config(format!("Failed to serialize settings: {}", e)))?;
    let full_content = format!("# armctl Configuration\n\n{}", content);

    std::fs::write(&temp_path, &full_content)
        .map_err(|e| Error::config(format!("Failed to write temp file: {}", e)))?;

    std::fs::rename(&temp_path, config_path)
        .map_err(|e| Error::config(format!("Failed to rename temp file: {}", e)))?;

    info!("Saved settings to {:?}", config_path);
    Ok(())
}
