//! armctl - Terminal remote control for a four-servo robotic arm
//!
//! Binary entry point: parses the CLI, sets up logging, resolves settings
//! and hands the engine to the TUI or the headless runner.

mod headless;

use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use armctl_app::config::{self, Settings};
use armctl_app::{Engine, Message};
use armctl_core::ConnectionMode;

/// armctl - drive a robotic arm over HTTP from the terminal
#[derive(Parser, Debug)]
#[command(name = "armctl")]
#[command(about = "Terminal remote control for a four-servo robotic arm", long_about = None)]
struct Args {
    /// Connection mode: wifi or localhost
    #[arg(long, value_parser = parse_mode)]
    mode: Option<ConnectionMode>,

    /// Device address used in wifi mode (host or host:port)
    #[arg(long, value_name = "ADDR")]
    address: Option<String>,

    /// Connect to the device on startup
    #[arg(long)]
    connect: bool,

    /// Run in headless mode (stdin commands, JSON events on stdout)
    #[arg(long)]
    headless: bool,

    /// Path to config.toml (default: <config_dir>/armctl/config.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

fn parse_mode(s: &str) -> Result<ConnectionMode, String> {
    ConnectionMode::parse(s).ok_or_else(|| format!("invalid mode '{}': use wifi or localhost", s))
}

/// Command-line flags take precedence over the config file.
fn apply_overrides(settings: &mut Settings, args: &Args) {
    if let Some(mode) = args.mode {
        settings.connection.mode = mode;
    }
    if let Some(address) = &args.address {
        settings.connection.address = address.trim().to_string();
    }
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    armctl_core::logging::init()?;

    let config_path = args.config.clone().or_else(config::default_config_path);
    let mut settings = config::load_or_init(config_path.as_deref());
    apply_overrides(&mut settings, &args);
    info!(
        "Settings: mode={}, address={}, headless={}",
        settings.connection.mode, settings.connection.address, args.headless
    );

    let mut engine = Engine::with_settings(settings, config_path);
    if args.connect {
        engine.process_message(Message::Connect);
    }

    if args.headless {
        headless::run_headless(engine).await?;
    } else {
        armctl_tui::run(engine).await?;
    }

    Ok(())
}
