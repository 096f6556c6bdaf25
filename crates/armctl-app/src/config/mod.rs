//! Configuration file handling for armctl
//!
//! Settings live in `<config_dir>/armctl/config.toml` unless a path is given
//! on the command line.

pub mod settings;
pub mod types;

pub use settings::{
    default_config_path, init_config_dir, load_or_init, load_settings, save_settings,
};
pub use types::*;
