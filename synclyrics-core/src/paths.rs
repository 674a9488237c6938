//! Path constants for configuration and log files.

use std::path::{Path, PathBuf};

/// The name of the configuration directory under ~/.config/
pub const CONFIG_DIR_NAME: &str = "synclyrics";

/// The name of the main configuration file
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// The name of the log file written when file logging is enabled
pub const LOG_FILE_NAME: &str = "synclyrics.log";

/// Get the configuration directory path (~/.config/synclyrics/)
#[must_use]
pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join(CONFIG_DIR_NAME)
}

/// Get the config file path (~/.config/synclyrics/config.toml)
#[must_use]
pub fn config_path() -> PathBuf {
    config_dir().join(CONFIG_FILE_NAME)
}

/// Get the log file path (`~/.config/synclyrics/synclyrics.log`)
#[must_use]
pub fn log_file_path() -> PathBuf {
    config_dir().join(LOG_FILE_NAME)
}

/// Default output path for a lyrics file: same stem, new extension
#[must_use]
pub fn output_path_for(input: &Path, extension: &str) -> PathBuf {
    input.with_extension(extension.trim_start_matches('.'))
}
