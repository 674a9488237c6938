use crate::error::{CoreError, Result};
use crate::lrc::LrcMetadata;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncLyricsConfig {
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// How often the active line is re-resolved while playing
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
    /// Step used by a bare "+" or "-" seek command
    #[serde(default = "default_seek_step")]
    pub seek_step_ms: u64,
}

const fn default_poll_interval() -> u64 {
    100
}

const fn default_seek_step() -> u64 {
    5000
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval(),
            seek_step_ms: default_seek_step(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_extension")]
    pub extension: String,
    #[serde(default)]
    pub include_metadata: bool,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub author: Option<String>,
}

fn default_extension() -> String {
    "lrc".to_string()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            extension: default_extension(),
            include_metadata: false,
            title: None,
            artist: None,
            album: None,
            author: None,
        }
    }
}

impl OutputConfig {
    /// ID tags to write, or empty metadata when tags are disabled
    #[must_use]
    pub fn metadata(&self) -> LrcMetadata {
        if !self.include_metadata {
            return LrcMetadata::default();
        }
        LrcMetadata {
            title: self.title.clone(),
            artist: self.artist.clone(),
            album: self.album.clone(),
            author: self.author.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Also write logs to the log file in the config directory
    #[serde(default)]
    pub enabled: bool,
}

impl SyncLyricsConfig {
    /// Get the configuration directory path (~/.config/synclyrics/)
    #[must_use]
    pub fn config_dir() -> PathBuf {
        crate::paths::config_dir()
    }

    /// Get the config file path (~/.config/synclyrics/config.toml)
    #[must_use]
    pub fn config_path() -> PathBuf {
        crate::paths::config_path()
    }

    /// Load config from the default location or create a template on first run
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ConfigNotFound`] after writing the template, or an
    /// error if the config file cannot be read, parsed, or validated.
    pub fn load_or_create() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            // Create config directory if it doesn't exist
            if let Some(parent) = config_path.parent() {
                fs::create_dir_all(parent)?;
            }

            fs::write(&config_path, CONFIG_TEMPLATE)?;

            return Err(CoreError::ConfigNotFound { path: config_path });
        }

        Self::load_from(&config_path)
    }

    /// Load config from a specific file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid TOML, or
    /// fails validation.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse and validate config text
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid TOML or fails validation.
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check field values that serde cannot
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ConfigInvalid`] describing the first bad field.
    pub fn validate(&self) -> Result<()> {
        if self.sync.poll_interval_ms == 0 {
            return Err(CoreError::ConfigInvalid {
                message: "sync.poll_interval_ms must be greater than 0".to_string(),
            });
        }
        if self.output.extension.trim_start_matches('.').trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "output.extension must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

pub const CONFIG_TEMPLATE: &str = r##"# SyncLyrics Configuration
# ~/.config/synclyrics/config.toml

[sync]
# How often (ms) the highlighted line is refreshed while playing
poll_interval_ms = 100
# Step (ms) for a bare "+" or "-" seek command
seek_step_ms = 5000

[output]
# Extension of the written lyrics file
extension = "lrc"
# Write [ti:], [ar:], [al:], [au:] tags above the lyrics
include_metadata = false
# title = ""
# artist = ""
# album = ""
# author = ""

[logging]
# Also write logs to ~/.config/synclyrics/synclyrics.log
enabled = false
"##;
