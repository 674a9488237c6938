mod app;
mod command;

use crate::app::AppOptions;
use clap::Parser;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use synclyrics_core::paths::output_path_for;
use synclyrics_core::{CoreError, SyncLyricsConfig};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Tap along to a song to time each lyric line, then save it as LRC
#[derive(Parser, Debug)]
#[command(name = "synclyrics")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Plain text lyrics, one line per lyric line
    lyrics: PathBuf,

    /// Output file (default: the lyrics path with the configured extension)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Read the input as LRC and keep its timestamps
    #[arg(long)]
    resume: bool,

    /// Track length in seconds; the playback clock stops there
    #[arg(long)]
    duration_secs: Option<u64>,

    /// Config file (default: ~/.config/synclyrics/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Check config for logging.enabled before full config load
    let file_logging_enabled = check_file_logging_enabled(cli.config.as_deref());
    init_tracing(file_logging_enabled);

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let output_path = cli
        .output
        .clone()
        .unwrap_or_else(|| output_path_for(&cli.lyrics, &config.output.extension));

    let options = AppOptions {
        lyrics_path: cli.lyrics,
        output_path,
        resume: cli.resume,
        duration: cli.duration_secs.map(Duration::from_secs),
    };

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            error!("Failed to create tokio runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Create shared cancellation token for graceful shutdown
    let cancel_token = CancellationToken::new();

    // Set up Ctrl+C handler to trigger graceful shutdown
    let ctrlc_token = cancel_token.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        info!("Received Ctrl+C, shutting down gracefully...");
        ctrlc_token.cancel();
    }) {
        error!("Failed to set Ctrl+C handler: {e}");
    }

    let result = runtime.block_on(app::run(options, config, cancel_token));

    // A pending stdin read would otherwise hold the runtime open
    runtime.shutdown_timeout(Duration::from_millis(100));

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// Load the explicit config file, or the default one (creating a template)
fn load_config(path: Option<&Path>) -> Result<SyncLyricsConfig, CoreError> {
    if let Some(path) = path {
        return SyncLyricsConfig::load_from(path);
    }

    match SyncLyricsConfig::load_or_create() {
        Err(CoreError::ConfigNotFound { path }) => {
            info!("Created config template at {}, using defaults", path.display());
            Ok(SyncLyricsConfig::default())
        }
        other => other,
    }
}

fn check_file_logging_enabled(path: Option<&Path>) -> bool {
    // Minimal structs to parse just the logging.enabled field
    #[derive(serde::Deserialize)]
    struct PartialConfig {
        #[serde(default)]
        logging: PartialLoggingConfig,
    }
    #[derive(serde::Deserialize, Default)]
    struct PartialLoggingConfig {
        #[serde(default)]
        enabled: bool,
    }

    let config_path = path.map_or_else(SyncLyricsConfig::config_path, Path::to_path_buf);
    let Ok(content) = std::fs::read_to_string(&config_path) else {
        return false;
    };

    toml::from_str::<PartialConfig>(&content)
        .map(|c| c.logging.enabled)
        .unwrap_or(false)
}

/// Initialize tracing with stderr output and optional file logging
fn init_tracing(file_logging_enabled: bool) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // stdout carries the interactive display
    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    let file_layer = file_logging_enabled
        .then(open_log_file)
        .flatten()
        .map(|file| {
            tracing_subscriber::fmt::layer()
                .with_writer(Arc::new(file))
                .with_ansi(false)
        });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();
}

fn open_log_file() -> Option<File> {
    let log_path = synclyrics_core::paths::log_file_path();
    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    File::create(&log_path)
        .map_err(|e| eprintln!("Failed to create log file at {}: {e}", log_path.display()))
        .ok()
}
