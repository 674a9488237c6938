//! Interactive sync loop: stdin commands in, highlighted lines out.

use crate::command::{Command, HELP};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use synclyrics_core::lrc::{self, LrcMetadata};
use synclyrics_core::{
    ActiveLineTicker, CoreError, LyricDocument, PlaybackClock, SyncEvent, SyncLyricsConfig,
    SyncSession,
};
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("No lyric lines found in {path}")]
    EmptyLyrics { path: PathBuf },

    #[error("Failed to read {path}: {source}")]
    ReadLyrics {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    WriteOutput {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Inputs resolved from the command line
#[derive(Debug, Clone)]
pub struct AppOptions {
    pub lyrics_path: PathBuf,
    pub output_path: PathBuf,
    /// Treat the input as LRC and keep existing timestamps
    pub resume: bool,
    /// Track length, if known
    pub duration: Option<Duration>,
}

/// Run one sync session until quit, end of input, or cancellation
pub async fn run(
    options: AppOptions,
    config: SyncLyricsConfig,
    cancel_token: CancellationToken,
) -> Result<(), AppError> {
    let document = load_document(&options.lyrics_path, options.resume).await?;
    let texts: Arc<Vec<String>> = Arc::new(document.lines().map(|l| l.text().to_string()).collect());

    let mut clock = PlaybackClock::new();
    if let Some(duration) = options.duration {
        clock = clock.with_duration(duration);
    }
    let session = SyncSession::new(document, clock);
    let metadata = config.output.metadata();

    let ticker = Arc::new(ActiveLineTicker::new(
        Arc::clone(&session),
        Duration::from_millis(config.sync.poll_interval_ms),
        Some(cancel_token.child_token()),
    ));
    let ticker_cancel = ticker.cancel_token();
    let ticker_handle = ticker.start();

    let display_handle = spawn_display(&session, Arc::clone(&texts), cancel_token.child_token());

    println!("{HELP}");
    print_lines(&session.document().await, session.selected_row().await);

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            () = cancel_token.cancelled() => {
                info!("Cancelled, saving and shutting down");
                break;
            }
            line = stdin.next_line() => line?,
        };

        let Some(line) = line else {
            info!("End of input, saving and shutting down");
            break;
        };

        let command = match Command::parse(&line, config.sync.seek_step_ms) {
            Ok(command) => command,
            Err(e) => {
                println!("{e}");
                continue;
            }
        };

        if !handle_command(command, &session, &texts, &options.output_path, &metadata).await? {
            break;
        }
    }

    write_output(&session, &options.output_path, &metadata).await?;

    ticker_cancel.cancel();
    cancel_token.cancel();
    let _ = ticker_handle.await;
    let _ = display_handle.await;

    Ok(())
}

/// Read the lyrics file as plain text or, when resuming, as LRC
async fn load_document(path: &Path, resume: bool) -> Result<LyricDocument, AppError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| AppError::ReadLyrics {
            path: path.to_path_buf(),
            source,
        })?;

    let document = if resume {
        lrc::parse_lrc(&content)
    } else {
        LyricDocument::from_text(&content)
    };

    if document.is_empty() {
        return Err(AppError::EmptyLyrics {
            path: path.to_path_buf(),
        });
    }

    info!(
        path = %path.display(),
        lines = document.line_count(),
        synced = document.synced_count(),
        "Loaded lyrics"
    );
    Ok(document)
}

/// Apply one command; returns `false` when the session should end
async fn handle_command(
    command: Command,
    session: &SyncSession,
    texts: &[String],
    output_path: &Path,
    metadata: &LrcMetadata,
) -> Result<bool, AppError> {
    match command {
        Command::TogglePlayback => {
            let playing = session.toggle_playback().await;
            let label = if playing { "Playing" } else { "Paused" };
            println!("{label} at {}", format_position(session.position_ms().await));
        }
        Command::Mark => match session.mark_selected().await {
            Some(outcome) => {
                if let Some((prev, range)) = &outcome.previous {
                    println!("  {:>4}  {range}  {}", prev + 1, text_at(texts, *prev));
                }
                println!(
                    "* {:>4}  {}  {}",
                    outcome.row + 1,
                    outcome.range,
                    text_at(texts, outcome.row)
                );
            }
            None if !session.is_playing().await => println!("Start playback with \"p\" first"),
            None => println!("No line selected; use \"j <line>\" or \"u\""),
        },
        Command::Undo => match session.undo().await {
            Some(row) => println!("Undid line {}: {}", row + 1, text_at(texts, row)),
            None => println!("Nothing to undo"),
        },
        Command::Select(row) => {
            if session.select(row).await {
                println!("Selected line {}: {}", row + 1, text_at(texts, row));
            } else {
                println!("No line {}", row + 1);
            }
        }
        Command::Seek(offset_ms) => {
            let position_ms = session.seek_by(offset_ms).await;
            println!("Position {}", format_position(position_ms));
        }
        Command::List => {
            print_lines(&session.document().await, session.selected_row().await);
        }
        Command::Write => write_output(session, output_path, metadata).await?,
        Command::Help => println!("{HELP}"),
        Command::Quit => return Ok(false),
    }
    Ok(true)
}

/// Print highlight changes as the ticker reports them
fn spawn_display(
    session: &SyncSession,
    texts: Arc<Vec<String>>,
    cancel_token: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    let mut rx = session.subscribe();
    tokio::spawn(async move {
        loop {
            let event = tokio::select! {
                () = cancel_token.cancelled() => break,
                event = rx.recv() => event,
            };
            match event {
                Ok(SyncEvent::ActiveLineChanged {
                    row: Some(row),
                    position_ms,
                }) => {
                    println!(
                        "> {:>4}  {}  {}",
                        row + 1,
                        format_position(position_ms),
                        text_at(&texts, row)
                    );
                }
                Ok(event) => debug!(?event, "Session event"),
                Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Display fell behind session events");
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

/// Save the session as LRC.
///
/// Unsynced lines are kept as bare text, so the file can be resumed with
/// `--resume` even when it is also the input. Nothing is written before
/// the first mark, so an existing file is never replaced by an empty one.
async fn write_output(
    session: &SyncSession,
    path: &Path,
    metadata: &LrcMetadata,
) -> Result<(), AppError> {
    let document = session.document().await;
    let synced = document.synced_count();
    let total = document.line_count();

    if synced == 0 {
        debug!(path = %path.display(), "No synced lines, skipping write");
        println!("Nothing synced yet; {} left unchanged", path.display());
        return Ok(());
    }

    let text = lrc::serialize_draft(&document, metadata);
    tokio::fs::write(path, &text)
        .await
        .map_err(|source| AppError::WriteOutput {
            path: path.to_path_buf(),
            source,
        })?;

    info!(path = %path.display(), synced, total, "Wrote lyrics");
    if document.is_fully_synced() {
        println!("Wrote {synced} synced line(s) to {}", path.display());
    } else {
        println!(
            "Wrote {synced} of {total} line(s) to {}; continue with --resume",
            path.display()
        );
    }
    Ok(())
}

fn print_lines(document: &LyricDocument, selected_row: usize) {
    for line in document.lines() {
        let marker = if line.index() == selected_row { '*' } else { ' ' };
        println!(
            "{marker} {:>4}  {:<24}  {}",
            line.index() + 1,
            document.display_range(line.index()),
            line.text()
        );
    }
}

fn text_at(texts: &[String], row: usize) -> &str {
    texts.get(row).map_or("", String::as_str)
}

fn format_position(position_ms: u64) -> String {
    synclyrics_core::timestamp::encode(position_ms)
}
