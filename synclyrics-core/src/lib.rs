pub mod config;
pub mod document;
pub mod error;
pub mod lrc;
pub mod paths;
pub mod playback;
pub mod resolver;
pub mod session;
pub mod sync;
pub mod ticker;
pub mod time;
pub mod timestamp;
pub mod undo;

pub use config::{LoggingConfig, OutputConfig, SyncConfig, SyncLyricsConfig, CONFIG_TEMPLATE};

pub use document::{LyricDocument, LyricLine};
pub use error::CoreError;
pub use lrc::LrcMetadata;
pub use paths::{config_dir, config_path, log_file_path, CONFIG_DIR_NAME, CONFIG_FILE_NAME};
pub use playback::PlaybackClock;
pub use resolver::resolve_active;
pub use session::{SyncEvent, SyncSession};
pub use sync::{MarkOutcome, SyncEngine, SyncState};
pub use ticker::ActiveLineTicker;
pub use time::DurationExt;
pub use timestamp::UNSYNCED_PLACEHOLDER;
pub use undo::{UndoEntry, UndoRecord, UndoStack};
