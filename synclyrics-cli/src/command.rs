//! Parsing of the one-line commands typed at the prompt.

use thiserror::Error;

/// A command entered on stdin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Start or pause playback
    TogglePlayback,
    /// Mark the selected row at the current position
    Mark,
    /// Revert the most recent mark
    Undo,
    /// Select a row (0-based; typed 1-based)
    Select(usize),
    /// Seek relative to the current position
    Seek(i64),
    /// Print every row with its range
    List,
    /// Write the output file
    Write,
    /// Write the output file and exit
    Quit,
    /// Show the command list
    Help,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command {0:?}, type \"h\" for help")]
    Unknown(String),

    #[error("Invalid argument for {command:?}: {argument:?}")]
    InvalidArgument { command: String, argument: String },
}

pub const HELP: &str = "\
Commands:
  <enter> | s     mark the selected line at the current position
  p               play / pause
  u               undo the last mark
  j <line>        select a line (1-based)
  +[ms] | -[ms]   seek forward / back (default step from config)
  l               list lines with their time ranges
  w               write the output file
  q               write the output file and quit
  h               show this help";

impl Command {
    /// Parse a prompt line. A bare `+` or `-` seeks by `seek_step_ms`.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError`] for unknown commands or bad arguments.
    pub fn parse(line: &str, seek_step_ms: u64) -> Result<Self, CommandError> {
        let line = line.trim();
        let step = i64::try_from(seek_step_ms).unwrap_or(i64::MAX);

        if let Some(amount) = line.strip_prefix('+') {
            return parse_seek(line, amount, step).map(Self::Seek);
        }
        if let Some(amount) = line.strip_prefix('-') {
            return parse_seek(line, amount, step).map(|ms| Self::Seek(-ms));
        }

        let (name, argument) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(n, a)| (n, a.trim()));

        match name.to_ascii_lowercase().as_str() {
            "" | "s" => Ok(Self::Mark),
            "p" => Ok(Self::TogglePlayback),
            "u" => Ok(Self::Undo),
            "l" => Ok(Self::List),
            "w" => Ok(Self::Write),
            "q" => Ok(Self::Quit),
            "h" | "?" => Ok(Self::Help),
            "j" => argument
                .parse::<usize>()
                .ok()
                .and_then(|line_number| line_number.checked_sub(1))
                .map(Self::Select)
                .ok_or_else(|| CommandError::InvalidArgument {
                    command: name.to_string(),
                    argument: argument.to_string(),
                }),
            _ => Err(CommandError::Unknown(line.to_string())),
        }
    }
}

fn parse_seek(line: &str, amount: &str, default_step: i64) -> Result<i64, CommandError> {
    let amount = amount.trim();
    if amount.is_empty() {
        return Ok(default_step);
    }
    amount
        .parse::<i64>()
        .ok()
        .filter(|ms| *ms >= 0)
        .ok_or_else(|| CommandError::InvalidArgument {
            command: line[..1].to_string(),
            argument: amount.to_string(),
        })
}
