use crate::document::LyricDocument;
use crate::time;
use crate::timestamp;
use tracing::{debug, warn};

/// Optional LRC ID tags written above the timed lines
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LrcMetadata {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub author: Option<String>,
}

impl LrcMetadata {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tags().next().is_none()
    }

    /// `(tag, value)` pairs for every set field, in header order
    fn tags(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            ("ti", self.title.as_deref()),
            ("ar", self.artist.as_deref()),
            ("al", self.album.as_deref()),
            ("au", self.author.as_deref()),
        ]
        .into_iter()
        .filter_map(|(tag, value)| Some((tag, value?.trim())))
        .filter(|(_, value)| !value.is_empty())
    }
}

/// Render synced lines as `[mm:ss.cc]text`, one per line.
///
/// Unsynced lines are left out, so a partially synced document produces
/// partial output. No trailing newline is written.
#[must_use]
pub fn serialize(document: &LyricDocument) -> String {
    document
        .lines()
        .filter_map(|line| {
            line.start_ms()
                .map(|ms| format!("{}{}", timestamp::encode(ms), line.text()))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Like [`serialize`], preceded by one `[tag:value]` line per set field
#[must_use]
pub fn serialize_with_metadata(document: &LyricDocument, metadata: &LrcMetadata) -> String {
    with_header(metadata, serialize(document))
}

/// Render every line in document order: synced lines as `[mm:ss.cc]text`,
/// unsynced lines as bare text.
///
/// Unlike [`serialize`] nothing is dropped, so [`parse_lrc`] reads the
/// result back into the same lines. A fully synced document renders the
/// same as [`serialize_with_metadata`].
#[must_use]
pub fn serialize_draft(document: &LyricDocument, metadata: &LrcMetadata) -> String {
    let body = document
        .lines()
        .map(|line| match line.start_ms() {
            Some(ms) => format!("{}{}", timestamp::encode(ms), line.text()),
            None => line.text().to_string(),
        })
        .collect::<Vec<_>>()
        .join("\n");
    with_header(metadata, body)
}

fn with_header(metadata: &LrcMetadata, body: String) -> String {
    let mut out: Vec<String> = metadata
        .tags()
        .map(|(tag, value)| format!("[{tag}:{value}]"))
        .collect();
    if !body.is_empty() {
        out.push(body);
    }
    out.join("\n")
}

/// Split plain text into trimmed, non-blank lines
#[must_use]
pub fn parse(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Re-import LRC text so an interrupted session can pick up where it left off.
///
/// Lines with leading `[mm:ss.cc]` tokens become synced lines, one per token
/// when several share the same text. ID tags are skipped except `[offset:]`,
/// which shifts every start by its (signed) millisecond value. Any other text
/// becomes an unsynced line. File order is kept.
#[must_use]
pub fn parse_lrc(text: &str) -> LyricDocument {
    let mut offset_ms: i64 = 0;
    let mut lines: Vec<(String, Option<u64>)> = Vec::new();

    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        if let Some((tag, value)) = parse_id_tag(line) {
            if tag.eq_ignore_ascii_case("offset") {
                match value.trim().parse::<i64>() {
                    Ok(ms) => offset_ms = ms,
                    Err(_) => warn!(value, "Ignoring malformed offset tag"),
                }
            }
            continue;
        }

        let (starts, rest) = split_timestamps(line);
        if starts.is_empty() {
            lines.push((line.to_string(), None));
            continue;
        }

        let text = rest.trim();
        if text.is_empty() {
            continue;
        }
        lines.extend(starts.into_iter().map(|start| (text.to_string(), Some(start))));
    }

    if offset_ms != 0 {
        debug!(offset_ms, "Applying LRC offset");
        for start in lines.iter_mut().filter_map(|(_, start)| start.as_mut()) {
            *start = time::offset_position(*start, offset_ms);
        }
    }

    LyricDocument::from_timed(lines)
}

/// Split an ID tag like `[ti:Title]` into `("ti", "Title")`
fn parse_id_tag(line: &str) -> Option<(&str, &str)> {
    let (content, _) = line.strip_prefix('[')?.split_once(']')?;
    let (tag, value) = content.split_once(':')?;

    // A numeric tag part is a timestamp, not an ID tag
    (!tag.is_empty() && !tag.chars().all(|c| c.is_ascii_digit())).then_some((tag, value))
}

/// Strip every leading `[mm:ss.cc]` token, returning their starts and the rest
fn split_timestamps(line: &str) -> (Vec<u64>, &str) {
    let mut starts = Vec::new();
    let mut rest = line;

    while let Some((token, tail)) = rest
        .strip_prefix('[')
        .and_then(|inner| inner.split_once(']'))
    {
        match timestamp::decode_strict(token) {
            Ok(ms) => {
                starts.push(ms);
                rest = tail;
            }
            Err(e) => {
                if starts.is_empty() {
                    warn!("Treating line as unsynced: {e}");
                }
                break;
            }
        }
    }

    (starts, rest)
}
