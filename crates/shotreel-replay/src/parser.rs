//! Transcript parsing
//!
//! A transcript is line oriented; every line carries an absolute offset in
//! seconds followed by the event body:
//!
//! ```text
//! [ +0.123s ] onMousePressed L: window(100,100) -> world(-16.6,16.6)
//! [ +0.456s ] onKeyPressed D: jump
//! [ +1.200s ] Exiting application
//! ```
//!
//! Parsing is lenient: lines that match nothing are logged and skipped.

use crate::events::{Event, EventKind};
use regex::Regex;
use shotreel_core::{Error, ErrorCode, MouseButton, Point};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("cannot read transcript {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Self {
        let ParseError::Read { path, .. } = &err;
        Error::new(ErrorCode::TranscriptUnreadable, err.to_string())
            .with_suggestions(vec![
                "Check the --script path".to_string(),
                "Transcripts must be UTF-8 text".to_string(),
            ])
            .with_context(serde_json::json!({ "path": path }))
    }
}

/// Why a single line was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LineError {
    #[error("no [ +N.NNNs ] timestamp")]
    MissingTimestamp,
    #[error("mouse event without window(x,y)")]
    MissingWindowCoord,
    #[error("unrecognized event")]
    Unrecognized,
}

struct Patterns {
    stamp: Regex,
    mouse: Regex,
    key: Regex,
    window: Regex,
    world: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        let compile = |re: &str| Regex::new(re).unwrap_or_else(|e| panic!("bad pattern {re}: {e}"));
        Patterns {
            stamp: compile(r"^\[\s*\+(?P<secs>\d+(?:\.\d+)?)s\s*\]\s*(?P<body>.+)$"),
            mouse: compile(
                r"(?i)^onMouse(?P<state>Pressed|Released)\s+(?P<button>[LR]):\s*(?P<details>.*)$",
            ),
            key: compile(r"(?i)^onKey(?P<state>Pressed|Released)\s+(?P<key>[A-Z0-9]):\s*(?P<details>.*)$"),
            window: compile(r"(?i)window\(\s*(?P<x>-?\d+(?:\.\d+)?)\s*,\s*(?P<y>-?\d+(?:\.\d+)?)\s*\)"),
            world: compile(r"(?i)world\(\s*(?P<x>-?\d+(?:\.\d+)?)\s*,\s*(?P<y>-?\d+(?:\.\d+)?)\s*\)"),
        }
    })
}

fn coords(re: &Regex, details: &str) -> Option<(f64, f64)> {
    let caps = re.captures(details)?;
    let x = caps.name("x")?.as_str().parse().ok()?;
    let y = caps.name("y")?.as_str().parse().ok()?;
    Some((x, y))
}

/// Parse one trimmed, non-empty line. The returned event carries `index` 0;
/// the caller assigns sequence positions.
pub fn parse_line(line: &str) -> Result<Event, LineError> {
    let p = patterns();
    let stamp = p.stamp.captures(line).ok_or(LineError::MissingTimestamp)?;
    let offset_seconds: f64 = stamp["secs"]
        .parse()
        .map_err(|_| LineError::MissingTimestamp)?;
    let body = stamp["body"].trim();

    let mut event = Event {
        index: 0,
        offset_seconds,
        kind: EventKind::Exit,
        window_coord: None,
        world_coord: None,
        raw: line.to_string(),
    };

    if let Some(caps) = p.mouse.captures(body) {
        let button = if caps["button"].eq_ignore_ascii_case("l") {
            MouseButton::Left
        } else {
            MouseButton::Right
        };
        let details = &caps["details"];
        let (x, y) = coords(&p.window, details).ok_or(LineError::MissingWindowCoord)?;
        event.window_coord = Some(Point::new(x.round() as i32, y.round() as i32));
        event.world_coord = coords(&p.world, details);
        event.kind = if caps["state"].eq_ignore_ascii_case("pressed") {
            EventKind::MousePress(button)
        } else {
            EventKind::MouseRelease(button)
        };
        return Ok(event);
    }

    if let Some(caps) = p.key.captures(body) {
        let key = caps["key"].to_string();
        event.kind = if caps["state"].eq_ignore_ascii_case("pressed") {
            EventKind::KeyPress(key)
        } else {
            EventKind::KeyRelease(key)
        };
        return Ok(event);
    }

    if body.to_lowercase().contains("exiting application") {
        return Ok(event);
    }

    Err(LineError::Unrecognized)
}

/// A loaded transcript. Holds the text; events are produced on demand.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    source: Option<PathBuf>,
    text: String,
}

impl Transcript {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ParseError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ParseError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), bytes = text.len(), "loaded transcript");
        Ok(Self {
            source: Some(path.to_path_buf()),
            text,
        })
    }

    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            source: None,
            text: text.into(),
        }
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// A fresh pass over the events, in file order.
    pub fn events(&self) -> Events<'_> {
        Events {
            lines: self.text.lines().enumerate(),
            next_index: 0,
            last_offset: 0.0,
            skipped: 0,
        }
    }
}

/// Iterator over the events of a [`Transcript`].
pub struct Events<'a> {
    lines: std::iter::Enumerate<std::str::Lines<'a>>,
    next_index: usize,
    last_offset: f64,
    skipped: usize,
}

impl Events<'_> {
    /// Malformed lines skipped so far.
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

impl Iterator for Events<'_> {
    type Item = Event;

    fn next(&mut self) -> Option<Event> {
        for (line_no, raw) in self.lines.by_ref() {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }
            match parse_line(line) {
                Ok(mut event) => {
                    if event.offset_seconds < self.last_offset {
                        tracing::warn!(
                            line = line_no + 1,
                            offset = event.offset_seconds,
                            previous = self.last_offset,
                            "offset goes backwards, clamping"
                        );
                        event.offset_seconds = self.last_offset;
                    }
                    self.last_offset = event.offset_seconds;
                    event.index = self.next_index;
                    self.next_index += 1;
                    return Some(event);
                }
                Err(e) => {
                    self.skipped += 1;
                    tracing::warn!(line = line_no + 1, text = line, "skipping transcript line: {}", e);
                }
            }
        }
        None
    }
}
