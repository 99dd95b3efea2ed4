//! Replayable events parsed from an interaction transcript

use serde::{Deserialize, Serialize};
use shotreel_core::{MouseButton, Point};

/// A single recorded interaction. Immutable once parsed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Position in the transcript's event sequence.
    pub index: usize,
    /// Seconds since session start (absolute, not a delta).
    pub offset_seconds: f64,
    pub kind: EventKind,
    /// Client-area pixels; drives pointer placement.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window_coord: Option<Point>,
    /// Scene coordinates; informational only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub world_coord: Option<(f64, f64)>,
    /// Original transcript line.
    pub raw: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum EventKind {
    MousePress(MouseButton),
    MouseRelease(MouseButton),
    KeyPress(String),
    KeyRelease(String),
    Exit,
}

impl EventKind {
    pub fn is_exit(&self) -> bool {
        matches!(self, EventKind::Exit)
    }
}

impl Event {
    /// Human-readable label used in capture filenames, e.g. `mouse_press_left`.
    pub fn label(&self) -> String {
        let raw = match &self.kind {
            EventKind::MousePress(b) => format!("mouse_press_{}", b.name()),
            EventKind::MouseRelease(b) => format!("mouse_release_{}", b.name()),
            EventKind::KeyPress(k) => format!("key_press_{}", k.to_lowercase()),
            EventKind::KeyRelease(k) => format!("key_release_{}", k.to_lowercase()),
            EventKind::Exit => "exit".to_string(),
        };
        sanitize_label(&raw)
    }
}

/// Collapse every run of characters outside `[A-Za-z0-9_]` into `_`.
pub fn sanitize_label(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    let mut in_run = false;
    for c in label.chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            out.push(c);
            in_run = false;
        } else if !in_run {
            out.push('_');
            in_run = true;
        }
    }
    let trimmed = out.trim_matches('_');
    if trimmed.is_empty() {
        "event".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(kind: EventKind) -> Event {
        Event {
            index: 0,
            offset_seconds: 0.0,
            kind,
            window_coord: None,
            world_coord: None,
            raw: String::new(),
        }
    }

    #[test]
    fn labels() {
        assert_eq!(event(EventKind::MousePress(MouseButton::Left)).label(), "mouse_press_left");
        assert_eq!(
            event(EventKind::MouseRelease(MouseButton::Right)).label(),
            "mouse_release_right"
        );
        assert_eq!(event(EventKind::KeyPress("A".into())).label(), "key_press_a");
        assert_eq!(event(EventKind::Exit).label(), "exit");
    }

    #[test]
    fn sanitize_collapses_runs() {
        assert_eq!(sanitize_label("stealth 00120ms!"), "stealth_00120ms");
        assert_eq!(sanitize_label("a--b..c"), "a_b_c");
        assert_eq!(sanitize_label("***"), "event");
    }

    #[test]
    fn exit_kind() {
        assert!(EventKind::Exit.is_exit());
        assert!(!EventKind::KeyPress("A".into()).is_exit());
    }
}
