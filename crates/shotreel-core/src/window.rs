//! Window references, geometry and lookup strategies

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Opaque platform id of a top-level window (HWND on Windows, XID on X11).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WindowHandle(pub u64);

impl WindowHandle {
    pub fn id(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:x}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, by: Point) -> Self {
        Self::new(self.x + by.x, self.y + by.y)
    }
}

/// Screen-space rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x
            && p.y >= self.y
            && (p.x as i64) < self.x as i64 + self.width as i64
            && (p.y as i64) < self.y as i64 + self.height as i64
    }

    /// Overlap of two rectangles, `None` when they do not intersect.
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let left = self.x.max(other.x) as i64;
        let top = self.y.max(other.y) as i64;
        let right = (self.x as i64 + self.width as i64).min(other.x as i64 + other.width as i64);
        let bottom =
            (self.y as i64 + self.height as i64).min(other.y as i64 + other.height as i64);
        if right <= left || bottom <= top {
            return None;
        }
        Some(Rect::new(
            left as i32,
            top as i32,
            (right - left) as u32,
            (bottom - top) as u32,
        ))
    }
}

/// One way of locating the target window. Tried in [`WindowStrategy::ORDER`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowStrategy {
    /// Case-insensitive substring of the title (or class on X11).
    Title,
    /// Any top-level window owned by the launched process.
    Process,
    /// First visible, titled top-level window.
    AnyVisible,
}

impl WindowStrategy {
    pub const ORDER: [WindowStrategy; 3] = [
        WindowStrategy::Title,
        WindowStrategy::Process,
        WindowStrategy::AnyVisible,
    ];
}

/// How long the precise strategies get before the any-visible fallback.
pub const ANY_VISIBLE_GRACE: Duration = Duration::from_secs(2);

/// What the session knows about the window it is waiting for.
#[derive(Debug, Clone, Default)]
pub struct WindowQuery {
    pub title_hint: Option<String>,
    pub pid: Option<u32>,
    /// Time the precise strategies must have missed before `AnyVisible` runs.
    pub any_visible_after: Duration,
    /// Time spent waiting so far.
    pub waited: Duration,
}

impl WindowQuery {
    pub fn new(title_hint: Option<String>, pid: Option<u32>) -> Self {
        let title_hint = title_hint.filter(|t| !t.trim().is_empty());
        Self {
            title_hint,
            pid,
            any_visible_after: ANY_VISIBLE_GRACE,
            waited: Duration::ZERO,
        }
    }

    pub fn any_visible_after(mut self, grace: Duration) -> Self {
        self.any_visible_after = grace;
        self
    }

    /// Whether `strategy` can run for this query at all.
    ///
    /// The any-visible fallback only applies when no title hint was given,
    /// and only once the grace period has passed.
    pub fn allows(&self, strategy: WindowStrategy) -> bool {
        match strategy {
            WindowStrategy::Title => self.title_hint.is_some(),
            WindowStrategy::Process => self.pid.is_some(),
            WindowStrategy::AnyVisible => {
                self.title_hint.is_none() && self.waited >= self.any_visible_after
            }
        }
    }

    /// Whether a window owned by `owner` may belong to the target. Without a
    /// known pid any owner is accepted.
    pub fn owner_matches(&self, owner: Option<u32>) -> bool {
        match self.pid {
            Some(pid) => owner == Some(pid),
            None => true,
        }
    }

    /// Title match restricted to the target's own windows.
    pub fn target_title_matches(&self, candidate: &str, owner: Option<u32>) -> bool {
        self.owner_matches(owner) && self.title_matches(candidate)
    }

    pub fn title_matches(&self, candidate: &str) -> bool {
        match &self.title_hint {
            Some(hint) => candidate.to_lowercase().contains(&hint.to_lowercase()),
            None => false,
        }
    }
}

/// Titles belonging to desktop chrome rather than applications.
const SYSTEM_TITLES: [&str; 6] = ["desktop", "panel", "taskbar", "menu", "system", "root"];

/// Heuristic used by the any-visible fallback.
pub fn is_system_title(title: &str) -> bool {
    let lower = title.to_lowercase();
    SYSTEM_TITLES.iter().any(|s| lower.contains(s))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_hint_is_no_hint() {
        let mut q = WindowQuery::new(Some("  ".to_string()), Some(7));
        assert!(q.title_hint.is_none());
        assert!(!q.allows(WindowStrategy::Title));
        assert!(q.allows(WindowStrategy::Process));
        assert!(!q.allows(WindowStrategy::AnyVisible));

        q.waited = ANY_VISIBLE_GRACE;
        assert!(q.allows(WindowStrategy::AnyVisible));
    }

    #[test]
    fn any_visible_waits_for_grace() {
        let mut q = WindowQuery::new(None, Some(7)).any_visible_after(Duration::from_millis(500));
        q.waited = Duration::from_millis(499);
        assert!(!q.allows(WindowStrategy::AnyVisible));
        q.waited = Duration::from_millis(500);
        assert!(q.allows(WindowStrategy::AnyVisible));
    }

    #[test]
    fn title_match_is_scoped_to_target() {
        let q = WindowQuery::new(Some("Grafika".to_string()), Some(7));
        assert!(q.target_title_matches("Grafika demo", Some(7)));
        // a console whose title carries the command line
        assert!(!q.target_title_matches("cmd - sr.exe --window-title Grafika", Some(99)));
        assert!(!q.target_title_matches("Grafika demo", None));

        let unscoped = WindowQuery::new(Some("Grafika".to_string()), None);
        assert!(unscoped.target_title_matches("Grafika demo", Some(99)));
    }

    #[test]
    fn hint_disables_any_visible() {
        let q = WindowQuery::new(Some("Demo".to_string()), None);
        assert!(q.allows(WindowStrategy::Title));
        assert!(!q.allows(WindowStrategy::Process));
        assert!(!q.allows(WindowStrategy::AnyVisible));
        assert!(q.title_matches("OpenGL demo - v2"));
        assert!(!q.title_matches("Terminal"));
    }

    #[test]
    fn rect_intersection() {
        let screen = Rect::new(0, 0, 1920, 1080);
        let win = Rect::new(1800, 1000, 400, 300);
        assert_eq!(screen.intersect(&win), Some(Rect::new(1800, 1000, 120, 80)));
        assert_eq!(screen.intersect(&Rect::new(2000, 0, 10, 10)), None);
        assert!(screen.contains(Point::new(1919, 1079)));
        assert!(!screen.contains(Point::new(1920, 0)));
    }

    #[test]
    fn system_titles() {
        assert!(is_system_title("xfce4-panel"));
        assert!(is_system_title("Desktop"));
        assert!(!is_system_title("Triangle Test"));
    }
}
