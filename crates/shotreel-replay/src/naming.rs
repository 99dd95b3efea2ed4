//! Screenshot filenames: `<running:03>_<event:04>_<label>.png`

use crate::events::sanitize_label;
use std::path::PathBuf;

/// Hands out capture paths for one session. The running index advances on
/// every request, whether or not the capture later succeeds.
#[derive(Debug)]
pub struct CaptureNamer {
    dir: PathBuf,
    next: u32,
}

impl CaptureNamer {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            next: 0,
        }
    }

    /// Number of names handed out so far.
    pub fn issued(&self) -> u32 {
        self.next
    }

    /// Reserve the next name. Returns the running index and the full path.
    pub fn next_path(&mut self, event_index: usize, label: &str) -> (u32, PathBuf) {
        let index = self.next;
        self.next += 1;
        (index, self.dir.join(file_name(index, event_index, label)))
    }
}

pub fn file_name(running: u32, event_index: usize, label: &str) -> String {
    format!("{:03}_{:04}_{}.png", running, event_index, sanitize_label(label))
}

/// Label of a stealth frame taken `elapsed_ms` after session start.
pub fn stealth_label(elapsed_ms: u64) -> String {
    format!("stealth_{:07}ms", elapsed_ms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn formats_names() {
        assert_eq!(file_name(0, 0, "after_launch"), "000_0000_after_launch.png");
        assert_eq!(file_name(12, 345, "mouse press/left"), "012_0345_mouse_press_left.png");
        assert_eq!(stealth_label(1200), "stealth_0001200ms");
    }

    #[test]
    fn running_index_increments() {
        let mut namer = CaptureNamer::new("/tmp/out");
        let (a, pa) = namer.next_path(0, "after_launch");
        let (b, pb) = namer.next_path(0, "mouse_press_left");
        assert_eq!((a, b), (0, 1));
        assert_eq!(pa, Path::new("/tmp/out/000_0000_after_launch.png"));
        assert_eq!(pb, Path::new("/tmp/out/001_0000_mouse_press_left.png"));
        assert_eq!(namer.issued(), 2);
    }
}
