//! Matched frames across two runs and an optional diff directory

use crate::error::Result;
use crate::frames;
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FramePair {
    pub name: String,
    pub first: PathBuf,
    pub second: PathBuf,
    pub diff: Option<PathBuf>,
}

/// Frames whose names appear in both `first` and `second`, sorted by name.
/// A diff frame is attached when `diff_dir` holds either the same name or
/// its `_diff` counterpart.
pub fn inventory(first: &Path, second: &Path, diff_dir: Option<&Path>) -> Result<Vec<FramePair>> {
    let pairing = frames::pair(first, second)?;

    let diffs = match diff_dir {
        Some(dir) if dir.is_dir() => frames::collect(dir)?,
        Some(dir) => {
            tracing::warn!(dir = %dir.display(), "diff directory not found, ignoring");
            Default::default()
        }
        None => Default::default(),
    };

    Ok(pairing
        .shared
        .into_iter()
        .map(|(name, first, second)| {
            let diff = diffs
                .get(&frames::diff_name(&name))
                .or_else(|| diffs.get(&name))
                .cloned();
            FramePair {
                name,
                first,
                second,
                diff,
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attaches_diff_frames() {
        let a = tempfile::tempdir().unwrap();
        let b = tempfile::tempdir().unwrap();
        let d = tempfile::tempdir().unwrap();
        for dir in [a.path(), b.path()] {
            std::fs::write(dir.join("000_0000_after_launch.png"), b"").unwrap();
            std::fs::write(dir.join("001_0000_exit.png"), b"").unwrap();
        }
        std::fs::write(d.path().join("000_0000_after_launch_diff.png"), b"").unwrap();

        let frames = inventory(a.path(), b.path(), Some(d.path())).unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(
            frames[0].diff.as_deref(),
            Some(d.path().join("000_0000_after_launch_diff.png").as_path())
        );
        assert_eq!(frames[1].name, "001_0000_exit.png");
        assert_eq!(frames[1].diff, None);
    }

    #[test]
    fn missing_diff_dir_is_ignored() {
        let a = tempfile::tempdir().unwrap();
        let b = tempfile::tempdir().unwrap();
        std::fs::write(a.path().join("x.png"), b"").unwrap();
        std::fs::write(b.path().join("x.png"), b"").unwrap();

        let frames = inventory(a.path(), b.path(), Some(Path::new("/no/such/diffs"))).unwrap();
        assert_eq!(frames.len(), 1);
        assert!(frames[0].diff.is_none());
    }
}
