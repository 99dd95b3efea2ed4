//! Frame discovery and name matching across runs

use crate::error::{CompareError, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// PNG files directly inside `dir`, keyed by file name.
pub fn collect(dir: &Path) -> Result<BTreeMap<String, PathBuf>> {
    if !dir.is_dir() {
        return Err(CompareError::MissingDirectory(dir.to_path_buf()));
    }
    let entries = std::fs::read_dir(dir).map_err(|source| CompareError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut frames = BTreeMap::new();
    for entry in entries.flatten() {
        let path = entry.path();
        let is_png = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("png"))
            .unwrap_or(false);
        if !is_png || !path.is_file() {
            continue;
        }
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            frames.insert(name.to_string(), path.clone());
        }
    }
    Ok(frames)
}

/// Frames present in both runs, and the names found in only one of them.
#[derive(Debug, Default)]
pub struct Pairing {
    pub shared: Vec<(String, PathBuf, PathBuf)>,
    pub only_first: Vec<String>,
    pub only_second: Vec<String>,
}

pub fn pair(first: &Path, second: &Path) -> Result<Pairing> {
    let a = collect(first)?;
    let mut b = collect(second)?;

    let mut pairing = Pairing::default();
    for (name, path_a) in a {
        match b.remove(&name) {
            Some(path_b) => pairing.shared.push((name, path_a, path_b)),
            None => pairing.only_first.push(name),
        }
    }
    pairing.only_second = b.into_keys().collect();

    if pairing.shared.is_empty() {
        return Err(CompareError::NoMatchingFrames {
            first: first.to_path_buf(),
            second: second.to_path_buf(),
        });
    }
    Ok(pairing)
}

/// `shot.png` -> `shot_diff.png`
pub fn diff_name(name: &str) -> String {
    let stem = Path::new(name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(name);
    format!("{}_diff.png", stem)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(dir: &Path, name: &str) {
        std::fs::write(dir.join(name), b"").unwrap();
    }

    #[test]
    fn pairs_by_name() {
        let a = tempfile::tempdir().unwrap();
        let b = tempfile::tempdir().unwrap();
        for name in ["000_0000_after_launch.png", "001_0000_mouse_press_left.png", "notes.txt"] {
            touch(a.path(), name);
        }
        for name in ["000_0000_after_launch.png", "002_0001_exit.PNG"] {
            touch(b.path(), name);
        }

        let pairing = pair(a.path(), b.path()).unwrap();
        let shared: Vec<_> = pairing.shared.iter().map(|(n, _, _)| n.as_str()).collect();
        assert_eq!(shared, vec!["000_0000_after_launch.png"]);
        assert_eq!(pairing.only_first, vec!["001_0000_mouse_press_left.png"]);
        assert_eq!(pairing.only_second, vec!["002_0001_exit.PNG"]);
    }

    #[test]
    fn no_shared_names() {
        let a = tempfile::tempdir().unwrap();
        let b = tempfile::tempdir().unwrap();
        touch(a.path(), "a.png");
        touch(b.path(), "b.png");
        assert!(matches!(
            pair(a.path(), b.path()),
            Err(CompareError::NoMatchingFrames { .. })
        ));
    }

    #[test]
    fn missing_directory() {
        let a = tempfile::tempdir().unwrap();
        let err = pair(a.path(), Path::new("/no/such/dir")).unwrap_err();
        assert!(matches!(err, CompareError::MissingDirectory(_)));
    }

    #[test]
    fn diff_names() {
        assert_eq!(diff_name("003_0002_exit.png"), "003_0002_exit_diff.png");
    }
}
