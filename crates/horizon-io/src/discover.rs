//! Frame discovery in an input directory.

use std::path::{Path, PathBuf};

use crate::error::BatchError;

/// File name prefix that marks a frame.
pub const FRAME_PREFIX: &str = "frame";

/// Returns `true` if `path` names a frame (file name starts with
/// [`FRAME_PREFIX`]).
#[must_use]
pub fn is_frame(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with(FRAME_PREFIX))
}

/// List the frames in `dir`, sorted by file name.
///
/// Only regular files are returned. Directories and files whose names do
/// not start with [`FRAME_PREFIX`] are ignored.
///
/// # Errors
///
/// Returns [`BatchError::MissingInput`] if `dir` is not a directory and
/// [`BatchError::ReadDir`] if it cannot be listed.
pub fn discover_frames(dir: &Path) -> Result<Vec<PathBuf>, BatchError> {
    if !dir.is_dir() {
        return Err(BatchError::MissingInput(dir.to_path_buf()));
    }
    let read_dir_error = |source| BatchError::ReadDir {
        path: dir.to_path_buf(),
        source,
    };

    let mut frames = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(read_dir_error)? {
        let entry = entry.map_err(read_dir_error)?;
        let path = entry.path();
        if path.is_file() && is_frame(&path) {
            frames.push(path);
        }
    }
    frames.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(frames)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn frame_prefix_is_required() {
        assert!(is_frame(Path::new("/data/frame0001.png")));
        assert!(is_frame(Path::new("frame.jpg")));
        assert!(!is_frame(Path::new("/data/ground_truth.json")));
        assert!(!is_frame(Path::new("/data/Frame1.png")));
        assert!(!is_frame(Path::new("/")));
    }

    #[test]
    fn frames_are_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["frame10.png", "frame02.png", "notes.txt", "frame01.png"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        std::fs::create_dir(dir.path().join("frames_dir")).unwrap();

        let frames = discover_frames(dir.path()).unwrap();
        let names: Vec<_> = frames
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, ["frame01.png", "frame02.png", "frame10.png"]);
    }

    #[test]
    fn missing_directory_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent");
        assert!(matches!(
            discover_frames(&missing),
            Err(BatchError::MissingInput(p)) if p == missing
        ));
    }
}
