//! Ground-truth loading.

use std::path::Path;

use horizon_pipeline::GroundTruth;

use crate::error::{GroundTruthError, error_chain};

/// Default ground-truth file name inside the input directory.
pub const DEFAULT_FILE_NAME: &str = "ground_truth.json";

/// Load ground truth from a JSON file.
///
/// # Errors
///
/// Returns [`GroundTruthError::Read`] if the file cannot be read and
/// [`GroundTruthError::Parse`] if it does not match the schema.
pub fn load(path: &Path) -> Result<GroundTruth, GroundTruthError> {
    let json = std::fs::read_to_string(path).map_err(|source| GroundTruthError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    GroundTruth::from_json(&json).map_err(|source| GroundTruthError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load ground truth, logging a warning and returning `None` on failure.
///
/// Evaluation is optional, so an absent or broken file never stops a run.
#[must_use]
pub fn load_optional(path: &Path) -> Option<GroundTruth> {
    match load(path) {
        Ok(truth) => {
            log::info!(
                "loaded ground truth for {} frame(s) from {}",
                truth.len(),
                path.display()
            );
            Some(truth)
        }
        Err(err) => {
            log::warn!("evaluation disabled: {}", error_chain(&err));
            None
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn loads_valid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_FILE_NAME);
        std::fs::write(
            &path,
            r#"{"frame1.png": {"left": [0, 10], "right": [99, 12]}}"#,
        )
        .unwrap();
        let truth = load(&path).unwrap();
        assert_eq!(truth.get("frame1.png").unwrap().right, [99.0, 12.0]);
    }

    #[test]
    fn missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = load(&dir.path().join(DEFAULT_FILE_NAME));
        assert!(matches!(result, Err(GroundTruthError::Read { .. })));
        assert!(load_optional(&dir.path().join(DEFAULT_FILE_NAME)).is_none());
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_FILE_NAME);
        std::fs::write(&path, "[1, 2, 3]").unwrap();
        assert!(matches!(load(&path), Err(GroundTruthError::Parse { .. })));
        assert!(load_optional(&path).is_none());
    }
}
