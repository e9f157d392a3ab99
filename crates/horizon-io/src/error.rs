//! Error types for batch runs.
//!
//! [`BatchError`] aborts a run. [`FrameError`] skips one frame.
//! [`GroundTruthError`] only disables evaluation.

use std::path::PathBuf;

use horizon_pipeline::PipelineError;

/// Failures that stop a batch before any frame is processed.
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    /// The input directory does not exist or is not a directory.
    #[error("input directory not found: {}", .0.display())]
    MissingInput(PathBuf),

    /// The output directory could not be created.
    #[error("failed to create output directory {}", path.display())]
    CreateOutput {
        /// Directory that could not be created.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The input directory could not be listed.
    #[error("failed to read input directory {}", path.display())]
    ReadDir {
        /// Directory that could not be listed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The pipeline configuration is unusable.
    #[error(transparent)]
    InvalidConfig(#[from] PipelineError),
}

/// Failures confined to one frame.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The frame file could not be read.
    #[error("failed to read {}", path.display())]
    Read {
        /// Frame path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Decoding or detection failed.
    #[error("horizon detection failed")]
    Pipeline(#[from] PipelineError),

    /// The annotated frame could not be written.
    #[error("failed to write {}", path.display())]
    Write {
        /// Output path.
        path: PathBuf,
        /// Underlying encoder or I/O error.
        #[source]
        source: image::ImageError,
    },
}

/// Failures loading ground truth.
#[derive(Debug, thiserror::Error)]
pub enum GroundTruthError {
    /// The ground-truth file could not be read.
    #[error("failed to read ground truth {}", path.display())]
    Read {
        /// Ground-truth path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The ground-truth file is not valid.
    #[error("failed to parse ground truth {}", path.display())]
    Parse {
        /// Ground-truth path.
        path: PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}

/// Render an error and its chain of sources on one line.
#[must_use]
pub fn error_chain(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        // Some variants already embed their source in their own message.
        if !message.ends_with(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}
