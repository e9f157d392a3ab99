//! Batch runner: every frame in an input directory, one at a time.
//!
//! For each frame the runner reads the bytes, detects the horizon, writes
//! the annotated copy under the same file name in the output directory
//! and, when ground truth is available, computes the loss. A frame that
//! fails at any step is logged and recorded as skipped; the batch goes
//! on.

use std::path::{Path, PathBuf};
use std::time::Instant;

use horizon_pipeline::{
    GroundTruth, PipelineConfig, decode, decode_with_diagnostics, detect_image,
    detect_image_with_diagnostics, evaluate,
};

use crate::annotate;
use crate::discover::discover_frames;
use crate::error::{BatchError, FrameError, error_chain};
use crate::ground_truth;
use crate::report::{BatchReport, FrameOutcome, FrameStatus, ProcessedFrame};

/// Where to read frames, where to write results and what to evaluate
/// against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchConfig {
    /// Directory holding `frame*` images.
    pub input_path: PathBuf,
    /// Directory for annotated frames. Created if missing.
    pub output_path: PathBuf,
    /// Ground-truth JSON. `None` means `<input_path>/ground_truth.json`.
    pub ground_truth_path: Option<PathBuf>,
    /// Collect per-stage diagnostics for every frame.
    pub diagnostics: bool,
}

impl BatchConfig {
    /// Batch over `input_path`, writing to `output_path`, with the
    /// default ground-truth location and no diagnostics.
    #[must_use]
    pub fn new(input_path: impl Into<PathBuf>, output_path: impl Into<PathBuf>) -> Self {
        Self {
            input_path: input_path.into(),
            output_path: output_path.into(),
            ground_truth_path: None,
            diagnostics: false,
        }
    }

    /// The ground-truth file this batch evaluates against.
    #[must_use]
    pub fn ground_truth_file(&self) -> PathBuf {
        self.ground_truth_path
            .clone()
            .unwrap_or_else(|| self.input_path.join(ground_truth::DEFAULT_FILE_NAME))
    }
}

/// Run horizon detection over every frame of a batch.
///
/// # Errors
///
/// Returns [`BatchError`] when the run cannot start: invalid pipeline
/// configuration, missing or unreadable input directory, or an output
/// directory that cannot be created. Per-frame failures are reported in
/// the returned [`BatchReport`] instead.
pub fn run_batch(batch: &BatchConfig, config: &PipelineConfig) -> Result<BatchReport, BatchError> {
    let start = Instant::now();
    config.validate()?;

    let frames = discover_frames(&batch.input_path)?;
    std::fs::create_dir_all(&batch.output_path).map_err(|source| BatchError::CreateOutput {
        path: batch.output_path.clone(),
        source,
    })?;
    let truth = ground_truth::load_optional(&batch.ground_truth_file());

    log::info!(
        "processing {} frame(s) from {}",
        frames.len(),
        batch.input_path.display()
    );

    let mut outcomes = Vec::with_capacity(frames.len());
    for path in &frames {
        let name = frame_name(path);
        let status = match process_frame(path, &name, batch, config, truth.as_ref()) {
            Ok(processed) => FrameStatus::Processed(processed),
            Err(err) => {
                let reason = error_chain(&err);
                log::warn!("skipping {name}: {reason}");
                FrameStatus::Skipped { reason }
            }
        };
        outcomes.push(FrameOutcome { name, status });
    }

    let report = BatchReport::new(
        batch.input_path.clone(),
        batch.output_path.clone(),
        truth.is_some(),
        outcomes,
        start.elapsed(),
    );
    log::info!(
        "done: {} processed, {} skipped in {:.3}s",
        report.processed_count(),
        report.skipped_count(),
        report.elapsed.as_secs_f64()
    );
    Ok(report)
}

/// Detect, annotate, save and evaluate one frame.
///
/// # Errors
///
/// Returns [`FrameError`] if the frame cannot be read, decoded, detected
/// or written.
pub fn process_frame(
    path: &Path,
    name: &str,
    batch: &BatchConfig,
    config: &PipelineConfig,
    truth: Option<&GroundTruth>,
) -> Result<ProcessedFrame, FrameError> {
    let bytes = std::fs::read(path).map_err(|source| FrameError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let (image, detection, diagnostics) = if batch.diagnostics {
        let (image, decode_stage) = decode_with_diagnostics(&bytes)?;
        let (detection, diagnostics) =
            detect_image_with_diagnostics(&image, decode_stage, config)?;
        (image, detection, Some(diagnostics))
    } else {
        let image = decode::decode_rgb(&bytes)?;
        let detection = detect_image(&image, config)?;
        (image, detection, None)
    };

    let output = batch.output_path.join(name);
    annotate::save(&annotate::annotate(&image, detection.horizon), &output).map_err(|source| {
        FrameError::Write {
            path: output.clone(),
            source,
        }
    })?;

    let loss = truth.and_then(|truth| {
        let entry = truth.get(name);
        if entry.is_none() {
            log::warn!("no ground truth for {name}");
        }
        entry.map(|entry| evaluate::loss(entry, detection.horizon))
    });

    log::debug!(
        "{name}: horizon {:?} cost {} loss {loss:?}",
        detection.horizon,
        detection.cost
    );

    Ok(ProcessedFrame {
        detection,
        loss,
        output,
        diagnostics,
    })
}

fn frame_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn ground_truth_defaults_to_input_directory() {
        let batch = BatchConfig::new("/data/in", "/data/out");
        assert_eq!(
            batch.ground_truth_file(),
            PathBuf::from("/data/in/ground_truth.json")
        );
    }

    #[test]
    fn explicit_ground_truth_wins() {
        let batch = BatchConfig {
            ground_truth_path: Some(PathBuf::from("/labels.json")),
            ..BatchConfig::new("/data/in", "/data/out")
        };
        assert_eq!(batch.ground_truth_file(), PathBuf::from("/labels.json"));
    }

    #[test]
    fn invalid_config_aborts_before_io() {
        let batch = BatchConfig::new("/definitely/not/here", "/also/not/here");
        let config = PipelineConfig {
            hough_vote_threshold: 0,
            ..PipelineConfig::default()
        };
        assert!(matches!(
            run_batch(&batch, &config),
            Err(BatchError::InvalidConfig(_))
        ));
    }

    #[test]
    fn frame_name_is_file_name() {
        assert_eq!(frame_name(Path::new("/a/b/frame7.jpg")), "frame7.jpg");
    }
}
