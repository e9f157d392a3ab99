//! Batch results and their console/JSON rendering.

use std::path::PathBuf;
use std::time::Duration;

use horizon_pipeline::{BatchMetrics, Detection, FrameDiagnostics};
use serde::{Serialize, Serializer};

/// A frame that was detected and written.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessedFrame {
    /// Detection result.
    pub detection: Detection,
    /// Loss against ground truth, when the frame has an entry.
    pub loss: Option<f64>,
    /// Path of the annotated output.
    pub output: PathBuf,
    /// Per-stage diagnostics, when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostics: Option<FrameDiagnostics>,
}

/// What happened to a frame.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FrameStatus {
    /// The frame was processed.
    Processed(ProcessedFrame),
    /// The frame was skipped.
    Skipped {
        /// Rendered error chain.
        reason: String,
    },
}

/// Outcome for one frame of a batch.
#[derive(Debug, Clone, Serialize)]
pub struct FrameOutcome {
    /// Frame file name.
    pub name: String,
    /// Processed or skipped.
    #[serde(flatten)]
    pub status: FrameStatus,
}

impl FrameOutcome {
    /// The processed result, if any.
    #[must_use]
    pub const fn processed(&self) -> Option<&ProcessedFrame> {
        match &self.status {
            FrameStatus::Processed(processed) => Some(processed),
            FrameStatus::Skipped { .. } => None,
        }
    }
}

/// Results of a batch run.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    /// Input directory.
    pub input: PathBuf,
    /// Output directory.
    pub output: PathBuf,
    /// Whether ground truth was loaded.
    pub evaluated: bool,
    /// Per-frame outcomes, in processing order.
    pub frames: Vec<FrameOutcome>,
    /// Loss summary over frames with ground truth.
    pub metrics: Option<BatchMetrics>,
    /// Wall-clock duration of the run (seconds).
    #[serde(serialize_with = "serialize_secs")]
    pub elapsed: Duration,
}

fn serialize_secs<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    duration.as_secs_f64().serialize(serializer)
}

impl BatchReport {
    /// Build a report, computing loss metrics from the outcomes.
    #[must_use]
    pub fn new(
        input: PathBuf,
        output: PathBuf,
        evaluated: bool,
        frames: Vec<FrameOutcome>,
        elapsed: Duration,
    ) -> Self {
        let losses: Vec<f64> = frames
            .iter()
            .filter_map(FrameOutcome::processed)
            .filter_map(|p| p.loss)
            .collect();
        Self {
            input,
            output,
            evaluated,
            metrics: BatchMetrics::from_losses(&losses),
            frames,
            elapsed,
        }
    }

    /// Number of frames found.
    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Number of frames processed.
    #[must_use]
    pub fn processed_count(&self) -> usize {
        self.frames
            .iter()
            .filter(|f| f.processed().is_some())
            .count()
    }

    /// Number of frames skipped.
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.frame_count() - self.processed_count()
    }

    /// Format the report for the console.
    #[must_use]
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Horizon Batch Report\n{}", "=".repeat(60)));
        lines.push(format!("Input:  {}", self.input.display()));
        lines.push(format!("Output: {}", self.output.display()));
        lines.push(format!(
            "Frames: {}  |  Processed: {}  |  Skipped: {}  |  Elapsed: {:.3}s",
            self.frame_count(),
            self.processed_count(),
            self.skipped_count(),
            self.elapsed.as_secs_f64(),
        ));
        lines.push(String::new());

        lines.push(format!(
            "{:<24} {:>24} {:>10} {:>10}",
            "Frame", "Horizon", "Cost", "Loss"
        ));
        lines.push("-".repeat(72));
        for frame in &self.frames {
            match &frame.status {
                FrameStatus::Processed(p) => {
                    let h = p.detection.horizon;
                    let horizon = format!("({},{})-({},{})", h.x1, h.y1, h.x2, h.y2);
                    let loss = p.loss.map_or_else(|| "-".to_string(), |l| format!("{l:.2}"));
                    lines.push(format!(
                        "{:<24} {horizon:>24} {:>10} {loss:>10}",
                        frame.name, p.detection.cost,
                    ));
                }
                FrameStatus::Skipped { reason } => {
                    lines.push(format!("{:<24} skipped: {reason}", frame.name));
                }
            }
        }
        lines.push(String::new());

        match (&self.metrics, self.evaluated) {
            (Some(m), _) => lines.push(format!(
                "Max loss: {:.3}  |  Mean loss: {:.3}  |  Evaluated frames: {}",
                m.max, m.mean, m.count
            )),
            (None, true) => lines.push("No frame had ground truth".to_string()),
            (None, false) => lines.push("Ground truth unavailable, evaluation skipped".to_string()),
        }

        lines.join("\n")
    }
}
