//! horizon-io: filesystem side of horizon detection.
//!
//! Finds `frame*` images in an input directory, runs
//! [`horizon_pipeline`] on each, writes annotated copies to an output
//! directory and evaluates them against an optional ground-truth file.

pub mod annotate;
pub mod batch;
pub mod discover;
pub mod error;
pub mod ground_truth;
pub mod report;

pub use batch::{BatchConfig, run_batch};
pub use error::{BatchError, FrameError, GroundTruthError};
pub use report::{BatchReport, FrameOutcome, FrameStatus, ProcessedFrame};
