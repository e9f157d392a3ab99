//! Accuracy against ground-truth horizons.
//!
//! Ground truth is a JSON object keyed by frame file name:
//!
//! ```json
//! { "frame0001.png": { "left": [0, 40], "right": [1920, 60] } }
//! ```
//!
//! The loss for a frame is the Euclidean distance between the 4-vector
//! `left ++ right` and the predicted `[x1, y1, x2, y2]`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::LineSegment;

/// True horizon endpoints for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroundTruthEntry {
    /// Leftmost horizon point `(x, y)`.
    pub left: [f64; 2],
    /// Rightmost horizon point `(x, y)`.
    pub right: [f64; 2],
}

impl GroundTruthEntry {
    /// Endpoints as `[left.x, left.y, right.x, right.y]`.
    #[must_use]
    pub const fn coordinates(&self) -> [f64; 4] {
        [self.left[0], self.left[1], self.right[0], self.right[1]]
    }
}

/// Ground truth for a batch, keyed by frame file name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroundTruth(BTreeMap<String, GroundTruthEntry>);

impl GroundTruth {
    /// Parse ground truth from its JSON form.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error for malformed JSON or entries that
    /// do not match the schema.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Entry for `frame_name`, if present.
    #[must_use]
    pub fn get(&self, frame_name: &str) -> Option<&GroundTruthEntry> {
        self.0.get(frame_name)
    }

    /// Number of frames with ground truth.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` when no frame has ground truth.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, GroundTruthEntry)> for GroundTruth {
    fn from_iter<T: IntoIterator<Item = (String, GroundTruthEntry)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Euclidean distance between two 4-vectors.
#[must_use]
pub fn euclidean_distance(a: [f64; 4], b: [f64; 4]) -> f64 {
    a.iter()
        .zip(&b)
        .map(|(p, q)| (p - q) * (p - q))
        .sum::<f64>()
        .sqrt()
}

/// Loss of a predicted horizon against its ground truth.
#[must_use]
pub fn loss(truth: &GroundTruthEntry, predicted: LineSegment) -> f64 {
    euclidean_distance(truth.coordinates(), predicted.coordinates())
}

/// Aggregate loss over a batch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BatchMetrics {
    /// Number of frames that contributed a loss.
    pub count: usize,
    /// Largest loss.
    pub max: f64,
    /// Mean loss.
    pub mean: f64,
}

impl BatchMetrics {
    /// Summarise a set of per-frame losses. Returns `None` when empty.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_losses(losses: &[f64]) -> Option<Self> {
        let max = losses.iter().copied().reduce(f64::max)?;
        let mean = losses.iter().sum::<f64>() / losses.len() as f64;
        Some(Self {
            count: losses.len(),
            max,
            mean,
        })
    }
}
