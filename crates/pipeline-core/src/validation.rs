//! Prediction-vs-measurement validation

use crate::metadata::ExportMetadata;
use crate::stats::{ComplexityTier, MeasuredStats};
use serde::{Deserialize, Serialize};

/// Accuracy a caller should require before accepting an asset
pub const DEFAULT_PASS_THRESHOLD: f64 = 85.0;

/// Outcome of comparing sidecar predictions with engine measurements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub poly_error_percent: f64,
    /// `100 - poly_error_percent`; not clamped, goes negative for large gaps
    pub accuracy_score: f64,
    /// Polygon-based tier from the sidecar
    pub predicted_complexity: ComplexityTier,
    /// Memory-based tier from the measurement
    pub actual_complexity: ComplexityTier,
    pub memory_mb: f64,
}

impl ValidationResult {
    pub fn passes(&self, threshold: f64) -> bool {
        self.accuracy_score >= threshold
    }
}

/// Compares what 3ds Max predicted with what Unreal measured
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidationEngine;

impl ValidationEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn validate(&self, metadata: &ExportMetadata, actual: &MeasuredStats) -> ValidationResult {
        let poly_error_percent = poly_error_percent(metadata.polygons(), actual.triangles);

        ValidationResult {
            poly_error_percent,
            accuracy_score: 100.0 - poly_error_percent,
            predicted_complexity: metadata.complexity,
            // Different axis from predicted_complexity; the two are not reconciled.
            actual_complexity: ComplexityTier::from_memory_mb(actual.memory_mb),
            memory_mb: actual.memory_mb,
        }
    }
}

/// Percentage gap between predicted polygons and measured triangles.
///
/// Zero when nothing was predicted, which only avoids a division by zero.
pub fn poly_error_percent(predicted: u64, actual: u64) -> f64 {
    if predicted == 0 {
        return 0.0;
    }
    predicted.abs_diff(actual) as f64 / predicted as f64 * 100.0
}

/// `100 - poly_error_percent`
pub fn accuracy_score(predicted: u64, actual: u64) -> f64 {
    100.0 - poly_error_percent(predicted, actual)
}
