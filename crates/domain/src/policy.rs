//! Detection trust policy.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::value_objects::Weight;

/// Thresholds governing trust in a machine-vision detection result.
///
/// Stateless and cheap to copy; one instance is shared across requests.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectionPolicy {
    confidence_threshold: f64,
    weight_tolerance_grams: f64,
}

impl DetectionPolicy {
    /// Creates a custom policy with validation.
    pub fn new(confidence_threshold: f64, weight_tolerance_grams: f64) -> Result<Self, DomainError> {
        if !(0.0..=1.0).contains(&confidence_threshold) {
            return Err(DomainError::InvalidConfidenceThreshold {
                value: confidence_threshold,
            });
        }
        if !weight_tolerance_grams.is_finite() || weight_tolerance_grams < 0.0 {
            return Err(DomainError::InvalidWeightTolerance {
                value: weight_tolerance_grams,
            });
        }
        Ok(Self {
            confidence_threshold,
            weight_tolerance_grams,
        })
    }

    /// Returns the minimum acceptable confidence.
    pub fn confidence_threshold(&self) -> f64 {
        self.confidence_threshold
    }

    /// Returns the weight tolerance in grams.
    pub fn weight_tolerance_grams(&self) -> f64 {
        self.weight_tolerance_grams
    }

    /// Returns true if a confidence value meets the threshold.
    pub fn is_confidence_acceptable(&self, confidence: f64) -> bool {
        confidence >= self.confidence_threshold
    }

    /// Returns true if the expected and measured weights are within tolerance.
    pub fn is_weight_match(&self, expected: Weight, measured: Weight) -> bool {
        expected.is_within_tolerance(measured, self.weight_tolerance_grams)
    }
}

impl Default for DetectionPolicy {
    /// The standard policy: 0.80 confidence, 10 gram tolerance.
    fn default() -> Self {
        Self {
            confidence_threshold: 0.80,
            weight_tolerance_grams: 10.0,
        }
    }
}
