//! Fixed-probability scoring model for tests and local development.

use crate::model::scoring::ScoringModel;
use anyhow::Result;

/// Returns the same probability for every input; the label is the
/// probability checked against a threshold (inclusive at the boundary).
pub struct StubModel {
    probability: f64,
    threshold: f64,
}

impl StubModel {
    pub fn new(probability: f64) -> Self {
        Self::with_threshold(probability, 0.5)
    }

    pub fn with_threshold(probability: f64, threshold: f64) -> Self {
        Self {
            probability,
            threshold,
        }
    }
}

impl ScoringModel for StubModel {
    fn predict(&self, _features: &[f32]) -> Result<bool> {
        Ok(self.probability >= self.threshold)
    }

    fn predict_proba(&self, _features: &[f32]) -> Result<f64> {
        Ok(self.probability)
    }

    fn name(&self) -> &str {
        "stub"
    }
}
