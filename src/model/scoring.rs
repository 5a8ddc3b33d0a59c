//! Scoring model interface.

use anyhow::Result;

/// A trained fraud model, reduced to the two capabilities the prediction
/// service needs. Loaded once at startup and shared read-only across
/// concurrent requests.
pub trait ScoringModel: Send + Sync {
    /// Label decision for a feature vector: `true` means fraud.
    fn predict(&self, features: &[f32]) -> Result<bool>;

    /// Fraud-class probability for a feature vector, in [0, 1].
    fn predict_proba(&self, features: &[f32]) -> Result<f64>;

    /// Human-readable model name for logs.
    fn name(&self) -> &str;
}
