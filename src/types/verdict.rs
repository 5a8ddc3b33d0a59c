//! Prediction verdict and model metadata payloads.

use serde::{Deserialize, Serialize};

/// Structured outcome of scoring a single transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verdict {
    /// Probability of the fraud class, in [0, 1].
    pub fraud_probability: f64,

    /// The model's label decision.
    pub is_fraud: bool,

    /// Currently defined identically to `fraud_probability`; a proper
    /// calibration method would replace this.
    pub confidence: f64,
}

/// Metrics recorded at training time for the loaded model version.
///
/// These are reported as-is; the service never computes them live.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
}

/// Static, versioned information about the loaded model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub model_version: String,
    pub last_updated: String,
    pub metrics: ModelMetrics,
}

impl Default for ModelMetadata {
    fn default() -> Self {
        Self {
            model_version: "1.0.0".to_string(),
            last_updated: "2024-01-01".to_string(),
            metrics: ModelMetrics {
                accuracy: 0.95,
                precision: 0.92,
                recall: 0.88,
                f1_score: 0.90,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_serialization() {
        let verdict = Verdict {
            fraud_probability: 0.82,
            is_fraud: true,
            confidence: 0.82,
        };

        let json = serde_json::to_string(&verdict).unwrap();
        let deserialized: Verdict = serde_json::from_str(&json).unwrap();

        assert_eq!(verdict.fraud_probability, deserialized.fraud_probability);
        assert_eq!(verdict.is_fraud, deserialized.is_fraud);
    }

    #[test]
    fn test_default_metadata_metrics_in_range() {
        let meta = ModelMetadata::default();
        for value in [
            meta.metrics.accuracy,
            meta.metrics.precision,
            meta.metrics.recall,
            meta.metrics.f1_score,
        ] {
            assert!((0.0..=1.0).contains(&value));
        }
    }
}
