//! Prediction service: validate, encode, score, shape the verdict.

use crate::error::ServiceError;
use crate::features::FeatureEncoder;
use crate::model::ScoringModel;
use crate::types::{ModelMetadata, TransactionInput, Verdict};
use std::sync::Arc;
use tracing::debug;

/// Owns the loaded model for the process lifetime and produces verdicts
/// for individual transactions. Shared read-only across request handlers;
/// nothing here mutates between requests.
pub struct PredictionService {
    model: Arc<dyn ScoringModel>,
    encoder: FeatureEncoder,
    metadata: ModelMetadata,
}

impl PredictionService {
    pub fn new(model: Arc<dyn ScoringModel>, metadata: ModelMetadata) -> Self {
        Self {
            model,
            encoder: FeatureEncoder::new(),
            metadata,
        }
    }

    /// Score a single transaction.
    pub fn predict(&self, tx: &TransactionInput) -> Result<Verdict, ServiceError> {
        tx.validate()?;

        let features = self.encoder.encode(tx)?;

        let fraud_probability = self
            .model
            .predict_proba(&features)
            .map_err(|e| ServiceError::Prediction(e.to_string()))?;

        if !(0.0..=1.0).contains(&fraud_probability) {
            return Err(ServiceError::Prediction(format!(
                "model returned probability {fraud_probability} outside [0, 1]"
            )));
        }

        let is_fraud = self
            .model
            .predict(&features)
            .map_err(|e| ServiceError::Prediction(e.to_string()))?;

        debug!(
            model = %self.model.name(),
            customer_id = %tx.customer_id,
            fraud_probability = fraud_probability,
            is_fraud = is_fraud,
            "Transaction scored"
        );

        // confidence is currently the fraud probability itself; replacing
        // it requires an actual calibration method.
        Ok(Verdict {
            fraud_probability,
            is_fraud,
            confidence: fraud_probability,
        })
    }

    /// Static metadata for the loaded model version.
    pub fn model_info(&self) -> &ModelMetadata {
        &self.metadata
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::StubModel;
    use anyhow::Result;

    fn sample() -> TransactionInput {
        TransactionInput {
            amount: 100.0,
            time: 12.0,
            merchant_category: "Food".to_string(),
            customer_id: "CUST_0007".to_string(),
            location: "EU".to_string(),
        }
    }

    fn service(probability: f64) -> PredictionService {
        PredictionService::new(
            Arc::new(StubModel::new(probability)),
            ModelMetadata::default(),
        )
    }

    #[test]
    fn test_high_probability_flags_fraud() {
        let verdict = service(0.9).predict(&sample()).unwrap();
        assert_eq!(verdict.fraud_probability, 0.9);
        assert!(verdict.is_fraud);
    }

    #[test]
    fn test_low_probability_passes() {
        let verdict = service(0.1).predict(&sample()).unwrap();
        assert_eq!(verdict.fraud_probability, 0.1);
        assert!(!verdict.is_fraud);
    }

    #[test]
    fn test_confidence_equals_fraud_probability() {
        // Documents current behavior: any future calibration change must
        // update this test deliberately.
        for probability in [0.0, 0.25, 0.5, 0.99] {
            let verdict = service(probability).predict(&sample()).unwrap();
            assert_eq!(verdict.confidence, verdict.fraud_probability);
        }
    }

    #[test]
    fn test_threshold_boundary_follows_model_policy() {
        let verdict = service(0.5).predict(&sample()).unwrap();
        assert_eq!(verdict.fraud_probability, 0.5);
        assert!(verdict.is_fraud); // stub treats the boundary as fraud
    }

    #[test]
    fn test_invalid_input_rejected_before_model_call() {
        let mut tx = sample();
        tx.amount = -5.0;
        let err = service(0.5).predict(&tx).unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[test]
    fn test_unknown_category_is_schema_mismatch() {
        let mut tx = sample();
        tx.merchant_category = "Gambling".to_string();
        let err = service(0.5).predict(&tx).unwrap_err();
        assert!(matches!(err, ServiceError::SchemaMismatch(_)));
    }

    struct BrokenModel;

    impl ScoringModel for BrokenModel {
        fn predict(&self, _features: &[f32]) -> Result<bool> {
            Ok(true)
        }

        fn predict_proba(&self, _features: &[f32]) -> Result<f64> {
            Ok(1.7)
        }

        fn name(&self) -> &str {
            "broken"
        }
    }

    #[test]
    fn test_out_of_range_probability_is_prediction_error() {
        let service =
            PredictionService::new(Arc::new(BrokenModel), ModelMetadata::default());
        let err = service.predict(&sample()).unwrap_err();
        assert!(matches!(err, ServiceError::Prediction(_)));
    }
}
