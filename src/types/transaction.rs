//! Incoming transaction payload.

use crate::error::ServiceError;
use serde::{Deserialize, Serialize};

/// A raw transaction submitted for fraud scoring.
///
/// Built once per request from the JSON body and discarded after the
/// verdict is produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionInput {
    /// Transaction amount. Must be non-negative.
    pub amount: f64,

    /// Hour-of-day as a real in [0, 24).
    pub time: f64,

    /// Merchant category; must be one of the training-time categories.
    pub merchant_category: String,

    /// Free-form customer identifier.
    pub customer_id: String,

    /// Transaction location.
    pub location: String,
}

impl TransactionInput {
    /// Basic type/range validation, applied before feature encoding.
    pub fn validate(&self) -> Result<(), ServiceError> {
        if !self.amount.is_finite() || self.amount < 0.0 {
            return Err(ServiceError::Validation(format!(
                "amount must be a non-negative number, got {}",
                self.amount
            )));
        }

        if !self.time.is_finite() || !(0.0..24.0).contains(&self.time) {
            return Err(ServiceError::Validation(format!(
                "time must be an hour in [0, 24), got {}",
                self.time
            )));
        }

        if self.merchant_category.is_empty() {
            return Err(ServiceError::Validation(
                "merchant_category must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TransactionInput {
        TransactionInput {
            amount: 120.0,
            time: 10.5,
            merchant_category: "Retail".to_string(),
            customer_id: "CUST_0001".to_string(),
            location: "US".to_string(),
        }
    }

    #[test]
    fn test_valid_transaction_passes() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn test_negative_amount_rejected() {
        let mut tx = sample();
        tx.amount = -5.0;
        assert!(matches!(tx.validate(), Err(ServiceError::Validation(_))));
    }

    #[test]
    fn test_time_upper_bound_exclusive() {
        let mut tx = sample();
        tx.time = 24.0;
        assert!(tx.validate().is_err());

        tx.time = 23.99;
        assert!(tx.validate().is_ok());
    }

    #[test]
    fn test_empty_category_rejected() {
        let mut tx = sample();
        tx.merchant_category.clear();
        assert!(tx.validate().is_err());
    }

    #[test]
    fn test_transaction_deserialization() {
        let json = r#"{"amount": 50.0, "time": 3.0, "merchant_category": "Food",
                       "customer_id": "C1", "location": "UK"}"#;
        let tx: TransactionInput = serde_json::from_str(json).unwrap();
        assert_eq!(tx.amount, 50.0);
        assert_eq!(tx.merchant_category, "Food");
    }
}
