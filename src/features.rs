//! Feature encoding for fraud model inference.
//!
//! Transforms a raw transaction into the fixed-order feature vector the
//! model was trained on. The trained model does not validate its input
//! schema, so length, order, and categorical codes are all pinned here.

use crate::error::ServiceError;
use crate::types::TransactionInput;

/// Number of features the model was fit on.
pub const FEATURE_COUNT: usize = 6;

/// Training-time merchant categories, in categorical-code order.
pub const MERCHANT_CATEGORIES: [&str; 6] = [
    "Entertainment",
    "Food",
    "Online",
    "Other",
    "Retail",
    "Transport",
];

/// Training-time locations, in categorical-code order.
pub const LOCATIONS: [&str; 5] = ["ASIA", "EU", "LATAM", "UK", "US"];

/// Training-time device types, in categorical-code order.
pub const DEVICE_TYPES: [&str; 3] = ["Desktop", "Mobile", "Tablet"];

/// Code the training encoder assigns to a value it never observed.
const MISSING_CATEGORY_CODE: f32 = -1.0;

/// Encoder that maps transactions to model input features.
///
/// The serving request carries no timestamp and no device type, while the
/// training pipeline derived `day_of_week` and a device code from richer
/// input. Until the wire contract is widened, `day_of_week` encodes as 0
/// and `device_type` as the missing-category code.
pub struct FeatureEncoder;

impl FeatureEncoder {
    pub fn new() -> Self {
        Self
    }

    /// Encode a transaction into the pinned feature vector.
    ///
    /// Pure function; fails with [`ServiceError::SchemaMismatch`] when a
    /// categorical value has no training-time code.
    pub fn encode(&self, tx: &TransactionInput) -> Result<Vec<f32>, ServiceError> {
        let merchant_code = category_code(&MERCHANT_CATEGORIES, &tx.merchant_category)
            .ok_or_else(|| {
                ServiceError::unknown_category("merchant_category", &tx.merchant_category)
            })?;

        let location_code = category_code(&LOCATIONS, &tx.location)
            .ok_or_else(|| ServiceError::unknown_category("location", &tx.location))?;

        let mut features = Vec::with_capacity(FEATURE_COUNT);
        features.push(tx.amount as f32);
        features.push(tx.time.trunc() as f32); // hour
        features.push(0.0); // day_of_week: not derivable from the request
        features.push(merchant_code);
        features.push(location_code);
        features.push(MISSING_CATEGORY_CODE); // device_type: not in the request

        Ok(features)
    }

    /// Number of features produced.
    pub fn feature_count(&self) -> usize {
        FEATURE_COUNT
    }

    /// Feature names in encoding order, matching the training schema.
    pub fn feature_names(&self) -> [&'static str; FEATURE_COUNT] {
        [
            "amount",
            "hour",
            "day_of_week",
            "merchant_category",
            "location",
            "device_type",
        ]
    }
}

impl Default for FeatureEncoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Categorical code for `value`, or `None` when the training set never
/// contained it.
fn category_code(known: &[&str], value: &str) -> Option<f32> {
    known.iter().position(|&c| c == value).map(|i| i as f32)
}
