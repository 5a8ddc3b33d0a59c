//! Fraud Detection Prediction API
//!
//! Validates raw transactions, encodes them into the fixed-order feature
//! vector a trained model expects, scores them with an ONNX model loaded
//! from a local registry, and serves verdicts over a JSON HTTP contract.

pub mod api;
pub mod config;
pub mod error;
pub mod features;
pub mod metrics;
pub mod model;
pub mod service;
pub mod types;

pub use api::AppState;
pub use config::AppConfig;
pub use error::ServiceError;
pub use features::FeatureEncoder;
pub use metrics::ServiceMetrics;
pub use model::{ModelRegistry, OnnxScoringModel, ScoringModel, StubModel};
pub use service::PredictionService;
pub use types::{ModelMetadata, TransactionInput, Verdict};
