//! Type definitions for the prediction API

pub mod transaction;
pub mod verdict;

pub use transaction::TransactionInput;
pub use verdict::{ModelMetadata, ModelMetrics, Verdict};
