//! Scoring model loading and inference

pub mod onnx;
pub mod registry;
pub mod scoring;
pub mod stub;

pub use onnx::OnnxScoringModel;
pub use registry::ModelRegistry;
pub use scoring::ScoringModel;
pub use stub::StubModel;
