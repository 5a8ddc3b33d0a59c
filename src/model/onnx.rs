//! ONNX-backed scoring model.
//!
//! Handles the two output layouts sklearn-family exports produce: plain
//! probability tensors, and `seq(map(int64, float))` from the zipmap
//! post-processing some converters emit.

use crate::model::scoring::ScoringModel;
use anyhow::{bail, Context, Result};
use ort::memory::Allocator;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::{DowncastableTarget, DynMapValueType, DynSequenceValueType};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info};

/// A loaded ONNX model session with its resolved I/O names.
///
/// The session requires exclusive access to run, so it sits behind a
/// mutex; the model itself is read-only for the process lifetime.
#[derive(Debug)]
pub struct OnnxScoringModel {
    name: String,
    session: Mutex<Session>,
    input_name: String,
    proba_output: String,
    label_output: String,
}

impl OnnxScoringModel {
    /// Load a model from an ONNX file.
    pub fn load<P: AsRef<Path>>(path: P, name: &str, onnx_threads: usize) -> Result<Self> {
        let path = path.as_ref();

        ort::init().commit()?;
        info!(model = %name, path = %path.display(), threads = onnx_threads, "Loading ONNX model");

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(onnx_threads)?
            .commit_from_file(path)
            .context(format!("Failed to load model from {:?}", path))?;

        let input_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .unwrap_or_else(|| "float_input".to_string());

        let proba_output = session
            .outputs
            .iter()
            .find(|o| o.name.contains("prob") || o.name.contains("output"))
            .map(|o| o.name.clone())
            .unwrap_or_else(|| {
                session
                    .outputs
                    .last()
                    .map(|o| o.name.clone())
                    .unwrap_or_else(|| "probabilities".to_string())
            });

        let label_output = session
            .outputs
            .iter()
            .find(|o| o.name.contains("label"))
            .map(|o| o.name.clone())
            .unwrap_or_else(|| "label".to_string());

        info!(
            model = %name,
            input = %input_name,
            proba_output = %proba_output,
            label_output = %label_output,
            "Model loaded successfully"
        );

        Ok(Self {
            name: name.to_string(),
            session: Mutex::new(session),
            input_name,
            proba_output,
            label_output,
        })
    }

    fn input_tensor(&self, features: &[f32]) -> Result<ort::value::Tensor<f32>> {
        use ort::value::Tensor;

        let shape = vec![1_i64, features.len() as i64];
        Tensor::from_array((shape, features.to_vec())).context("Failed to create input tensor")
    }

    /// Extract the fraud-class probability from session outputs.
    fn extract_probability(&self, outputs: &ort::session::SessionOutputs) -> Result<f64> {
        if let Some(output) = outputs.get(&self.proba_output) {
            let dtype = output.dtype();

            if let Ok(tensor) = output.try_extract_tensor::<f32>() {
                let (shape, data) = tensor;
                let prob = fraud_prob_from_tensor(&shape, data);
                debug!(model = %self.name, prob = prob, "Extracted from tensor");
                return Ok(prob);
            }

            if DynSequenceValueType::can_downcast(&dtype) {
                if let Ok(prob) = extract_from_sequence_map(output) {
                    return Ok(prob);
                }
            }
        }

        // Fallback: scan the remaining outputs.
        for (name, output) in outputs.iter() {
            if name.contains("label") {
                continue;
            }

            let dtype = output.dtype();

            if let Ok(tensor) = output.try_extract_tensor::<f32>() {
                let (shape, data) = tensor;
                let prob = fraud_prob_from_tensor(&shape, data);
                debug!(model = %self.name, output = %name, prob = prob, "Extracted from tensor (fallback)");
                return Ok(prob);
            }

            if DynSequenceValueType::can_downcast(&dtype) {
                if let Ok(prob) = extract_from_sequence_map(&output) {
                    return Ok(prob);
                }
            }
        }

        bail!("model produced no probability output")
    }

    /// Extract the label decision from session outputs.
    fn extract_label(&self, outputs: &ort::session::SessionOutputs) -> Result<bool> {
        if let Some(output) = outputs.get(&self.label_output) {
            if let Ok(tensor) = output.try_extract_tensor::<i64>() {
                let (_shape, data) = tensor;
                return data
                    .first()
                    .map(|&label| label != 0)
                    .context("empty label output");
            }

            if let Ok(tensor) = output.try_extract_tensor::<f32>() {
                let (_shape, data) = tensor;
                return data
                    .first()
                    .map(|&label| label >= 0.5)
                    .context("empty label output");
            }
        }

        bail!("model produced no label output")
    }
}

impl ScoringModel for OnnxScoringModel {
    fn predict(&self, features: &[f32]) -> Result<bool> {
        let input = self.input_tensor(features)?;
        let mut session = self
            .session
            .lock()
            .map_err(|e| anyhow::anyhow!("Lock error: {}", e))?;

        let outputs = session.run(ort::inputs![&self.input_name => input])?;
        self.extract_label(&outputs)
    }

    fn predict_proba(&self, features: &[f32]) -> Result<f64> {
        let input = self.input_tensor(features)?;
        let mut session = self
            .session
            .lock()
            .map_err(|e| anyhow::anyhow!("Lock error: {}", e))?;

        let outputs = session.run(ort::inputs![&self.input_name => input])?;
        self.extract_probability(&outputs)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Fraud-class probability from tensor data, for [batch, classes],
/// [batch, 1], [classes] and [1] shapes.
fn fraud_prob_from_tensor(shape: &ort::tensor::Shape, data: &[f32]) -> f64 {
    let dims: Vec<i64> = shape.iter().copied().collect();

    if dims.len() == 2 {
        let num_classes = dims[1] as usize;
        if num_classes >= 2 {
            return data[1] as f64;
        } else if num_classes == 1 {
            return data[0] as f64;
        }
    } else if dims.len() == 1 {
        let num_classes = dims[0] as usize;
        if num_classes >= 2 {
            return data[1] as f64;
        } else if num_classes == 1 {
            return data[0] as f64;
        }
    }

    data.last().map(|&v| v as f64).unwrap_or(0.5)
}

/// Probability from `seq(map(int64, float))` output format.
fn extract_from_sequence_map(output: &ort::value::DynValue) -> Result<f64> {
    let allocator = Allocator::default();

    let sequence = output
        .downcast_ref::<DynSequenceValueType>()
        .map_err(|e| anyhow::anyhow!("Failed to downcast to sequence: {}", e))?;

    let maps = sequence.try_extract_sequence::<DynMapValueType>(&allocator)?;

    if maps.is_empty() {
        bail!("Empty sequence");
    }

    // batch_size is always 1 here
    let kv_pairs = maps[0].try_extract_key_values::<i64, f32>()?;

    for (class_id, prob) in &kv_pairs {
        if *class_id == 1 {
            return Ok(*prob as f64);
        }
    }

    for (class_id, prob) in &kv_pairs {
        if *class_id == 0 {
            return Ok(1.0 - *prob as f64);
        }
    }

    bail!("No probability found in map")
}
