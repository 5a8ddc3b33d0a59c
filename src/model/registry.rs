//! Model registry: resolves a versioned artifact at process start.
//!
//! The registry is a directory of exported ONNX artifacts. An identifier
//! names an artifact directly; `latest` resolves to the most recently
//! written one, mirroring how the training side registers new versions.

use crate::error::ServiceError;
use crate::model::onnx::OnnxScoringModel;
use crate::types::ModelMetadata;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{info, warn};

pub struct ModelRegistry {
    models_dir: PathBuf,
    onnx_threads: usize,
}

impl ModelRegistry {
    pub fn new<P: AsRef<Path>>(models_dir: P, onnx_threads: usize) -> Self {
        Self {
            models_dir: models_dir.as_ref().to_path_buf(),
            onnx_threads,
        }
    }

    /// Load the model for `identifier`, with its metadata.
    ///
    /// Failure here is fatal to the caller: the service must not begin
    /// accepting requests without a loaded model.
    pub fn load(
        &self,
        identifier: &str,
        fallback_metadata: &ModelMetadata,
    ) -> Result<(OnnxScoringModel, ModelMetadata), ServiceError> {
        let path = self.resolve(identifier)?;

        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(identifier)
            .to_string();

        let model = OnnxScoringModel::load(&path, &name, self.onnx_threads)
            .map_err(|e| ServiceError::ModelUnavailable(e.to_string()))?;

        let metadata = self.read_metadata(&path, fallback_metadata);

        info!(
            model = %name,
            version = %metadata.model_version,
            "Model resolved from registry"
        );

        Ok((model, metadata))
    }

    /// Resolve an identifier to an artifact path.
    fn resolve(&self, identifier: &str) -> Result<PathBuf, ServiceError> {
        if identifier != "latest" {
            let path = self.models_dir.join(format!("{identifier}.onnx"));
            if path.is_file() {
                return Ok(path);
            }
            return Err(ServiceError::ModelUnavailable(format!(
                "no artifact registered for identifier {identifier:?}"
            )));
        }

        let entries = fs::read_dir(&self.models_dir).map_err(|e| {
            ServiceError::ModelUnavailable(format!("cannot read model registry: {e}"))
        })?;

        let mut newest: Option<(SystemTime, PathBuf)> = None;
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("onnx") {
                continue;
            }
            let modified = entry
                .metadata()
                .and_then(|m| m.modified())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            if newest.as_ref().map(|(t, _)| modified > *t).unwrap_or(true) {
                newest = Some((modified, path));
            }
        }

        newest.map(|(_, path)| path).ok_or_else(|| {
            ServiceError::ModelUnavailable("registry contains no model artifacts".to_string())
        })
    }

    /// Metadata for an artifact: sidecar JSON next to the model when the
    /// training pipeline exported one, configured fallback otherwise.
    fn read_metadata(&self, model_path: &Path, fallback: &ModelMetadata) -> ModelMetadata {
        let sidecar = model_path.with_extension("metadata.json");

        match fs::read_to_string(&sidecar) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(metadata) => metadata,
                Err(e) => {
                    warn!(error = %e, "Malformed model metadata sidecar, using fallback");
                    fallback.clone()
                }
            },
            Err(_) => fallback.clone(),
        }
    }
}
