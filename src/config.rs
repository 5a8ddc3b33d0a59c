//! Configuration management for the prediction service

use crate::types::ModelMetadata;
use anyhow::{Context, Result};
use config::{Config, File};
use serde::Deserialize;
use std::path::Path;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub model: ModelConfig,
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,
    /// Listen port
    pub port: u16,
    /// Per-request deadline in milliseconds
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

/// Model registry configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    /// Directory containing registered ONNX artifacts
    pub models_dir: String,
    /// Artifact identifier, or "latest" for the newest registered one
    #[serde(default = "default_identifier")]
    pub identifier: String,
    /// Number of threads for ONNX inference (default: 1)
    #[serde(default = "default_onnx_threads")]
    pub onnx_threads: usize,
    /// Metadata reported when the artifact carries no sidecar file
    #[serde(default)]
    pub fallback_metadata: ModelMetadata,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (json, pretty)
    pub format: String,
}

fn default_request_timeout_ms() -> u64 {
    2000
}

fn default_identifier() -> String {
    "latest".to_string()
}

fn default_onnx_threads() -> usize {
    1
}

impl AppConfig {
    /// Load configuration from file
    pub fn load() -> Result<Self> {
        Self::load_from_path("config/config.toml")
    }

    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
                request_timeout_ms: default_request_timeout_ms(),
            },
            model: ModelConfig {
                models_dir: "models".to_string(),
                identifier: default_identifier(),
                onnx_threads: default_onnx_threads(),
                fallback_metadata: ModelMetadata::default(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        }
    }
}
