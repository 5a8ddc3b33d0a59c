//! Fraud Detection API - Main Entry Point
//!
//! Loads the scoring model from the registry, then serves the prediction
//! contract over HTTP. A model that fails to load is fatal: the listener
//! is never bound without one.

use anyhow::{Context, Result};
use fraud_detection_api::{
    api::{self, AppState},
    config::AppConfig,
    metrics::{MetricsReporter, ServiceMetrics},
    model::ModelRegistry,
    service::PredictionService,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = AppConfig::load()?;

    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("fraud_detection_api={}", config.logging.level))
    });

    if config.logging.format == "json" {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    info!("Starting Fraud Detection API");
    info!(
        models_dir = %config.model.models_dir,
        identifier = %config.model.identifier,
        "Configuration loaded"
    );

    // Resolve and load the model before accepting any traffic
    let registry = ModelRegistry::new(&config.model.models_dir, config.model.onnx_threads);
    let (model, metadata) = registry
        .load(&config.model.identifier, &config.model.fallback_metadata)
        .context("refusing to serve without a loaded model")?;

    let service = Arc::new(PredictionService::new(Arc::new(model), metadata));
    info!(
        model = %service.model_name(),
        version = %service.model_info().model_version,
        "Scoring model ready"
    );

    // Initialize metrics and periodic reporter
    let metrics = Arc::new(ServiceMetrics::new());
    let reporter_metrics = metrics.clone();
    tokio::spawn(async move {
        let reporter = MetricsReporter::new(reporter_metrics, 30);
        reporter.start().await;
    });

    let state = AppState { service, metrics };
    let app = api::router(
        state,
        Duration::from_millis(config.server.request_timeout_ms),
    );

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("failed to bind listener")?;

    info!(addr = %addr, "Prediction API listening");

    axum::serve(listener, app).await?;

    Ok(())
}
