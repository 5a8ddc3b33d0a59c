//! HTTP surface of the prediction service.

use crate::error::ServiceError;
use crate::metrics::ServiceMetrics;
use crate::service::PredictionService;
use crate::types::{ModelMetadata, TransactionInput, Verdict};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tracing::debug;

/// Application context constructed once at startup and injected into
/// every handler. No handler touches process-global state.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<PredictionService>,
    pub metrics: Arc<ServiceMetrics>,
}

/// Build the API router. CORS is permissive because the dashboard is a
/// browser client; requests running past `request_timeout` fail fast.
pub fn router(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/predict", post(predict))
        .route("/model-info", get(model_info))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": "Welcome to Fraud Detection API" }))
}

async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<TransactionInput>, JsonRejection>,
) -> Result<Json<Verdict>, ServiceError> {
    let start = Instant::now();

    // A body the extractor cannot deserialize never reaches the service,
    // but it still owes the client the `{"detail": ...}` error shape and
    // the failure counter a tick.
    let Json(tx) = payload.map_err(|rejection| {
        state.metrics.record_failure();
        rejection_error(rejection)
    })?;

    let customer_id = tx.customer_id.clone();

    // Inference is synchronous CPU work; run it off the async workers so
    // the request deadline can preempt a slow model.
    let service = state.service.clone();
    let result = tokio::task::spawn_blocking(move || service.predict(&tx))
        .await
        .map_err(|e| ServiceError::Prediction(e.to_string()))?;

    match result {
        Ok(verdict) => {
            let processing_time = start.elapsed();
            state.metrics.record_prediction(
                processing_time,
                verdict.fraud_probability,
                verdict.is_fraud,
            );

            debug!(
                customer_id = %customer_id,
                fraud_probability = verdict.fraud_probability,
                is_fraud = verdict.is_fraud,
                processing_time_us = processing_time.as_micros(),
                "Prediction served"
            );

            Ok(Json(verdict))
        }
        Err(e) => {
            state.metrics.record_failure();
            Err(e)
        }
    }
}

/// Map a body rejection into the service taxonomy: a body that fails to
/// deserialize (absent or mistyped field) is a schema mismatch, anything
/// else about the request envelope is a validation failure.
fn rejection_error(rejection: JsonRejection) -> ServiceError {
    let detail = rejection.body_text();
    match rejection {
        JsonRejection::JsonDataError(_) => ServiceError::SchemaMismatch(detail),
        _ => ServiceError::Validation(detail),
    }
}

async fn model_info(State(state): State<AppState>) -> Json<ModelMetadata> {
    Json(state.service.model_info().clone())
}
