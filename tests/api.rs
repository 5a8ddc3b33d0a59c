//! HTTP contract tests for the prediction API.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use fraud_detection_api::api::{self, AppState};
use fraud_detection_api::metrics::ServiceMetrics;
use fraud_detection_api::model::{ScoringModel, StubModel};
use fraud_detection_api::service::PredictionService;
use fraud_detection_api::types::ModelMetadata;
use http_body_util::BodyExt;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

fn app_with_deadline(model: Arc<dyn ScoringModel>, request_timeout: Duration) -> Router {
    let state = AppState {
        service: Arc::new(PredictionService::new(model, ModelMetadata::default())),
        metrics: Arc::new(ServiceMetrics::new()),
    };
    api::router(state, request_timeout)
}

fn app_with_model(model: Arc<dyn ScoringModel>) -> Router {
    app_with_deadline(model, Duration::from_secs(5))
}

fn app(probability: f64) -> Router {
    app_with_model(Arc::new(StubModel::new(probability)))
}

fn predict_request(body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/predict")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn valid_transaction() -> serde_json::Value {
    serde_json::json!({
        "amount": 120.0,
        "time": 10.0,
        "merchant_category": "Retail",
        "customer_id": "C1",
        "location": "US"
    })
}

#[tokio::test]
async fn root_returns_welcome_message() {
    let response = app(0.5)
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Welcome to Fraud Detection API");
}

#[tokio::test]
async fn well_formed_transaction_gets_verdict() {
    let response = app(0.5)
        .oneshot(predict_request(valid_transaction()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["fraud_probability"], 0.5);
    assert_eq!(body["is_fraud"], true); // stub flags the boundary
    assert_eq!(body["confidence"], 0.5);
}

#[tokio::test]
async fn low_probability_verdict_is_not_fraud() {
    let response = app(0.1)
        .oneshot(predict_request(valid_transaction()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["fraud_probability"], 0.1);
    assert_eq!(body["is_fraud"], false);
}

#[tokio::test]
async fn negative_amount_is_bad_request() {
    let mut tx = valid_transaction();
    tx["amount"] = serde_json::json!(-5.0);

    let response = app(0.5).oneshot(predict_request(tx)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["detail"].as_str().unwrap().contains("amount"));
}

#[tokio::test]
async fn out_of_range_time_is_bad_request() {
    let mut tx = valid_transaction();
    tx["time"] = serde_json::json!(24.0);

    let response = app(0.5).oneshot(predict_request(tx)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_category_is_unprocessable() {
    let mut tx = valid_transaction();
    tx["merchant_category"] = serde_json::json!("Casino");

    let response = app(0.5).oneshot(predict_request(tx)).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert!(body["detail"].as_str().unwrap().contains("Casino"));
}

#[tokio::test]
async fn missing_field_is_schema_mismatch_with_detail_body() {
    let tx = serde_json::json!({ "amount": 10.0, "time": 1.0 });

    let response = app(0.5).oneshot(predict_request(tx)).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    let detail = body["detail"].as_str().expect("error body carries detail");
    assert!(detail.contains("missing field"));
}

#[tokio::test]
async fn malformed_json_body_gets_detail_body() {
    let request = Request::builder()
        .method("POST")
        .uri("/predict")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let response = app(0.5).oneshot(request).await.unwrap();

    assert!(response.status().is_client_error());
    let body = body_json(response).await;
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn rejected_body_counts_as_failure() {
    let metrics = Arc::new(ServiceMetrics::new());
    let state = AppState {
        service: Arc::new(PredictionService::new(
            Arc::new(StubModel::new(0.5)),
            ModelMetadata::default(),
        )),
        metrics: metrics.clone(),
    };
    let app = api::router(state, Duration::from_secs(5));

    let tx = serde_json::json!({ "amount": 10.0 });
    let response = app.oneshot(predict_request(tx)).await.unwrap();

    assert!(response.status().is_client_error());
    assert_eq!(metrics.failures.load(Ordering::Relaxed), 1);
}

/// Model that takes longer than any reasonable request deadline.
struct SlowModel;

impl ScoringModel for SlowModel {
    fn predict(&self, _features: &[f32]) -> anyhow::Result<bool> {
        Ok(false)
    }

    fn predict_proba(&self, _features: &[f32]) -> anyhow::Result<f64> {
        std::thread::sleep(Duration::from_millis(500));
        Ok(0.1)
    }

    fn name(&self) -> &str {
        "slow"
    }
}

#[tokio::test]
async fn slow_model_fails_fast_at_deadline() {
    let app = app_with_deadline(Arc::new(SlowModel), Duration::from_millis(50));

    let start = std::time::Instant::now();
    let response = app.oneshot(predict_request(valid_transaction())).await.unwrap();

    assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
    assert!(
        start.elapsed() < Duration::from_millis(450),
        "request was not preempted at the deadline"
    );
}

#[tokio::test]
async fn model_info_metrics_populated_and_in_range() {
    let response = app(0.5)
        .oneshot(
            Request::builder()
                .uri("/model-info")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;

    assert!(body["model_version"].is_string());
    assert!(body["last_updated"].is_string());

    for field in ["accuracy", "precision", "recall", "f1_score"] {
        let value = body["metrics"][field]
            .as_f64()
            .unwrap_or_else(|| panic!("metric {field} missing"));
        assert!((0.0..=1.0).contains(&value), "{field} out of range: {value}");
    }
}

/// Probability derived from the amount feature, so each response can be
/// matched back to the request that produced it.
struct AmountEchoModel;

impl ScoringModel for AmountEchoModel {
    fn predict(&self, features: &[f32]) -> anyhow::Result<bool> {
        Ok(self.predict_proba(features)? >= 0.5)
    }

    fn predict_proba(&self, features: &[f32]) -> anyhow::Result<f64> {
        Ok((features[0] as f64 / 1000.0).clamp(0.0, 1.0))
    }

    fn name(&self) -> &str {
        "amount-echo"
    }
}

#[tokio::test]
async fn concurrent_requests_get_their_own_verdicts() {
    let app = app_with_model(Arc::new(AmountEchoModel));

    let mut handles = Vec::new();
    for i in 1..=8u32 {
        let app = app.clone();
        let amount = (i * 100) as f64;
        handles.push(tokio::spawn(async move {
            let mut tx = valid_transaction();
            tx["amount"] = serde_json::json!(amount);
            tx["customer_id"] = serde_json::json!(format!("C{i}"));

            let response = app.oneshot(predict_request(tx)).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            (amount, body_json(response).await)
        }));
    }

    for handle in handles {
        let (amount, body) = handle.await.unwrap();
        let expected = amount as f32 as f64 / 1000.0;
        let got = body["fraud_probability"].as_f64().unwrap();
        assert!(
            (got - expected).abs() < 1e-9,
            "response for amount {amount} carried probability {got}"
        );
        assert_eq!(body["is_fraud"], expected >= 0.5);
    }
}
