//! Error taxonomy for the prediction service.
//!
//! Request-scoped failures map to distinct HTTP status codes; the full
//! cause is logged while the client sees a `{"detail": ...}` body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::{error, warn};

/// Failures the prediction service can surface.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Malformed or out-of-range transaction input.
    #[error("invalid transaction: {0}")]
    Validation(String),

    /// The request does not match the training-time schema: an absent
    /// required field, or a categorical value with no training-time
    /// encoding.
    #[error("schema mismatch: {0}")]
    SchemaMismatch(String),

    /// The model failed to load at startup. Fatal: the service must not
    /// begin accepting requests.
    #[error("model unavailable: {0}")]
    ModelUnavailable(String),

    /// Any failure during inference, including malformed model output.
    #[error("prediction failed: {0}")]
    Prediction(String),
}

impl ServiceError {
    /// Schema mismatch for a categorical value the training set never
    /// contained.
    pub fn unknown_category(field: &str, value: &str) -> Self {
        ServiceError::SchemaMismatch(format!(
            "no training-time encoding for {field} value {value:?}"
        ))
    }

    /// HTTP status for request-scoped reporting.
    pub fn status(&self) -> StatusCode {
        match self {
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::SchemaMismatch(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ServiceError::ModelUnavailable(_) | ServiceError::Prediction(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            error!(error = %self, "request failed");
        } else {
            warn!(error = %self, "request rejected");
        }

        let body = Json(serde_json::json!({ "detail": self.to_string() }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ServiceError::Validation("amount".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::unknown_category("merchant_category", "Casino").status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ServiceError::SchemaMismatch("missing field `location`".into()).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ServiceError::Prediction("boom".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_schema_mismatch_message_names_field() {
        let err = ServiceError::unknown_category("location", "MARS");
        let msg = err.to_string();
        assert!(msg.contains("location"));
        assert!(msg.contains("MARS"));
    }
}
