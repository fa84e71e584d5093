use axum_helpers::AppError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IntelligenceError {
    #[error("{0}")]
    NotConfigured(String),

    #[error("Anomaly not found: {0}")]
    AnomalyNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Completion request failed: {0}")]
    Completion(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type IntelligenceResult<T> = Result<T, IntelligenceError>;

impl IntelligenceError {
    /// Map to an HTTP error for `operation`.
    ///
    /// Configuration, not-found and input errors keep their own category.
    /// Everything else is logged in full and answered with `failure_message`
    /// so upstream and provider details stay out of responses.
    pub fn into_app_error(self, operation: &str, failure_message: &str) -> AppError {
        match self {
            IntelligenceError::NotConfigured(msg) => AppError::ServiceUnavailable(msg),
            IntelligenceError::AnomalyNotFound(_) => {
                AppError::NotFound("Anomaly not found".to_string())
            }
            IntelligenceError::InvalidInput(msg) => AppError::BadRequest(msg),
            other => {
                tracing::error!(operation, error = %other, "{} failed", operation);
                AppError::InternalServerError(failure_message.to_string())
            }
        }
    }
}

impl From<IntelligenceError> for AppError {
    fn from(err: IntelligenceError) -> Self {
        err.into_app_error("request", "Request failed")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_not_configured_is_service_unavailable() {
        let err = IntelligenceError::NotConfigured("ANTHROPIC_API_KEY not configured".into())
            .into_app_error("analysis", "Analysis failed");
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(err.to_string().contains("ANTHROPIC_API_KEY"));
    }

    #[test]
    fn test_anomaly_not_found_is_404() {
        let err = IntelligenceError::AnomalyNotFound("a-1".into())
            .into_app_error("investigation", "Investigation failed");
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_invalid_input_is_400() {
        let err = IntelligenceError::InvalidInput("bad".into()).into_app_error("ask", "x");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_other_errors_hide_details() {
        let err = IntelligenceError::Completion("upstream said 529: overloaded".into())
            .into_app_error("analysis", "Analysis failed");
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        match err {
            AppError::InternalServerError(msg) => assert_eq!(msg, "Analysis failed"),
            other => panic!("unexpected {other:?}"),
        }
    }
}
