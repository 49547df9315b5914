use http::StatusCode;
use parley_core::HttpError;
use thiserror::Error;

/// Failures talking to the inference backend
#[derive(Debug, Error)]
pub enum LlmError {
    /// Backend was unreachable or answered with an error status
    #[error("upstream error: {0}")]
    Upstream(String),

    /// Request cannot be sent as given
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl HttpError for LlmError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_type(&self) -> &str {
        match self {
            Self::Upstream(_) => "upstream_error",
            Self::InvalidRequest(_) => "invalid_request_error",
            Self::Internal(_) => "internal_error",
        }
    }

    fn client_message(&self) -> String {
        match self {
            Self::Internal(_) => "an internal error occurred".to_owned(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_failures_are_bad_gateway() {
        let error = LlmError::Upstream("connection refused".to_owned());
        assert_eq!(error.status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(error.client_message(), "upstream error: connection refused");
    }

    #[test]
    fn internal_details_are_hidden() {
        let error = LlmError::Internal(anyhow::anyhow!("client builder exploded"));
        assert_eq!(error.client_message(), "an internal error occurred");
    }
}
