use axum::response::{IntoResponse, Response};
use http::StatusCode;
use parley_core::HttpError;
use parley_llm::LlmError;
use parley_settings::SettingsError;
use thiserror::Error;

/// Errors answered with a plain HTTP response, before any stream starts
#[derive(Debug, Error)]
pub enum ChatError {
    /// Body is not valid JSON or misses a required field
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Llm(#[from] LlmError),
}

impl HttpError for ChatError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::Settings(e) => e.status_code(),
            Self::Llm(e) => e.status_code(),
        }
    }

    fn error_type(&self) -> &str {
        match self {
            Self::InvalidRequest(_) => "invalid_request_error",
            Self::Settings(e) => e.error_type(),
            Self::Llm(e) => e.error_type(),
        }
    }

    fn client_message(&self) -> String {
        match self {
            Self::InvalidRequest(_) => self.to_string(),
            Self::Settings(e) => e.client_message(),
            Self::Llm(e) => e.client_message(),
        }
    }
}

impl IntoResponse for ChatError {
    fn into_response(self) -> Response {
        if self.status_code().is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        parley_core::error_response(&self)
    }
}
