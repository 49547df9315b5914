use axum::Json;
use axum::response::{IntoResponse, Response};
use http::StatusCode;

/// Trait for domain errors that can be converted to HTTP responses
///
/// Implemented by each feature crate's error type. Handlers turn these
/// into JSON bodies through [`error_response`], so domain errors stay
/// free of routing concerns.
pub trait HttpError: std::error::Error {
    /// HTTP status code for this error
    fn status_code(&self) -> StatusCode;

    /// Machine-readable error type (e.g. `invalid_request_error`)
    fn error_type(&self) -> &str;

    /// Message safe to expose to API consumers
    fn client_message(&self) -> String;
}

/// Render an error as `{"error": {"message", "type"}}` with its status
pub fn error_response<E: HttpError + ?Sized>(error: &E) -> Response {
    let body = serde_json::json!({
        "error": {
            "message": error.client_message(),
            "type": error.error_type(),
        }
    });

    (error.status_code(), Json(body)).into_response()
}
