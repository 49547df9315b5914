use std::path::PathBuf;

use http::StatusCode;
use parley_core::HttpError;
use thiserror::Error;

/// Errors raised while loading, validating, or persisting settings
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Settings file exists but could not be read
    #[error("failed to read settings file {}: {source}", path.display())]
    Read { path: PathBuf, source: std::io::Error },

    /// Settings file is not valid JSON for its type
    #[error("failed to parse settings file {}: {source}", path.display())]
    Parse { path: PathBuf, source: serde_json::Error },

    /// Settings could not be written back to disk
    #[error("failed to write settings file {}: {source}", path.display())]
    Write { path: PathBuf, source: std::io::Error },

    /// Settings could not be serialized
    #[error("failed to encode settings: {0}")]
    Encode(#[source] serde_json::Error),

    /// Caller supplied a value that violates a settings invariant
    #[error("invalid settings: {0}")]
    Invalid(String),
}

impl HttpError for SettingsError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Invalid(_) => StatusCode::BAD_REQUEST,
            Self::Read { .. } | Self::Parse { .. } | Self::Write { .. } | Self::Encode(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_type(&self) -> &str {
        match self {
            Self::Invalid(_) => "invalid_request_error",
            _ => "settings_error",
        }
    }

    fn client_message(&self) -> String {
        match self {
            Self::Invalid(_) => self.to_string(),
            _ => "failed to persist settings".to_owned(),
        }
    }
}
