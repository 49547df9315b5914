use thiserror::Error;

/// Why a tool call produced no result
///
/// These never abort a conversation; the message is handed back to the
/// model as the tool's output.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Argument string is not a JSON object
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("unknown tool: {0}")]
    UnknownTool(String),

    #[error("{0} parameter is required")]
    MissingArgument(&'static str),

    #[error("invalid {name}: {reason}")]
    InvalidArgument { name: &'static str, reason: String },

    /// Backing service failed, timed out or answered with garbage
    #[error("{0}")]
    UpstreamFailure(String),
}

impl ToolError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            name,
            reason: reason.into(),
        }
    }

    /// Short label for logs and metrics
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::InvalidArguments(_) => "invalid_arguments",
            Self::UnknownTool(_) => "unknown_tool",
            Self::MissingArgument(_) => "missing_argument",
            Self::InvalidArgument { .. } => "invalid_argument",
            Self::UpstreamFailure(_) => "upstream_failure",
        }
    }
}
