use serde::Serialize;

/// Normalized event from one streamed inference round
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseEvent {
    ContentDelta(String),
    ToolCallDelta(ToolCallDelta),
    /// Terminal: the round finished
    Completion(CompletionReason),
    /// Terminal: the round failed
    Error(String),
}

impl ResponseEvent {
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completion(_) | Self::Error(_))
    }
}

/// Fragment of a tool call as streamed by the backend
///
/// Only the first fragment of a call carries its id and name; later
/// fragments carry argument text alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ToolCallDelta {
    pub call_id: String,
    pub tool_type: String,
    pub function_name: String,
    pub arguments_fragment: String,
}

/// Why a round or conversation stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionReason {
    /// Stream ended without an explicit reason
    None,
    ToolCalls,
    Stop,
    Length,
    Cancelled,
    Error,
}

impl CompletionReason {
    /// Wire name, absent for [`CompletionReason::None`]
    pub const fn as_str(self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::ToolCalls => Some("tool_calls"),
            Self::Stop => Some("stop"),
            Self::Length => Some("length"),
            Self::Cancelled => Some("cancelled"),
            Self::Error => Some("error"),
        }
    }
}
