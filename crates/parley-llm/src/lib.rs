//! Streaming client for OpenAI-compatible inference backends
//!
//! A [`Transport`] turns one completion request into an ordered, finite
//! sequence of [`ResponseEvent`]s delivered over a bounded channel. The
//! sequence always ends with exactly one completion or error event.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

pub mod convert;
pub mod error;
pub mod protocol;
pub mod transport;
pub mod types;

pub use error::LlmError;
pub use transport::{OpenAiTransport, Transport};
pub use types::{
    CompletionReason, CompletionRequest, FunctionCall, Message, ModelInfo, ResponseEvent, Role, ToolCall,
    ToolCallDelta, ToolDescriptor,
};
