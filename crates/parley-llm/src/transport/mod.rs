//! Streaming transports to inference backends

mod openai;

use async_trait::async_trait;
use tokio::sync::mpsc;

pub use self::openai::OpenAiTransport;
use crate::error::LlmError;
use crate::types::{CompletionRequest, ModelInfo, ResponseEvent};

/// A backend that streams completions
#[async_trait]
pub trait Transport: Send + Sync {
    /// Start one streamed round
    ///
    /// The returned receiver yields events in generation order and closes
    /// after exactly one [`ResponseEvent::Completion`] or
    /// [`ResponseEvent::Error`]. Connection problems are reported through
    /// the channel, not as an `Err`. Dropping the receiver stops the read.
    async fn open(&self, request: CompletionRequest) -> Result<mpsc::Receiver<ResponseEvent>, LlmError>;

    /// Models the backend can serve
    async fn list_models(&self) -> Result<Vec<ModelInfo>, LlmError>;
}
