use parley_llm::Message;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::error::ChatError;

/// Body of `POST /api/chat`
#[derive(Debug, Clone, Deserialize)]
pub struct ConversationRequest {
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub messages: Vec<Message>,
    /// Accepted for client compatibility; responses always stream
    #[serde(default)]
    pub stream: bool,
    /// Whether enabled tools are offered to the model
    #[serde(default = "default_tools")]
    pub tools: bool,
}

const fn default_tools() -> bool {
    true
}

impl ConversationRequest {
    /// Decode and validate a request body
    pub fn parse(body: &[u8]) -> Result<Self, ChatError> {
        let request: Self = parse_json(body)?;

        if request.model.trim().is_empty() {
            return Err(ChatError::InvalidRequest("model is required".to_owned()));
        }

        if request.messages.is_empty() {
            return Err(ChatError::InvalidRequest("messages array is required".to_owned()));
        }

        Ok(request)
    }
}

/// Decode a JSON body, reporting failures as a bad request
pub(crate) fn parse_json<T: DeserializeOwned>(body: &[u8]) -> Result<T, ChatError> {
    serde_json::from_slice(body).map_err(|e| ChatError::InvalidRequest(format!("invalid request body: {e}")))
}
