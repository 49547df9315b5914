use super::{Message, ToolDescriptor};

/// One inference round
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    /// Tools offered this round; empty means none
    pub tools: Vec<ToolDescriptor>,
}
