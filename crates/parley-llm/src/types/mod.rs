//! Backend-neutral request, message and event types

pub mod event;
pub mod message;
pub mod model;
pub mod request;
pub mod tool;

pub use event::{CompletionReason, ResponseEvent, ToolCallDelta};
pub use message::{FunctionCall, Message, Role, ToolCall};
pub use model::ModelInfo;
pub use request::CompletionRequest;
pub use tool::ToolDescriptor;
