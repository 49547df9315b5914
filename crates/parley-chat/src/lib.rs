//! Streaming conversations with tool use
//!
//! A conversation request is validated, then handed to the
//! [`Orchestrator`], which alternates between generating with the
//! inference backend and running the tools the model asks for. Every
//! delta is relayed to the client as it arrives.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

pub mod accumulator;
mod error;
mod handler;
pub mod orchestrator;
pub mod relay;
mod request;
mod state;

pub use accumulator::{ToolCallAccumulator, ToolCallRecord, accumulate};
pub use error::ChatError;
pub use handler::chat_router;
pub use orchestrator::{ConversationOutcome, Orchestrator};
pub use relay::{ChatEvent, OutboundFrame, RelayReceiver, RelaySender};
pub use request::ConversationRequest;
pub use state::ChatState;
