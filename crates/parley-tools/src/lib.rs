//! Tools the model can call during a conversation
//!
//! Each [`Tool`] wraps one backing service. The [`ToolRegistry`] decides
//! which tools are offered from the current [`ToolSettings`] and runs
//! calls under a timeout.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod args;
mod error;
pub mod news;
pub mod portfolio;
mod registry;
pub mod search;

use async_trait::async_trait;
use parley_llm::ToolDescriptor;
use parley_settings::{FeedCatalog, ToolSettings};

pub use error::ToolError;
pub use registry::ToolRegistry;

/// Something that can run tool calls on the model's behalf
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    /// Descriptors of the tools currently enabled, in a stable order
    async fn list_enabled_tools(&self) -> Vec<ToolDescriptor>;

    /// Run one call with its raw JSON argument string
    async fn execute(&self, name: &str, arguments: &str) -> Result<String, ToolError>;
}

/// One callable tool
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &'static str;

    fn is_enabled(&self, settings: &ToolSettings) -> bool;

    /// Descriptor offered to the model
    ///
    /// Receives the feed catalog snapshot taken for this listing.
    fn descriptor(&self, feeds: &FeedCatalog) -> ToolDescriptor;

    async fn call(&self, args: &serde_json::Map<String, serde_json::Value>) -> Result<String, ToolError>;
}
