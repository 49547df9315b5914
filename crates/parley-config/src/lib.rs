#![allow(clippy::must_use_candidate)]

pub mod chat;
pub mod cors;
mod duration;
mod env;
pub mod health;
pub mod llm;
mod loader;
pub mod server;
pub mod settings;
pub mod telemetry;
pub mod tools;

use serde::Deserialize;

pub use chat::*;
pub use cors::*;
pub use health::*;
pub use llm::*;
pub use server::*;
pub use settings::*;
pub use telemetry::TelemetryConfig;
pub use tools::*;

/// Top-level Parley configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Inference backend configuration
    #[serde(default)]
    pub llm: LlmConfig,
    /// Conversation limits
    #[serde(default)]
    pub chat: ChatConfig,
    /// Tool backend configuration
    #[serde(default)]
    pub tools: ToolsConfig,
    /// Location of the runtime settings files
    #[serde(default)]
    pub settings: SettingsConfig,
    /// Telemetry configuration
    #[serde(default)]
    pub telemetry: Option<TelemetryConfig>,
}
