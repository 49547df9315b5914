//! Programmatic configuration builder for integration tests

use std::net::SocketAddr;
use std::time::Duration;

use parley_config::{ChatConfig, Config, HealthConfig, LlmConfig, ServerConfig, SettingsConfig, ToolsConfig};
use tempfile::TempDir;
use url::Url;

/// Builder for constructing test configurations
///
/// Owns a scratch settings directory that lives as long as the server.
pub struct ConfigBuilder {
    config: Config,
    settings_dir: TempDir,
}

impl ConfigBuilder {
    /// Create a new builder with minimal defaults
    pub fn new() -> Self {
        let settings_dir = tempfile::tempdir().expect("temp dir");

        Self {
            config: Config {
                server: ServerConfig {
                    listen_address: Some(SocketAddr::from(([127, 0, 0, 1], 0))),
                    health: HealthConfig::default(),
                    cors: None,
                },
                llm: LlmConfig::default(),
                chat: ChatConfig::default(),
                tools: ToolsConfig::default(),
                settings: SettingsConfig {
                    directory: settings_dir.path().to_path_buf(),
                },
                telemetry: None,
            },
            settings_dir,
        }
    }

    /// Point the inference backend at a mock
    pub fn with_llm(mut self, base_url: &str) -> Self {
        self.config.llm.base_url = base_url.parse().expect("valid URL");
        self
    }

    /// Point the web search tool at a mock
    pub fn with_search(mut self, url: &str) -> Self {
        self.config.tools.search.url = Url::parse(url).expect("valid URL");
        self
    }

    pub fn with_chat_timeout(mut self, timeout: Duration) -> Self {
        self.config.chat.timeout = timeout;
        self
    }

    pub fn with_max_rounds(mut self, rounds: u32) -> Self {
        self.config.chat.max_rounds = rounds;
        self
    }

    /// Disable health endpoint
    pub fn without_health(mut self) -> Self {
        self.config.server.health.enabled = false;
        self
    }

    /// Build the final config, handing over the settings directory
    pub fn build(self) -> (Config, TempDir) {
        (self.config, self.settings_dir)
    }
}
