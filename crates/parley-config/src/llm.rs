use std::time::Duration;

use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

const DEFAULT_BASE_URL: &str = "http://localhost:8080/v1";

/// OpenAI-compatible inference backend
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct LlmConfig {
    /// Base URL that `/chat/completions` and `/models` are appended to
    pub base_url: Url,
    /// Bearer token, for backends that require one
    pub api_key: Option<SecretString>,
    /// Time allowed to establish the upstream connection
    #[serde(with = "crate::duration")]
    pub connect_timeout: Duration,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("valid default URL"),
            api_key: None,
            connect_timeout: Duration::from_secs(10),
        }
    }
}
