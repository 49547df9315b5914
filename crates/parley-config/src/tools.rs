use std::time::Duration;

use serde::Deserialize;
use url::Url;

/// Tool backends and execution limits
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ToolsConfig {
    /// Upper bound on a single tool execution
    #[serde(with = "crate::duration")]
    pub timeout: Duration,
    pub search: SearchConfig,
    pub news: NewsConfig,
    pub portfolio: PortfolioConfig,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            search: SearchConfig::default(),
            news: NewsConfig::default(),
            portfolio: PortfolioConfig::default(),
        }
    }
}

/// Web search service
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct SearchConfig {
    pub url: Url,
    #[serde(with = "crate::duration")]
    pub request_timeout: Duration,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            url: Url::parse("http://localhost:8000").expect("valid default URL"),
            request_timeout: Duration::from_secs(15),
        }
    }
}

/// RSS/Atom feed retrieval
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct NewsConfig {
    #[serde(with = "crate::duration")]
    pub request_timeout: Duration,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(15),
        }
    }
}

/// Portfolio analytics service
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct PortfolioConfig {
    pub url: Url,
    #[serde(with = "crate::duration")]
    pub request_timeout: Duration,
}

impl Default for PortfolioConfig {
    fn default() -> Self {
        Self {
            url: Url::parse("http://localhost:8081").expect("valid default URL"),
            request_timeout: Duration::from_secs(15),
        }
    }
}
