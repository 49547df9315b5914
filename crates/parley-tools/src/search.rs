//! Web search through a metasearch sidecar

use std::fmt::Write;

use async_trait::async_trait;
use parley_config::SearchConfig;
use parley_llm::ToolDescriptor;
use parley_settings::{FeedCatalog, ToolSettings};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use url::Url;

use crate::Tool;
use crate::args::{Arguments, count_arg, string_arg};
use crate::error::ToolError;

const DEFAULT_MAX_RESULTS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SearchResult {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub href: String,
    #[serde(default)]
    pub body: String,
}

/// Client for `GET /search?q=&max_results=`
#[derive(Debug, Clone)]
pub struct SearchClient {
    client: Client,
    base_url: Url,
}

impl SearchClient {
    pub fn new(config: &SearchConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build search client: {e}"))?;

        Ok(Self {
            client,
            base_url: config.url.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url.as_str().trim_end_matches('/'))
    }

    pub async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>, ToolError> {
        let max_results = max_results.to_string();

        let response = self
            .client
            .get(self.endpoint("search"))
            .query(&[("q", query), ("max_results", max_results.as_str())])
            .send()
            .await
            .map_err(|e| ToolError::UpstreamFailure(format!("search failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ToolError::UpstreamFailure(format!(
                "search failed: service returned {status}: {}",
                body.trim()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| ToolError::UpstreamFailure(format!("search failed: unreadable response: {e}")))
    }

    /// `GET /health` must answer 2xx
    pub async fn health(&self) -> Result<(), ToolError> {
        check_health(&self.client, &self.endpoint("health")).await
    }
}

pub(crate) async fn check_health(client: &Client, url: &str) -> Result<(), ToolError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| ToolError::UpstreamFailure(format!("health check failed: {e}")))?;

    if response.status().is_success() {
        Ok(())
    } else {
        Err(ToolError::UpstreamFailure(format!(
            "health check returned {}",
            response.status()
        )))
    }
}

/// `web_search` tool
pub struct WebSearchTool {
    client: SearchClient,
}

impl WebSearchTool {
    pub const fn new(client: SearchClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &'static str {
        "web_search"
    }

    fn is_enabled(&self, settings: &ToolSettings) -> bool {
        settings.enable_web_search
    }

    fn descriptor(&self, _feeds: &FeedCatalog) -> ToolDescriptor {
        ToolDescriptor {
            name: self.name().to_owned(),
            description: "Search the web for current information. Use this when you need up-to-date \
                          information or facts not in your training data."
                .to_owned(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "The search query to find information about"
                    },
                    "max_results": {
                        "type": "integer",
                        "description": "Maximum number of search results to return (default 5)"
                    }
                },
                "required": ["query"]
            }),
        }
    }

    async fn call(&self, args: &Arguments) -> Result<String, ToolError> {
        let query = string_arg(args, "query").ok_or(ToolError::MissingArgument("query"))?;
        let max_results = count_arg(args, "max_results", DEFAULT_MAX_RESULTS)?;

        let results = self.client.search(query, max_results).await?;

        Ok(format_results(query, &results))
    }
}

fn format_results(query: &str, results: &[SearchResult]) -> String {
    let mut out = format!("Search results for '{query}':\n\n");

    if results.is_empty() {
        out.push_str("No results found.\n");
    }

    for (i, result) in results.iter().enumerate() {
        let _ = write!(
            out,
            "{}. **{}**\n   URL: {}\n   {}\n\n",
            i + 1,
            result.title,
            result.href,
            result.body
        );
    }

    out
}
