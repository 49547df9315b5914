use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use indexmap::IndexMap;
use parley_config::ToolsConfig;
use parley_llm::ToolDescriptor;
use parley_settings::SettingsStore;
use parley_telemetry::KeyValue;
use parley_telemetry::metrics::{ToolMetrics, record_duration};
use serde_json::Value;

use crate::news::{NewsClient, NewsTool};
use crate::portfolio::{PortfolioClient, PortfolioTool};
use crate::search::{SearchClient, WebSearchTool};
use crate::{Tool, ToolError, ToolExecutor};

/// Registered tools, gated by the runtime tool settings
pub struct ToolRegistry {
    tools: IndexMap<&'static str, Arc<dyn Tool>>,
    settings: SettingsStore,
    timeout: Duration,
    metrics: ToolMetrics,
}

impl ToolRegistry {
    /// Empty registry; tools are listed in registration order
    pub fn new(settings: SettingsStore, timeout: Duration) -> Self {
        Self {
            tools: IndexMap::new(),
            settings,
            timeout,
            metrics: ToolMetrics::new(),
        }
    }

    /// Registry with web search, news and portfolio analysis
    pub fn from_config(config: &ToolsConfig, settings: SettingsStore) -> anyhow::Result<Self> {
        let search = SearchClient::new(&config.search)?;
        let news = NewsClient::new(&config.news)?;
        let portfolio = PortfolioClient::new(&config.portfolio)?;

        Ok(Self::new(settings.clone(), config.timeout)
            .with_tool(WebSearchTool::new(search))
            .with_tool(NewsTool::new(news, settings))
            .with_tool(PortfolioTool::new(portfolio)))
    }

    #[must_use]
    pub fn with_tool(mut self, tool: impl Tool + 'static) -> Self {
        self.tools.insert(tool.name(), Arc::new(tool));
        self
    }

    async fn dispatch(&self, name: &str, arguments: &str) -> Result<String, ToolError> {
        let args = match serde_json::from_str::<Value>(arguments) {
            Ok(Value::Object(args)) => args,
            Ok(_) => return Err(ToolError::InvalidArguments("expected a JSON object".to_owned())),
            Err(e) => return Err(ToolError::InvalidArguments(e.to_string())),
        };

        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_owned()))?;

        if !tool.is_enabled(&self.settings.tool_settings().await) {
            tracing::debug!(tool = name, "running a tool that was disabled after it was offered");
        }

        tokio::time::timeout(self.timeout, tool.call(&args))
            .await
            .map_err(|_| ToolError::UpstreamFailure(format!("{name} timed out after {:?}", self.timeout)))?
    }
}

#[async_trait]
impl ToolExecutor for ToolRegistry {
    async fn list_enabled_tools(&self) -> Vec<ToolDescriptor> {
        let settings = self.settings.tool_settings().await;
        let feeds = self.settings.feeds().await;

        self.tools
            .values()
            .filter(|tool| tool.is_enabled(&settings))
            .map(|tool| tool.descriptor(&feeds))
            .collect()
    }

    async fn execute(&self, name: &str, arguments: &str) -> Result<String, ToolError> {
        let started = Instant::now();
        let result = self.dispatch(name, arguments).await;

        let outcome = match &result {
            Ok(_) => "success",
            Err(e) => e.kind(),
        };
        let attributes = [KeyValue::new("tool", name.to_owned()), KeyValue::new("outcome", outcome)];
        self.metrics.calls.add(1, &attributes);
        record_duration(&self.metrics.duration, started, &attributes);

        let duration_ms = started.elapsed().as_millis();
        match &result {
            Ok(output) => {
                tracing::info!(tool = name, outcome, duration_ms, bytes = output.len(), "tool call finished");
            }
            Err(e) => tracing::warn!(tool = name, outcome, duration_ms, error = %e, "tool call failed"),
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use parley_config::SettingsConfig;
    use parley_settings::{FeedCatalog, ToolSettings};
    use serde_json::{Map, json};

    use super::*;

    /// Echoes its arguments, optionally after a delay
    struct Echo {
        name: &'static str,
        delay: Duration,
        enabled: fn(&ToolSettings) -> bool,
    }

    #[async_trait]
    impl Tool for Echo {
        fn name(&self) -> &'static str {
            self.name
        }

        fn is_enabled(&self, settings: &ToolSettings) -> bool {
            (self.enabled)(settings)
        }

        fn descriptor(&self, _feeds: &FeedCatalog) -> ToolDescriptor {
            ToolDescriptor {
                name: self.name.to_owned(),
                description: format!("echo as {}", self.name),
                parameters: json!({"type": "object"}),
            }
        }

        async fn call(&self, args: &Map<String, Value>) -> Result<String, ToolError> {
            tokio::time::sleep(self.delay).await;
            Ok(Value::Object(args.clone()).to_string())
        }
    }

    fn echo(name: &'static str, enabled: fn(&ToolSettings) -> bool) -> Echo {
        Echo {
            name,
            delay: Duration::ZERO,
            enabled,
        }
    }

    async fn registry(dir: &tempfile::TempDir) -> ToolRegistry {
        let settings = SettingsStore::open(&SettingsConfig {
            directory: dir.path().to_path_buf(),
        })
        .await
        .unwrap();

        ToolRegistry::new(settings, Duration::from_millis(200))
            .with_tool(echo("web_search", |s| s.enable_web_search))
            .with_tool(echo("get_news", |s| s.enable_feeds))
            .with_tool(echo("analyze_portfolio", |s| s.enable_portfolio))
    }

    fn names(tools: &[ToolDescriptor]) -> Vec<&str> {
        tools.iter().map(|t| t.name.as_str()).collect()
    }

    #[tokio::test]
    async fn nothing_is_offered_by_default() {
        let dir = tempfile::tempdir().unwrap();
        let registry = registry(&dir).await;

        assert!(registry.list_enabled_tools().await.is_empty());
    }

    #[tokio::test]
    async fn listing_follows_current_settings_in_registration_order() {
        let dir = tempfile::tempdir().unwrap();
        let registry = registry(&dir).await;

        registry
            .settings
            .set_tool_settings(ToolSettings {
                enable_web_search: true,
                enable_feeds: false,
                enable_portfolio: true,
            })
            .await
            .unwrap();

        assert_eq!(
            names(&registry.list_enabled_tools().await),
            vec!["web_search", "analyze_portfolio"]
        );

        registry
            .settings
            .set_tool_settings(ToolSettings {
                enable_web_search: false,
                enable_feeds: true,
                enable_portfolio: false,
            })
            .await
            .unwrap();

        assert_eq!(names(&registry.list_enabled_tools().await), vec!["get_news"]);
    }

    #[tokio::test]
    async fn malformed_arguments_are_rejected_before_lookup() {
        let dir = tempfile::tempdir().unwrap();
        let registry = registry(&dir).await;

        let err = registry.execute("no_such_tool", "{\"query\":").await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));

        let err = registry.execute("web_search", "[1, 2]").await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));

        let err = registry.execute("web_search", "").await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }

    #[tokio::test]
    async fn unknown_tool() {
        let dir = tempfile::tempdir().unwrap();
        let registry = registry(&dir).await;

        let err = registry.execute("delete_everything", "{}").await.unwrap_err();

        assert!(matches!(err, ToolError::UnknownTool(name) if name == "delete_everything"));
    }

    #[tokio::test]
    async fn enablement_is_not_rechecked_at_execution() {
        let dir = tempfile::tempdir().unwrap();
        let registry = registry(&dir).await;

        let output = registry.execute("web_search", r#"{"query":"x"}"#).await.unwrap();

        assert_eq!(output, r#"{"query":"x"}"#);
    }

    #[tokio::test]
    async fn slow_tool_times_out_as_upstream_failure() {
        let dir = tempfile::tempdir().unwrap();
        let registry = registry(&dir).await.with_tool(Echo {
            name: "slow",
            delay: Duration::from_secs(5),
            enabled: |_| true,
        });

        let err = registry.execute("slow", "{}").await.unwrap_err();

        assert!(matches!(err, ToolError::UpstreamFailure(message) if message.contains("timed out")));
    }
}
