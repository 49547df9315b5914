//! Portfolio analytics backed by the portfolio management service

mod format;
pub mod types;

use async_trait::async_trait;
use parley_config::PortfolioConfig;
use parley_llm::ToolDescriptor;
use parley_settings::{FeedCatalog, ToolSettings};
use reqwest::Client;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use serde_json::json;
use url::Url;

use self::types::{
    AllocationDeviations, Envelope, MarketContext, Opportunities, PortfolioSummary, Position, Recommendations,
    RiskMetrics,
};
use crate::Tool;
use crate::args::{Arguments, string_arg};
use crate::error::ToolError;
use crate::search::check_health;

/// Upper bound on a single response body
const MAX_RESPONSE_BYTES: usize = 50 * 1024 * 1024;

const QUERY_TYPES: [&str; 5] = ["overview", "opportunities", "risk", "market_context", "full_analysis"];

/// Read-only client for the portfolio service's JSON API
#[derive(Debug, Clone)]
pub struct PortfolioClient {
    client: Client,
    base_url: Url,
}

impl PortfolioClient {
    pub fn new(config: &PortfolioConfig) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("parley/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build portfolio client: {e}"))?;

        Ok(Self {
            client,
            base_url: config.url.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url.as_str().trim_end_matches('/'))
    }

    pub async fn health(&self) -> Result<(), ToolError> {
        check_health(&self.client, &self.endpoint("/health")).await
    }

    pub async fn summary(&self) -> Result<PortfolioSummary, ToolError> {
        self.get_json("/api/portfolio/summary").await
    }

    pub async fn positions(&self) -> Result<Vec<Position>, ToolError> {
        self.get_json("/api/portfolio/").await
    }

    pub async fn opportunities(&self) -> Result<Opportunities, ToolError> {
        self.get_json("/api/opportunities/all").await
    }

    pub async fn recommendations(&self) -> Result<Recommendations, ToolError> {
        self.get_json("/api/planning/recommendations").await
    }

    pub async fn risk(&self) -> Result<RiskMetrics, ToolError> {
        let envelope: Envelope<RiskMetrics> = self.get_json("/api/snapshots/risk-snapshot").await?;
        Ok(envelope.data.unwrap_or_default())
    }

    pub async fn deviations(&self) -> Result<AllocationDeviations, ToolError> {
        self.get_json("/api/allocation/deviations").await
    }

    pub async fn market_context(&self) -> Result<MarketContext, ToolError> {
        let envelope: Envelope<MarketContext> = self.get_json("/api/snapshots/market-context").await?;
        Ok(envelope.data.unwrap_or_default())
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ToolError> {
        let mut response = self
            .client
            .get(self.endpoint(path))
            .send()
            .await
            .map_err(|e| ToolError::UpstreamFailure(format!("portfolio request to {path} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ToolError::UpstreamFailure(format!(
                "portfolio service returned {status} for {path}: {}",
                body.trim()
            )));
        }

        let mut body = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| ToolError::UpstreamFailure(format!("portfolio response from {path} broke off: {e}")))?
        {
            if body.len() + chunk.len() > MAX_RESPONSE_BYTES {
                return Err(ToolError::UpstreamFailure(format!(
                    "portfolio response from {path} exceeds {MAX_RESPONSE_BYTES} bytes"
                )));
            }
            body.extend_from_slice(&chunk);
        }

        serde_json::from_slice(&body)
            .map_err(|e| ToolError::UpstreamFailure(format!("unreadable portfolio response from {path}: {e}")))
    }
}

/// `analyze_portfolio` tool
pub struct PortfolioTool {
    client: PortfolioClient,
}

impl PortfolioTool {
    pub const fn new(client: PortfolioClient) -> Self {
        Self { client }
    }

    async fn overview(&self) -> Result<String, ToolError> {
        let summary = self
            .client
            .summary()
            .await
            .map_err(|e| upstream("failed to get portfolio summary", &e))?;
        let positions = self
            .client
            .positions()
            .await
            .map_err(|e| upstream("failed to get positions", &e))?;

        Ok(format::overview(&summary, &positions))
    }

    async fn opportunities(&self) -> Result<String, ToolError> {
        let opportunities = self
            .client
            .opportunities()
            .await
            .map_err(|e| upstream("failed to get opportunities", &e))?;

        let recommendations = self
            .client
            .recommendations()
            .await
            .inspect_err(|e| tracing::debug!(error = %e, "recommendations unavailable"))
            .ok();

        Ok(format::opportunities(&opportunities, recommendations.as_ref()))
    }

    async fn risk(&self) -> Result<String, ToolError> {
        let metrics = self
            .client
            .risk()
            .await
            .map_err(|e| upstream("failed to get risk metrics", &e))?;

        let deviations = self
            .client
            .deviations()
            .await
            .inspect_err(|e| tracing::debug!(error = %e, "allocation deviations unavailable"))
            .ok();

        Ok(format::risk(&metrics, deviations.as_ref()))
    }

    async fn market_context(&self) -> Result<String, ToolError> {
        let context = self
            .client
            .market_context()
            .await
            .map_err(|e| upstream("failed to get market context", &e))?;

        Ok(format::market_context(&context))
    }

    /// Every section that can be produced; fails only if none can
    async fn full_analysis(&self, focus_area: Option<&str>) -> Result<String, ToolError> {
        let (overview, opportunities, risk, market) = tokio::join!(
            self.overview(),
            self.opportunities(),
            self.risk(),
            self.market_context()
        );

        let mut out = String::from("# 📊 Complete Portfolio Analysis\n\n");
        if let Some(focus) = focus_area {
            out.push_str(&format!("**Focus Area:** {focus}\n\n"));
        }

        let sections = [
            ("Portfolio State", overview),
            ("Trading Opportunities", opportunities),
            ("Risk Assessment", risk),
            ("Market Context", market),
        ];

        let mut failures = Vec::new();
        for (title, section) in sections {
            match section {
                Ok(text) => {
                    out.push_str("## ");
                    out.push_str(title);
                    out.push('\n');
                    out.push_str(&text);
                    out.push('\n');
                }
                Err(e) => {
                    tracing::debug!(section = title, error = %e, "analysis section skipped");
                    failures.push(e.to_string());
                }
            }
        }

        if failures.len() == 4 {
            return Err(ToolError::UpstreamFailure(failures.join("; ")));
        }

        Ok(out)
    }
}

fn upstream(context: &str, error: &ToolError) -> ToolError {
    ToolError::UpstreamFailure(format!("{context}: {error}"))
}

#[async_trait]
impl Tool for PortfolioTool {
    fn name(&self) -> &'static str {
        "analyze_portfolio"
    }

    fn is_enabled(&self, settings: &ToolSettings) -> bool {
        settings.enable_portfolio
    }

    fn descriptor(&self, _feeds: &FeedCatalog) -> ToolDescriptor {
        ToolDescriptor {
            name: self.name().to_owned(),
            description: "Analyze the portfolio management system to get current portfolio state, trading \
                          opportunities, risk metrics, and market context. Use this to answer questions about \
                          portfolio health, performance, allocation, or to suggest next actions."
                .to_owned(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "query_type": {
                        "type": "string",
                        "description": "Type of analysis to perform: 'overview' for portfolio summary, \
                                        'opportunities' for trade suggestions, 'risk' for risk metrics, \
                                        'market_context' for market regime, 'full_analysis' for comprehensive snapshot",
                        "enum": QUERY_TYPES
                    },
                    "focus_area": {
                        "type": "string",
                        "description": "Optional: specific area to focus on (e.g., 'US allocation', \
                                        'technology sector', 'high volatility positions')"
                    }
                },
                "required": ["query_type"]
            }),
        }
    }

    async fn call(&self, args: &Arguments) -> Result<String, ToolError> {
        let query_type = string_arg(args, "query_type").ok_or(ToolError::MissingArgument("query_type"))?;

        match query_type {
            "overview" => self.overview().await,
            "opportunities" => self.opportunities().await,
            "risk" => self.risk().await,
            "market_context" => self.market_context().await,
            "full_analysis" => self.full_analysis(string_arg(args, "focus_area")).await,
            other => Err(ToolError::invalid(
                "query_type",
                format!("'{other}' is not one of {}", QUERY_TYPES.join(", ")),
            )),
        }
    }
}
