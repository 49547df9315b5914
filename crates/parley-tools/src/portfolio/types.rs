//! Response shapes of the portfolio service
//!
//! Every field defaults so a partially populated response still renders.

use std::collections::BTreeMap;

use serde::Deserialize;

/// `{"data": ...}` wrapper used by the snapshot endpoints
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub data: Option<T>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PortfolioSummary {
    pub total_value: f64,
    pub cash_balance: f64,
    /// Region to fraction of the portfolio
    pub allocations: BTreeMap<String, f64>,
    pub position_count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Position {
    pub symbol: String,
    pub stock_name: String,
    pub quantity: f64,
    pub currency: String,
    pub market_value_eur: f64,
    pub industry: String,
    pub country: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Opportunities {
    pub data: OpportunityData,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct OpportunityData {
    pub opportunities: Vec<Opportunity>,
    pub count: u64,
    pub by_category: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Opportunity {
    pub symbol: String,
    pub name: String,
    pub side: String,
    pub quantity: f64,
    pub price: f64,
    pub reason: String,
    pub priority: f64,
    pub category: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Recommendations {
    pub data: RecommendationData,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RecommendationData {
    pub recommendations: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RiskMetrics {
    pub var: f64,
    pub cvar: f64,
    pub portfolio_volatility: f64,
    pub sharpe_ratio: f64,
    pub sortino_ratio: f64,
    pub max_drawdown: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AllocationDeviations {
    pub allocations: BTreeMap<String, Deviation>,
    pub status: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Deviation {
    pub current: f64,
    pub target: f64,
    pub deviation: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct MarketContext {
    pub regime: Regime,
    pub adaptive_weights: BTreeMap<String, f64>,
    pub market_hours: MarketHours,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Regime {
    pub raw_score: f64,
    pub smoothed_score: f64,
    pub discrete_regime: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct MarketHours {
    pub status: String,
    pub open_markets: Vec<String>,
    pub closed_markets: Vec<String>,
}
