//! Markdown rendering of portfolio data for the model

use std::fmt::Write;

use super::types::{
    AllocationDeviations, MarketContext, Opportunities, PortfolioSummary, Position, Recommendations, RiskMetrics,
};

const TOP_ENTRIES: usize = 5;
/// Deviation from target above which an allocation is flagged
const DEVIATION_THRESHOLD: f64 = 0.02;

pub fn overview(summary: &PortfolioSummary, positions: &[Position]) -> String {
    let mut out = String::from("# 📊 Portfolio Overview\n\n");
    let _ = writeln!(out, "**Total Value:** €{:.2}", summary.total_value);
    let _ = writeln!(out, "**Cash Balance:** €{:.2}", summary.cash_balance);
    let _ = write!(out, "**Number of Positions:** {}\n\n", summary.position_count);

    out.push_str("## Allocation\n");
    for (region, share) in &summary.allocations {
        let _ = writeln!(out, "- {region}: {:.1}%", share * 100.0);
    }

    if !positions.is_empty() {
        let mut holdings: Vec<&Position> = positions.iter().collect();
        holdings.sort_by(|a, b| b.market_value_eur.total_cmp(&a.market_value_eur));

        out.push_str("\n## Top Holdings\n");
        for (i, position) in holdings.iter().take(TOP_ENTRIES).enumerate() {
            let share = if summary.total_value > 0.0 {
                position.market_value_eur / summary.total_value * 100.0
            } else {
                0.0
            };
            let _ = writeln!(
                out,
                "{}. **{}** ({}): €{:.2} ({share:.1}%)",
                i + 1,
                position.symbol,
                position.country,
                position.market_value_eur
            );
        }
    }

    out
}

pub fn opportunities(opportunities: &Opportunities, recommendations: Option<&Recommendations>) -> String {
    let data = &opportunities.data;

    let mut out = String::from("# 🎯 Trading Opportunities\n\n");
    let _ = write!(out, "**Total Opportunities:** {}\n\n", data.count);

    if !data.by_category.is_empty() {
        out.push_str("## By Category\n");
        for (category, count) in &data.by_category {
            let _ = writeln!(out, "- {}: {count}", title_case(&category.replace('_', " ")));
        }
        out.push('\n');
    }

    if !data.opportunities.is_empty() {
        out.push_str("## Top Priority Opportunities\n");
        for (i, opportunity) in data.opportunities.iter().take(TOP_ENTRIES).enumerate() {
            let _ = writeln!(
                out,
                "{}. **{} {}**: {} @ €{:.2} (Priority: {:.1})",
                i + 1,
                opportunity.side,
                opportunity.symbol,
                opportunity.quantity,
                opportunity.price,
                opportunity.priority
            );
            let _ = writeln!(out, "   Reason: {}", opportunity.reason);
        }
    }

    if let Some(recommendations) = recommendations.filter(|r| !r.data.recommendations.is_empty()) {
        out.push_str("\n## Planner Recommendations\n");
        let _ = writeln!(
            out,
            "- {} recommendation(s) available",
            recommendations.data.recommendations.len()
        );
    }

    out
}

pub fn risk(metrics: &RiskMetrics, deviations: Option<&AllocationDeviations>) -> String {
    let mut out = String::from("# ⚠️ Risk Metrics\n\n");

    if metrics.var > 0.0 {
        let _ = writeln!(out, "**Value at Risk (95%):** €{:.2}", metrics.var);
    }
    if metrics.cvar > 0.0 {
        let _ = writeln!(out, "**Conditional VaR:** €{:.2}", metrics.cvar);
    }
    if metrics.portfolio_volatility > 0.0 {
        let _ = writeln!(
            out,
            "**Portfolio Volatility:** {:.2}% annualized",
            metrics.portfolio_volatility * 100.0
        );
    }
    if metrics.sharpe_ratio != 0.0 {
        let _ = writeln!(out, "**Sharpe Ratio:** {:.2}", metrics.sharpe_ratio);
    }
    if metrics.max_drawdown < 0.0 {
        let _ = writeln!(out, "**Max Drawdown:** {:.2}%", metrics.max_drawdown * 100.0);
    }

    if let Some(deviations) = deviations.filter(|d| !d.allocations.is_empty()) {
        out.push_str("\n## Allocation vs Targets\n");
        for (region, deviation) in &deviations.allocations {
            let marker = if deviation.deviation > DEVIATION_THRESHOLD {
                "⚠️"
            } else {
                "✓"
            };
            let _ = writeln!(
                out,
                "{marker} {region}: {:.1}% (target: {:.1}%, deviation: {:+.1}%)",
                deviation.current * 100.0,
                deviation.target * 100.0,
                deviation.deviation * 100.0
            );
        }
        let _ = writeln!(out, "\n**Status:** {}", deviations.status);
    }

    out
}

pub fn market_context(context: &MarketContext) -> String {
    let mut out = String::from("# 📈 Market Context\n\n");
    let _ = writeln!(
        out,
        "**Market Regime:** {}",
        context.regime.discrete_regime.to_uppercase()
    );
    let _ = write!(out, "**Regime Score:** {:.2}/1.0\n\n", context.regime.raw_score);

    if !context.adaptive_weights.is_empty() {
        out.push_str("## Adaptive Strategy Weights\n");
        for (strategy, weight) in &context.adaptive_weights {
            let _ = writeln!(out, "- {}: {:.1}%", title_case(strategy), weight * 100.0);
        }
        out.push('\n');
    }

    let hours = &context.market_hours;
    if !hours.status.is_empty() {
        let _ = writeln!(out, "**Market Status:** {}", hours.status);
        if !hours.open_markets.is_empty() {
            let _ = writeln!(out, "**Open Markets:** {}", hours.open_markets.join(", "));
        }
        if !hours.closed_markets.is_empty() {
            let _ = writeln!(out, "**Closed Markets:** {}", hours.closed_markets.join(", "));
        }
    }

    out
}

/// Upper-case the first letter of every word
fn title_case(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            chars
                .next()
                .map(|first| first.to_uppercase().chain(chars).collect::<String>())
                .unwrap_or_default()
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::portfolio::types::{Deviation, MarketHours, Opportunity, OpportunityData, RecommendationData, Regime};

    fn position(symbol: &str, country: &str, value: f64) -> Position {
        Position {
            symbol: symbol.to_owned(),
            country: country.to_owned(),
            market_value_eur: value,
            ..Position::default()
        }
    }

    #[test]
    fn overview_ranks_holdings_by_value() {
        let summary = PortfolioSummary {
            total_value: 10_000.0,
            cash_balance: 500.0,
            allocations: BTreeMap::from([("EU".to_owned(), 0.6), ("US".to_owned(), 0.4)]),
            position_count: 2,
        };
        let positions = [position("SAP", "DE", 2_000.0), position("AAPL", "US", 4_000.0)];

        assert_eq!(
            overview(&summary, &positions),
            "# 📊 Portfolio Overview\n\n\
             **Total Value:** €10000.00\n\
             **Cash Balance:** €500.00\n\
             **Number of Positions:** 2\n\n\
             ## Allocation\n\
             - EU: 60.0%\n\
             - US: 40.0%\n\
             \n## Top Holdings\n\
             1. **AAPL** (US): €4000.00 (40.0%)\n\
             2. **SAP** (DE): €2000.00 (20.0%)\n"
        );
    }

    #[test]
    fn overview_survives_empty_portfolio() {
        let summary = PortfolioSummary::default();
        let positions = [position("CASH", "EU", 10.0)];

        assert!(overview(&summary, &positions).contains("(0.0%)"));
    }

    #[test]
    fn opportunities_with_recommendations() {
        let opportunities = Opportunities {
            data: OpportunityData {
                opportunities: vec![Opportunity {
                    symbol: "ASML".to_owned(),
                    side: "BUY".to_owned(),
                    quantity: 3.0,
                    price: 612.5,
                    reason: "Underweight in semiconductors".to_owned(),
                    priority: 0.87,
                    ..Opportunity::default()
                }],
                count: 1,
                by_category: BTreeMap::from([("rebalance_buys".to_owned(), 1)]),
            },
        };
        let recommendations = Recommendations {
            data: RecommendationData {
                recommendations: vec![serde_json::json!({"id": 1}), serde_json::json!({"id": 2})],
            },
        };

        let text = super::opportunities(&opportunities, Some(&recommendations));

        assert!(text.contains("- Rebalance Buys: 1\n"));
        assert!(text.contains("1. **BUY ASML**: 3 @ €612.50 (Priority: 0.9)\n   Reason: Underweight in semiconductors\n"));
        assert!(text.ends_with("## Planner Recommendations\n- 2 recommendation(s) available\n"));
    }

    #[test]
    fn risk_flags_large_deviations() {
        let metrics = RiskMetrics {
            var: 1_234.5,
            portfolio_volatility: 0.18,
            max_drawdown: -0.12,
            ..RiskMetrics::default()
        };
        let deviations = AllocationDeviations {
            allocations: BTreeMap::from([
                (
                    "EU".to_owned(),
                    Deviation {
                        current: 0.55,
                        target: 0.5,
                        deviation: 0.05,
                    },
                ),
                (
                    "US".to_owned(),
                    Deviation {
                        current: 0.45,
                        target: 0.46,
                        deviation: -0.01,
                    },
                ),
            ]),
            status: "needs_rebalance".to_owned(),
        };

        let text = risk(&metrics, Some(&deviations));

        assert!(text.contains("**Value at Risk (95%):** €1234.50\n"));
        assert!(!text.contains("Conditional VaR"));
        assert!(!text.contains("Sharpe"));
        assert!(text.contains("**Portfolio Volatility:** 18.00% annualized\n"));
        assert!(text.contains("**Max Drawdown:** -12.00%\n"));
        assert!(text.contains("⚠️ EU: 55.0% (target: 50.0%, deviation: +5.0%)\n"));
        assert!(text.contains("✓ US: 45.0% (target: 46.0%, deviation: -1.0%)\n"));
        assert!(text.ends_with("**Status:** needs_rebalance\n"));
    }

    #[test]
    fn market_context_sections() {
        let context = MarketContext {
            regime: Regime {
                raw_score: 0.42,
                discrete_regime: "sideways".to_owned(),
                ..Regime::default()
            },
            adaptive_weights: BTreeMap::from([("momentum".to_owned(), 0.3)]),
            market_hours: MarketHours {
                status: "mixed".to_owned(),
                open_markets: vec!["XETRA".to_owned()],
                closed_markets: Vec::new(),
            },
        };

        assert_eq!(
            market_context(&context),
            "# 📈 Market Context\n\n\
             **Market Regime:** SIDEWAYS\n\
             **Regime Score:** 0.42/1.0\n\n\
             ## Adaptive Strategy Weights\n\
             - Momentum: 30.0%\n\n\
             **Market Status:** mixed\n\
             **Open Markets:** XETRA\n"
        );
    }
}
