use crate::efficiency::{MarketEfficiency, OnchainEfficiency};
use crate::regional::RegionalComparison;
use configuration::InsightThresholds;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A qualitative finding backed by a piece of numeric evidence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insight {
    pub headline: String,
    pub evidence: String,
    pub implication: String,
}

impl Insight {
    pub fn new(
        headline: impl Into<String>,
        evidence: impl Into<String>,
        implication: impl Into<String>,
    ) -> Self {
        Self {
            headline: headline.into(),
            evidence: evidence.into(),
            implication: implication.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EfficiencyInsights {
    pub key_findings: Vec<Insight>,
    pub regional_patterns: Vec<Insight>,
    pub efficiency_drivers: Vec<Insight>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnchainEfficiencyInsights {
    pub key_findings: Vec<Insight>,
    pub defi_opportunities: Vec<Insight>,
    pub cross_chain_benefits: Vec<Insight>,
}

/// Turns efficiency aggregates into threshold-triggered findings.
#[derive(Debug, Clone, Default)]
pub struct InsightGenerator {
    thresholds: InsightThresholds,
}

impl InsightGenerator {
    pub fn new(thresholds: InsightThresholds) -> Self {
        Self { thresholds }
    }

    #[tracing::instrument(skip_all)]
    pub fn efficiency_insights(
        &self,
        market_efficiency: &IndexMap<String, MarketEfficiency>,
        regional: &RegionalComparison,
    ) -> EfficiencyInsights {
        let mut insights = EfficiencyInsights::default();

        let scores = market_efficiency
            .values()
            .map(|m| m.efficiency_score.overall_score);
        let range = scores.fold(None, |range: Option<(f64, f64)>, score| match range {
            Some((lo, hi)) => Some((lo.min(score), hi.max(score))),
            None => Some((score, score)),
        });
        if let Some((min, max)) = range {
            insights.key_findings.push(Insight::new(
                "Efficiency variation across markets",
                format!("Efficiency scores range from {min:.1} to {max:.1}"),
                "Significant variation in liquidity utilization across markets",
            ));
        }

        for (pair, disparity) in regional.disparity_analysis.iter() {
            if disparity.success_rate_gap.abs() > self.thresholds.success_rate_gap_threshold {
                insights.regional_patterns.push(Insight::new(
                    format!("Significant success rate gap between {pair}"),
                    format!("{:+.1}% difference", disparity.success_rate_gap),
                    "Regional factors significantly impact transaction reliability",
                ));
            }
        }

        for market in market_efficiency.values() {
            let short = market.friction_analysis.friction_points.low_liquidity_agents;
            if short > 0.0 {
                insights.efficiency_drivers.push(Insight::new(
                    "Agent liquidity shortages",
                    format!("{}: {short:.0} agents lack e-float", market.market_name),
                    "Cash-out service failures, reduced user trust",
                ));
            }
        }

        tracing::debug!(
            key_findings = insights.key_findings.len(),
            regional_patterns = insights.regional_patterns.len(),
            efficiency_drivers = insights.efficiency_drivers.len(),
            "Generated efficiency insights."
        );
        insights
    }

    /// Aggregate TVL, yield and cross-chain findings. All three are emitted whenever
    /// at least one onchain provider was scored.
    #[tracing::instrument(skip_all)]
    pub fn onchain_efficiency_insights(
        &self,
        onchain_efficiency: &IndexMap<String, OnchainEfficiency>,
    ) -> OnchainEfficiencyInsights {
        let mut insights = OnchainEfficiencyInsights::default();
        if onchain_efficiency.is_empty() {
            return insights;
        }

        let count = onchain_efficiency.len();
        let metrics = || onchain_efficiency.values().map(|p| p.efficiency_metrics);
        let total_tvl: f64 = metrics().map(|m| m.tvl_efficiency).sum();
        let avg_yield = metrics().map(|m| m.yield_efficiency).sum::<f64>() / count as f64;
        let total_cross_chain: f64 = metrics().map(|m| m.cross_chain_efficiency).sum();

        insights.key_findings.push(Insight::new(
            "Onchain providers show significant TVL efficiency",
            format!("${total_tvl:.2}M total TVL across {count} providers"),
            "High liquidity utilization in blockchain networks",
        ));
        insights.defi_opportunities.push(Insight::new(
            "High yield opportunities in DeFi protocols",
            format!("Average APY: {avg_yield:.2}% across onchain providers"),
            "Significant yield farming potential for liquidity providers",
        ));
        insights.cross_chain_benefits.push(Insight::new(
            "Efficient cross-chain liquidity movement",
            format!("{total_cross_chain:.0}K daily cross-chain transfers"),
            "Seamless liquidity flow across blockchain networks",
        ));
        insights
    }
}
