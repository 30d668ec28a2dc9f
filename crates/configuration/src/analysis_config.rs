use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Configuration for the scoring and insight rules.
///
/// Every value defaults to the published methodology, so a config file only needs
/// the sections it overrides. Analyzers take this at construction; it is never a
/// per-call parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Weights for the overall offchain efficiency score. Must sum to 1.0.
    pub scoring_weights: ScoringWeights,
    /// Weights for the composite agent-network score. Must sum to 1.0.
    pub agent_weights: AgentWeights,
    /// Float turnover at or above this multiple saturates the float score at 100.
    pub float_turnover_cap: f64,
    pub onchain: OnchainCaps,
    pub insights: InsightThresholds,
}

/// Weights for the overall offchain score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub transaction: f64,
    pub agent_network: f64,
    pub float_utilization: f64,
}

/// Weights for the agent-network component.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentWeights {
    pub utilization: f64,
    pub liquidity_coverage: f64,
    pub cash_coverage: f64,
}

/// Saturation points of the onchain score. Each component earns
/// `min(value / cap, 1) * points_per_component`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OnchainCaps {
    pub tvl_cap_millions: f64,
    pub volume_cap_millions: f64,
    pub yield_cap_pct: f64,
    pub cross_chain_cap_thousands: f64,
    pub points_per_component: f64,
}

/// Trigger thresholds for the insight generator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightThresholds {
    /// Absolute success-rate gap, in percentage points, that flags a regional pattern.
    pub success_rate_gap_threshold: f64,
}

// --- Default Implementations ---

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            scoring_weights: ScoringWeights::default(),
            agent_weights: AgentWeights::default(),
            float_turnover_cap: 20.0,
            onchain: OnchainCaps::default(),
            insights: InsightThresholds::default(),
        }
    }
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            transaction: 0.40,
            agent_network: 0.35,
            float_utilization: 0.25,
        }
    }
}

impl Default for AgentWeights {
    fn default() -> Self {
        Self {
            utilization: 0.4,
            liquidity_coverage: 0.4,
            cash_coverage: 0.2,
        }
    }
}

impl Default for OnchainCaps {
    fn default() -> Self {
        Self {
            tvl_cap_millions: 100.0,
            volume_cap_millions: 10.0,
            yield_cap_pct: 15.0,
            cross_chain_cap_thousands: 100.0,
            points_per_component: 25.0,
        }
    }
}

impl Default for InsightThresholds {
    fn default() -> Self {
        Self {
            success_rate_gap_threshold: 5.0,
        }
    }
}

const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

impl AnalysisConfig {
    /// Checks that the weights and caps are logical.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let w = &self.scoring_weights;
        check_weights(
            "scoring_weights",
            &[w.transaction, w.agent_network, w.float_utilization],
        )?;
        let a = &self.agent_weights;
        check_weights(
            "agent_weights",
            &[a.utilization, a.liquidity_coverage, a.cash_coverage],
        )?;

        let o = &self.onchain;
        let caps = [
            ("float_turnover_cap", self.float_turnover_cap),
            ("onchain.tvl_cap_millions", o.tvl_cap_millions),
            ("onchain.volume_cap_millions", o.volume_cap_millions),
            ("onchain.yield_cap_pct", o.yield_cap_pct),
            ("onchain.cross_chain_cap_thousands", o.cross_chain_cap_thousands),
            ("onchain.points_per_component", o.points_per_component),
        ];
        for (name, value) in caps {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::ValidationError(format!(
                    "{name} must be a positive number, got {value}"
                )));
            }
        }

        let gap = self.insights.success_rate_gap_threshold;
        if !(gap.is_finite() && gap >= 0.0) {
            return Err(ConfigError::ValidationError(format!(
                "insights.success_rate_gap_threshold must be non-negative, got {gap}"
            )));
        }
        Ok(())
    }
}

fn check_weights(section: &str, weights: &[f64]) -> Result<(), ConfigError> {
    if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
        return Err(ConfigError::ValidationError(format!(
            "{section} must all be non-negative numbers"
        )));
    }
    let sum: f64 = weights.iter().sum();
    if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
        return Err(ConfigError::ValidationError(format!(
            "{section} must sum to 1.0, got {sum}"
        )));
    }
    Ok(())
}
