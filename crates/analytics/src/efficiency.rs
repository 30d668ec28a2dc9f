use crate::error::AnalyticsError;
use crate::util::{percent, ratio, round2};
use configuration::{AnalysisConfig, ScoringWeights};
use core_types::{
    AgentNetwork, BLOCKCHAIN_REGION, BlockchainMetrics, CrossChainMetrics, DefiIntegration,
    FloatBalances, Grade, OffchainMetrics, OnchainMetrics, Provider, ProviderKind,
    ProviderMetrics, SmartContractPerformance, TransactionCounts,
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

// --- Offchain result types ---

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransactionEfficiency {
    pub success_rate: f64,
    pub failure_rate: f64,
    pub attempted_transactions: f64,
    pub successful_transactions: f64,
    pub failed_transactions: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FloatEfficiency {
    /// Unbounded, non-negative.
    pub turnover: f64,
    /// Unbounded, non-negative.
    pub velocity: f64,
    pub total_volume: f64,
    pub average_float: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgentNetworkEfficiency {
    pub utilization_rate: f64,
    pub liquidity_coverage: f64,
    pub cash_coverage: f64,
    pub total_agents: f64,
    pub active_agents: f64,
    pub liquidity_agents: f64,
    pub cash_agents: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EfficiencyMetrics {
    pub transaction_efficiency: TransactionEfficiency,
    pub float_efficiency: FloatEfficiency,
    pub agent_network_efficiency: AgentNetworkEfficiency,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComponentScores {
    pub transaction: f64,
    pub agent_network: f64,
    pub float_utilization: f64,
}

/// Weighted 0-100 score with its letter grade.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EfficiencyScore {
    pub overall_score: f64,
    pub grade: Grade,
    pub component_scores: ComponentScores,
    pub weights: ScoringWeights,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrictionPoints {
    pub low_liquidity_agents: f64,
    pub low_cash_agents: f64,
    pub inactive_agents: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrictionRates {
    pub liquidity_friction_rate: f64,
    pub cash_friction_rate: f64,
    pub utilization_friction_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ServiceImpact {
    /// Agents without e-float cannot pay out.
    pub cash_out_failures_likely: bool,
    /// Agents without physical cash cannot take deposits.
    pub cash_in_failures_likely: bool,
    pub network_underutilization: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrictionAnalysis {
    pub friction_points: FrictionPoints,
    pub friction_rates: FrictionRates,
    pub service_impact: ServiceImpact,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketEfficiency {
    pub provider_type: ProviderKind,
    pub market_name: String,
    pub region: String,
    pub efficiency_metrics: EfficiencyMetrics,
    pub efficiency_score: EfficiencyScore,
    pub friction_analysis: FrictionAnalysis,
}

// --- Onchain result types ---

/// Onchain figures rescaled for readability: TVL and volume in millions of USD,
/// cross-chain transfers in thousands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct OnchainEfficiencyMetrics {
    pub tvl_efficiency: f64,
    pub volume_efficiency: f64,
    pub yield_efficiency: f64,
    pub cross_chain_efficiency: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct OnchainComponentScores {
    pub tvl_score: f64,
    pub volume_score: f64,
    pub yield_score: f64,
    pub cross_chain_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnchainEfficiency {
    pub provider_type: ProviderKind,
    pub market_name: String,
    pub region: String,
    pub efficiency_metrics: OnchainEfficiencyMetrics,
    /// 0-100, rounded to two decimals. 0 when scoring failed.
    pub efficiency_score: f64,
    pub component_scores: OnchainComponentScores,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blockchain_metrics: Option<BlockchainMetrics>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defi_integration: Option<DefiIntegration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cross_chain_efficiency: Option<CrossChainMetrics>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub smart_contract_performance: Option<SmartContractPerformance>,
}

/// Per-provider efficiency results, keyed by provider name in input order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EfficiencyAnalysis {
    pub market_efficiency: IndexMap<String, MarketEfficiency>,
    pub onchain_efficiency: IndexMap<String, OnchainEfficiency>,
}

// --- Analyzer ---

/// Scores providers with the weights and caps fixed at construction.
#[derive(Debug, Clone, Default)]
pub struct EfficiencyAnalyzer {
    config: AnalysisConfig,
}

impl EfficiencyAnalyzer {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    #[tracing::instrument(skip_all, fields(providers = providers.len()))]
    pub fn analyze(&self, providers: &[Provider]) -> EfficiencyAnalysis {
        let mut analysis = EfficiencyAnalysis::default();

        for provider in providers {
            match &provider.metrics {
                ProviderMetrics::Offchain(metrics) | ProviderMetrics::Hybrid(metrics) => {
                    match self.market_efficiency(provider, metrics) {
                        Some(market) => {
                            analysis.market_efficiency.insert(provider.name.clone(), market);
                        }
                        None => tracing::debug!(
                            provider = %provider.name,
                            "Transaction, float or agent metrics missing; skipping efficiency score."
                        ),
                    }
                }
                ProviderMetrics::Onchain(metrics) => {
                    let onchain = self.onchain_efficiency(provider, metrics);
                    analysis.onchain_efficiency.insert(provider.name.clone(), onchain);
                }
                ProviderMetrics::Unknown { declared_type } => tracing::debug!(
                    provider = %provider.name,
                    declared_type = %declared_type,
                    "Skipping provider of unknown type."
                ),
            }
        }

        tracing::info!(
            offchain = analysis.market_efficiency.len(),
            onchain = analysis.onchain_efficiency.len(),
            "Completed efficiency analysis."
        );
        analysis
    }

    /// Scores one offchain or hybrid market. `None` unless all three metric groups are present.
    pub fn market_efficiency(
        &self,
        provider: &Provider,
        metrics: &OffchainMetrics,
    ) -> Option<MarketEfficiency> {
        let transactions = metrics.transaction_metrics.as_ref()?;
        let float = metrics.float_metrics.as_ref()?;
        let agents = metrics.agent_network_metrics.as_ref()?;

        let efficiency_metrics = efficiency_metrics(transactions, float, agents);
        Some(MarketEfficiency {
            provider_type: provider.kind(),
            market_name: metrics
                .market_name
                .clone()
                .unwrap_or_else(|| provider.name.clone()),
            region: metrics.region().to_string(),
            efficiency_score: self.score(&efficiency_metrics),
            efficiency_metrics,
            friction_analysis: analyze_frictions(agents),
        })
    }

    /// Weighted overall score and grade for a set of offchain metrics.
    pub fn score(&self, metrics: &EfficiencyMetrics) -> EfficiencyScore {
        let weights = self.config.scoring_weights;
        let agent_weights = self.config.agent_weights;
        let agent = &metrics.agent_network_efficiency;

        let transaction = metrics.transaction_efficiency.success_rate;
        let agent_network = agent.utilization_rate * agent_weights.utilization
            + agent.liquidity_coverage * agent_weights.liquidity_coverage
            + agent.cash_coverage * agent_weights.cash_coverage;
        let float_utilization = (metrics.float_efficiency.turnover
            / self.config.float_turnover_cap
            * 100.0)
            .clamp(0.0, 100.0);

        let overall_score = (transaction * weights.transaction
            + agent_network * weights.agent_network
            + float_utilization * weights.float_utilization)
            .clamp(0.0, 100.0);

        EfficiencyScore {
            overall_score,
            grade: Grade::from_score(overall_score),
            component_scores: ComponentScores {
                transaction,
                agent_network,
                float_utilization,
            },
            weights,
        }
    }

    /// Scores one onchain provider. A scoring failure is logged and yields a score of 0.
    pub fn onchain_efficiency(
        &self,
        provider: &Provider,
        metrics: &OnchainMetrics,
    ) -> OnchainEfficiency {
        let efficiency_metrics = OnchainEfficiencyMetrics {
            tvl_efficiency: metrics.tvl_usd / 1_000_000.0,
            volume_efficiency: metrics.daily_volume_usd / 1_000_000.0,
            yield_efficiency: metrics.apy_avg,
            cross_chain_efficiency: metrics.cross_chain_transfers / 1_000.0,
        };

        let (efficiency_score, component_scores) = self
            .onchain_score(&efficiency_metrics)
            .unwrap_or_else(|e| {
                tracing::error!(
                    provider = %provider.name,
                    error = %e,
                    "Onchain scoring failed; using a score of 0."
                );
                (0.0, OnchainComponentScores::default())
            });

        OnchainEfficiency {
            provider_type: ProviderKind::Onchain,
            market_name: provider.name.clone(),
            region: BLOCKCHAIN_REGION.to_string(),
            efficiency_metrics,
            efficiency_score,
            component_scores,
            blockchain_metrics: metrics.blockchain_metrics.clone(),
            defi_integration: metrics.defi_integration.clone(),
            cross_chain_efficiency: metrics.cross_chain_efficiency.clone(),
            smart_contract_performance: metrics.smart_contract_performance.clone(),
        }
    }

    /// Four capped components of `points_per_component` each, summed and rounded to two decimals.
    pub fn onchain_score(
        &self,
        metrics: &OnchainEfficiencyMetrics,
    ) -> Result<(f64, OnchainComponentScores), AnalyticsError> {
        let caps = &self.config.onchain;
        let component = |metric: &'static str, value: f64, cap: f64| {
            if !value.is_finite() {
                return Err(AnalyticsError::InvalidMetric { metric, value });
            }
            Ok((value / cap).clamp(0.0, 1.0) * caps.points_per_component)
        };

        let scores = OnchainComponentScores {
            tvl_score: component("tvl_efficiency", metrics.tvl_efficiency, caps.tvl_cap_millions)?,
            volume_score: component(
                "volume_efficiency",
                metrics.volume_efficiency,
                caps.volume_cap_millions,
            )?,
            yield_score: component(
                "yield_efficiency",
                metrics.yield_efficiency,
                caps.yield_cap_pct,
            )?,
            cross_chain_score: component(
                "cross_chain_efficiency",
                metrics.cross_chain_efficiency,
                caps.cross_chain_cap_thousands,
            )?,
        };

        let total =
            scores.tvl_score + scores.volume_score + scores.yield_score + scores.cross_chain_score;
        if !total.is_finite() {
            return Err(AnalyticsError::Computation(format!(
                "onchain score is not finite: {total}"
            )));
        }
        Ok((round2(total), scores))
    }
}

/// Derives the success, float and agent ratios. Zero denominators give 0.
pub fn efficiency_metrics(
    transactions: &TransactionCounts,
    float: &FloatBalances,
    agents: &AgentNetwork,
) -> EfficiencyMetrics {
    EfficiencyMetrics {
        transaction_efficiency: TransactionEfficiency {
            success_rate: percent(transactions.successful, transactions.attempted),
            failure_rate: percent(transactions.failed, transactions.attempted),
            attempted_transactions: transactions.attempted,
            successful_transactions: transactions.successful,
            failed_transactions: transactions.failed,
        },
        float_efficiency: FloatEfficiency {
            turnover: ratio(float.total_volume, float.average_float).max(0.0),
            velocity: ratio(transactions.attempted, float.average_float).max(0.0),
            total_volume: float.total_volume,
            average_float: float.average_float,
        },
        agent_network_efficiency: AgentNetworkEfficiency {
            utilization_rate: percent(agents.active, agents.total),
            liquidity_coverage: percent(agents.with_liquidity, agents.total),
            cash_coverage: percent(agents.with_cash, agents.total),
            total_agents: agents.total,
            active_agents: agents.active,
            liquidity_agents: agents.with_liquidity,
            cash_agents: agents.with_cash,
        },
    }
}

/// Counts agents that are short on e-float, short on cash, or inactive.
pub fn analyze_frictions(agents: &AgentNetwork) -> FrictionAnalysis {
    let low_liquidity_agents = (agents.total - agents.with_liquidity).max(0.0);
    let low_cash_agents = (agents.total - agents.with_cash).max(0.0);
    let inactive_agents = (agents.total - agents.active).max(0.0);

    FrictionAnalysis {
        friction_points: FrictionPoints {
            low_liquidity_agents,
            low_cash_agents,
            inactive_agents,
        },
        friction_rates: FrictionRates {
            liquidity_friction_rate: percent(low_liquidity_agents, agents.total),
            cash_friction_rate: percent(low_cash_agents, agents.total),
            utilization_friction_rate: percent(inactive_agents, agents.total),
        },
        service_impact: ServiceImpact {
            cash_out_failures_likely: low_liquidity_agents > 0.0,
            cash_in_failures_likely: low_cash_agents > 0.0,
            network_underutilization: inactive_agents > 0.0,
        },
    }
}
