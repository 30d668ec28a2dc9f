//! Detail views of the optional blockchain, DeFi, bridge and smart-contract
//! sub-metrics carried by onchain and hybrid providers.

use crate::insights::Insight;
use crate::util::{format_thousands, mean, saturating_sum};
use core_types::{
    BLOCKCHAIN_REGION, BlockchainMetrics, CrossChainMetrics, DefiIntegration, Provider,
    ProviderMetrics, SmartContractPerformance,
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

// --- Blockchain networks ---

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NetworkAdoption {
    pub celo_transactions: f64,
    pub stellar_transactions: f64,
    pub ethereum_transactions: f64,
    pub polygon_transactions: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NetworkTransactionEfficiency {
    pub avg_gas_fee: f64,
    pub tx_confirmation_time: f64,
    pub throughput_tps: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NetworkLiquidity {
    pub total_value_locked: f64,
    pub daily_volume: f64,
    pub active_addresses: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockchainNetworkAnalysis {
    pub market_name: String,
    pub region: String,
    pub network_adoption: NetworkAdoption,
    pub transaction_efficiency: NetworkTransactionEfficiency,
    pub liquidity_metrics: NetworkLiquidity,
}

impl BlockchainNetworkAnalysis {
    fn new(market_name: &str, region: &str, m: &BlockchainMetrics) -> Self {
        Self {
            market_name: market_name.to_string(),
            region: region.to_string(),
            network_adoption: NetworkAdoption {
                celo_transactions: m.celo_daily_tx,
                stellar_transactions: m.stellar_daily_tx,
                ethereum_transactions: m.ethereum_daily_tx,
                polygon_transactions: m.polygon_daily_tx,
            },
            transaction_efficiency: NetworkTransactionEfficiency {
                avg_gas_fee: m.avg_gas_fee_usd,
                tx_confirmation_time: m.avg_confirmation_time_seconds,
                throughput_tps: m.transactions_per_second,
            },
            liquidity_metrics: NetworkLiquidity {
                total_value_locked: m.tvl_usd,
                daily_volume: m.daily_volume_usd,
                active_addresses: m.active_addresses,
            },
        }
    }
}

// --- DeFi protocols ---

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProtocolAdoption {
    pub uniswap_liquidity: f64,
    pub aave_deposits: f64,
    pub compound_borrowing: f64,
    pub makerdao_collateral: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YieldMetrics {
    pub avg_apy: f64,
    pub liquidity_mining_rewards: f64,
    pub governance_token_holdings: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskMetrics {
    pub impermanent_loss_risk: f64,
    pub smart_contract_risk: f64,
    pub liquidity_depth: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefiProtocolAnalysis {
    pub market_name: String,
    pub region: String,
    pub protocol_adoption: ProtocolAdoption,
    pub yield_metrics: YieldMetrics,
    pub risk_metrics: RiskMetrics,
}

impl DefiProtocolAnalysis {
    fn new(market_name: &str, region: &str, m: &DefiIntegration) -> Self {
        Self {
            market_name: market_name.to_string(),
            region: region.to_string(),
            protocol_adoption: ProtocolAdoption {
                uniswap_liquidity: m.uniswap_liquidity_usd,
                aave_deposits: m.aave_deposits_usd,
                compound_borrowing: m.compound_borrowing_usd,
                makerdao_collateral: m.makerdao_collateral_usd,
            },
            yield_metrics: YieldMetrics {
                avg_apy: m.average_apy_percentage,
                liquidity_mining_rewards: m.liquidity_mining_usd,
                governance_token_holdings: m.governance_tokens,
            },
            risk_metrics: RiskMetrics {
                impermanent_loss_risk: m.impermanent_loss_risk_score,
                smart_contract_risk: m.smart_contract_risk_score,
                liquidity_depth: m.liquidity_depth_score,
            },
        }
    }
}

// --- Cross-chain bridges ---

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BridgeRoute {
    pub transfer_time: f64,
    pub transfer_cost: f64,
    pub success_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BridgeEfficiency {
    pub celo_stellar_bridge: BridgeRoute,
    pub ethereum_polygon_bridge: BridgeRoute,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CrossChainVolume {
    pub daily_bridge_volume: f64,
    pub monthly_bridge_volume: f64,
    pub bridge_fee_revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossChainAnalysis {
    pub market_name: String,
    pub region: String,
    pub bridge_efficiency: BridgeEfficiency,
    pub cross_chain_volume: CrossChainVolume,
}

impl CrossChainAnalysis {
    fn new(market_name: &str, region: &str, m: &CrossChainMetrics) -> Self {
        Self {
            market_name: market_name.to_string(),
            region: region.to_string(),
            bridge_efficiency: BridgeEfficiency {
                celo_stellar_bridge: BridgeRoute {
                    transfer_time: m.celo_stellar_time_seconds,
                    transfer_cost: m.celo_stellar_cost_usd,
                    success_rate: m.celo_stellar_success_rate,
                },
                ethereum_polygon_bridge: BridgeRoute {
                    transfer_time: m.eth_polygon_time_seconds,
                    transfer_cost: m.eth_polygon_cost_usd,
                    success_rate: m.eth_polygon_success_rate,
                },
            },
            cross_chain_volume: CrossChainVolume {
                daily_bridge_volume: m.daily_bridge_volume_usd,
                monthly_bridge_volume: m.monthly_bridge_volume_usd,
                bridge_fee_revenue: m.bridge_fee_revenue_usd,
            },
        }
    }
}

// --- Smart contracts ---

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GasEfficiency {
    pub avg_gas_used: f64,
    pub gas_optimization_score: f64,
    pub cost_per_transaction: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContractPerformance {
    pub execution_success_rate: f64,
    pub average_execution_time: f64,
    pub contract_complexity_score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SecurityMetrics {
    pub audit_score: f64,
    pub bug_bounty_program: bool,
    pub insurance_coverage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmartContractAnalysis {
    pub market_name: String,
    pub region: String,
    pub gas_efficiency: GasEfficiency,
    pub contract_performance: ContractPerformance,
    pub security_metrics: SecurityMetrics,
}

impl SmartContractAnalysis {
    fn new(market_name: &str, region: &str, m: &SmartContractPerformance) -> Self {
        Self {
            market_name: market_name.to_string(),
            region: region.to_string(),
            gas_efficiency: GasEfficiency {
                avg_gas_used: m.average_gas_used,
                gas_optimization_score: m.gas_optimization_score,
                cost_per_transaction: m.cost_per_transaction_usd,
            },
            contract_performance: ContractPerformance {
                execution_success_rate: m.execution_success_rate,
                average_execution_time: m.avg_execution_time_ms,
                contract_complexity_score: m.complexity_score,
            },
            security_metrics: SecurityMetrics {
                audit_score: m.audit_score,
                bug_bounty_program: m.bug_bounty_active,
                insurance_coverage: m.insurance_coverage_usd,
            },
        }
    }
}

// --- Report ---

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnchainInsights {
    pub blockchain_adoption_trends: Vec<Insight>,
    pub defi_integration_opportunities: Vec<Insight>,
    pub cross_chain_efficiency_gains: Vec<Insight>,
    pub smart_contract_optimization: Vec<Insight>,
}

impl OnchainInsights {
    /// Every insight, section by section.
    pub fn all(&self) -> impl Iterator<Item = &Insight> {
        self.blockchain_adoption_trends
            .iter()
            .chain(&self.defi_integration_opportunities)
            .chain(&self.cross_chain_efficiency_gains)
            .chain(&self.smart_contract_optimization)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OnchainAnalysis {
    pub blockchain_networks: IndexMap<String, BlockchainNetworkAnalysis>,
    pub defi_protocols: IndexMap<String, DefiProtocolAnalysis>,
    pub cross_chain_efficiency: IndexMap<String, CrossChainAnalysis>,
    pub smart_contract_performance: IndexMap<String, SmartContractAnalysis>,
    pub onchain_insights: OnchainInsights,
}

/// Sub-metric groups of one provider, whichever kind carries them.
struct SubMetrics<'a> {
    blockchain: Option<&'a BlockchainMetrics>,
    defi: Option<&'a DefiIntegration>,
    cross_chain: Option<&'a CrossChainMetrics>,
    contracts: Option<&'a SmartContractPerformance>,
}

fn sub_metrics(provider: &Provider) -> Option<(&str, SubMetrics<'_>)> {
    match &provider.metrics {
        ProviderMetrics::Onchain(m) => Some((
            BLOCKCHAIN_REGION,
            SubMetrics {
                blockchain: m.blockchain_metrics.as_ref(),
                defi: m.defi_integration.as_ref(),
                cross_chain: m.cross_chain_efficiency.as_ref(),
                contracts: m.smart_contract_performance.as_ref(),
            },
        )),
        ProviderMetrics::Hybrid(m) => Some((
            m.region(),
            SubMetrics {
                blockchain: m.blockchain_metrics.as_ref(),
                defi: m.defi_integration.as_ref(),
                cross_chain: m.cross_chain_efficiency.as_ref(),
                contracts: m.smart_contract_performance.as_ref(),
            },
        )),
        ProviderMetrics::Offchain(_) | ProviderMetrics::Unknown { .. } => None,
    }
}

/// Collects the blockchain, DeFi, bridge and contract views of onchain and hybrid providers.
#[derive(Debug, Default)]
pub struct OnchainAnalyzer {}

impl OnchainAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    #[tracing::instrument(skip_all, fields(providers = providers.len()))]
    pub fn analyze(&self, providers: &[Provider]) -> OnchainAnalysis {
        let mut analysis = OnchainAnalysis::default();

        for provider in providers {
            let Some((region, subs)) = sub_metrics(provider) else {
                continue;
            };
            let name = provider.name.as_str();

            if let Some(m) = subs.blockchain {
                let entry = BlockchainNetworkAnalysis::new(name, region, m);
                analysis.blockchain_networks.insert(name.to_string(), entry);
            }
            if let Some(m) = subs.defi {
                let entry = DefiProtocolAnalysis::new(name, region, m);
                analysis.defi_protocols.insert(name.to_string(), entry);
            }
            if let Some(m) = subs.cross_chain {
                let entry = CrossChainAnalysis::new(name, region, m);
                analysis.cross_chain_efficiency.insert(name.to_string(), entry);
            }
            if let Some(m) = subs.contracts {
                let entry = SmartContractAnalysis::new(name, region, m);
                analysis.smart_contract_performance.insert(name.to_string(), entry);
            }
        }

        analysis.onchain_insights = onchain_insights(&analysis);
        tracing::info!(
            blockchain_networks = analysis.blockchain_networks.len(),
            defi_protocols = analysis.defi_protocols.len(),
            bridges = analysis.cross_chain_efficiency.len(),
            contracts = analysis.smart_contract_performance.len(),
            "Completed onchain source analysis."
        );
        analysis
    }
}

fn onchain_insights(analysis: &OnchainAnalysis) -> OnchainInsights {
    let mut insights = OnchainInsights::default();

    let networks = &analysis.blockchain_networks;
    if !networks.is_empty() {
        let total_tvl = saturating_sum(
            networks
                .values()
                .map(|n| n.liquidity_metrics.total_value_locked),
        );
        insights.blockchain_adoption_trends.push(Insight::new(
            "Total Value Locked across blockchain networks",
            format!(
                "${} TVL across {} markets",
                format_thousands(total_tvl),
                networks.len()
            ),
            "Significant blockchain adoption in the analyzed markets",
        ));
    }

    // Only positive yields count; no positive yield means no finding.
    let positive_apy = analysis
        .defi_protocols
        .values()
        .map(|p| p.yield_metrics.avg_apy)
        .filter(|apy| *apy > 0.0);
    if let Some(avg_apy) = mean(positive_apy).filter(|avg| *avg > 0.0) {
        insights.defi_integration_opportunities.push(Insight::new(
            "High yield opportunities in DeFi protocols",
            format!("Average APY: {avg_apy:.2}% across DeFi protocols"),
            "Significant yield farming potential for liquidity providers",
        ));
    }

    let bridges = &analysis.cross_chain_efficiency;
    if !bridges.is_empty() {
        let daily = saturating_sum(
            bridges
                .values()
                .map(|b| b.cross_chain_volume.daily_bridge_volume),
        );
        insights.cross_chain_efficiency_gains.push(Insight::new(
            "Cross-chain liquidity movement",
            format!("${} daily bridge volume", format_thousands(daily)),
            "Efficient cross-chain liquidity management",
        ));
    }

    let contracts = &analysis.smart_contract_performance;
    let success = mean(
        contracts
            .values()
            .map(|c| c.contract_performance.execution_success_rate),
    );
    let audit = mean(contracts.values().map(|c| c.security_metrics.audit_score));
    if let (Some(success), Some(audit)) = (success, audit) {
        insights.smart_contract_optimization.push(Insight::new(
            "Smart contract execution and security",
            format!(
                "Average execution success rate {success:.1}%, average audit score {audit:.1} across {} contracts",
                contracts.len()
            ),
            "Contract reliability supports automated liquidity management",
        ));
    }

    insights
}
