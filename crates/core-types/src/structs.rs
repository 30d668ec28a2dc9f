use crate::enums::ProviderKind;
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Synthetic region assigned to every onchain provider.
pub const BLOCKCHAIN_REGION: &str = "Blockchain Network";
/// Region used when an offchain record does not name one.
pub const UNKNOWN_REGION: &str = "Unknown";

/// One analyzed market or blockchain network.
#[derive(Debug, Clone, PartialEq)]
pub struct Provider {
    /// Unique within a report; used as the result-map key.
    pub name: String,
    pub metrics: ProviderMetrics,
}

/// The metric schema of a provider, selected by its kind.
///
/// Hybrid providers carry the offchain schema; their optional blockchain and DeFi
/// sub-metrics live on `OffchainMetrics`.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderMetrics {
    Offchain(OffchainMetrics),
    Hybrid(OffchainMetrics),
    Onchain(OnchainMetrics),
    /// A provider whose declared type was not recognized.
    Unknown { declared_type: String },
}

impl Provider {
    pub fn kind(&self) -> ProviderKind {
        match &self.metrics {
            ProviderMetrics::Offchain(_) => ProviderKind::Offchain,
            ProviderMetrics::Hybrid(_) => ProviderKind::Hybrid,
            ProviderMetrics::Onchain(_) => ProviderKind::Onchain,
            ProviderMetrics::Unknown { .. } => ProviderKind::Unknown,
        }
    }

    pub fn region(&self) -> &str {
        match &self.metrics {
            ProviderMetrics::Offchain(m) | ProviderMetrics::Hybrid(m) => m.region(),
            ProviderMetrics::Onchain(_) => BLOCKCHAIN_REGION,
            ProviderMetrics::Unknown { .. } => UNKNOWN_REGION,
        }
    }

    /// The traditional metric schema, for offchain and hybrid providers.
    pub fn offchain_metrics(&self) -> Option<&OffchainMetrics> {
        match &self.metrics {
            ProviderMetrics::Offchain(m) | ProviderMetrics::Hybrid(m) => Some(m),
            _ => None,
        }
    }

    pub fn onchain_metrics(&self) -> Option<&OnchainMetrics> {
        match &self.metrics {
            ProviderMetrics::Onchain(m) => Some(m),
            _ => None,
        }
    }
}

/// Metrics of a traditional payment market.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OffchainMetrics {
    pub market_name: Option<String>,
    pub country: Option<String>,
    pub region: Option<String>,
    pub liquidity_sources: Vec<String>,
    pub liquidity_volumes: IndexMap<String, f64>,
    #[serde(deserialize_with = "non_empty")]
    pub transaction_metrics: Option<TransactionCounts>,
    #[serde(deserialize_with = "non_empty")]
    pub float_metrics: Option<FloatBalances>,
    #[serde(deserialize_with = "non_empty")]
    pub agent_network_metrics: Option<AgentNetwork>,
    #[serde(deserialize_with = "non_empty", skip_serializing_if = "Option::is_none")]
    pub blockchain_metrics: Option<BlockchainMetrics>,
    #[serde(deserialize_with = "non_empty", skip_serializing_if = "Option::is_none")]
    pub defi_integration: Option<DefiIntegration>,
    #[serde(deserialize_with = "non_empty", skip_serializing_if = "Option::is_none")]
    pub cross_chain_efficiency: Option<CrossChainMetrics>,
    #[serde(deserialize_with = "non_empty", skip_serializing_if = "Option::is_none")]
    pub smart_contract_performance: Option<SmartContractPerformance>,
}

impl OffchainMetrics {
    pub fn region(&self) -> &str {
        self.region.as_deref().unwrap_or(UNKNOWN_REGION)
    }

    /// True when either blockchain or DeFi sub-metrics are present.
    pub fn has_onchain_data(&self) -> bool {
        self.blockchain_metrics.is_some() || self.defi_integration.is_some()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransactionCounts {
    pub attempted: f64,
    pub successful: f64,
    pub failed: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FloatBalances {
    pub total_volume: f64,
    pub average_float: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentNetwork {
    pub total: f64,
    pub active: f64,
    pub with_liquidity: f64,
    pub with_cash: f64,
}

/// Metrics of a blockchain network or DeFi venue.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OnchainMetrics {
    pub tvl_usd: f64,
    pub daily_volume_usd: f64,
    pub apy_avg: f64,
    pub cross_chain_transfers: f64,
    pub source: Option<String>,
    #[serde(deserialize_with = "non_empty", skip_serializing_if = "Option::is_none")]
    pub blockchain_metrics: Option<BlockchainMetrics>,
    #[serde(deserialize_with = "non_empty", skip_serializing_if = "Option::is_none")]
    pub defi_integration: Option<DefiIntegration>,
    #[serde(deserialize_with = "non_empty", skip_serializing_if = "Option::is_none")]
    pub cross_chain_efficiency: Option<CrossChainMetrics>,
    #[serde(deserialize_with = "non_empty", skip_serializing_if = "Option::is_none")]
    pub smart_contract_performance: Option<SmartContractPerformance>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockchainMetrics {
    pub celo_daily_tx: f64,
    pub stellar_daily_tx: f64,
    pub ethereum_daily_tx: f64,
    pub polygon_daily_tx: f64,
    pub avg_gas_fee_usd: f64,
    pub avg_confirmation_time_seconds: f64,
    pub transactions_per_second: f64,
    pub tvl_usd: f64,
    pub daily_volume_usd: f64,
    pub active_addresses: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefiIntegration {
    pub uniswap_liquidity_usd: f64,
    pub aave_deposits_usd: f64,
    pub compound_borrowing_usd: f64,
    pub makerdao_collateral_usd: f64,
    pub average_apy_percentage: f64,
    pub liquidity_mining_usd: f64,
    pub governance_tokens: f64,
    pub impermanent_loss_risk_score: f64,
    pub smart_contract_risk_score: f64,
    pub liquidity_depth_score: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrossChainMetrics {
    pub celo_stellar_time_seconds: f64,
    pub celo_stellar_cost_usd: f64,
    pub celo_stellar_success_rate: f64,
    pub eth_polygon_time_seconds: f64,
    pub eth_polygon_cost_usd: f64,
    pub eth_polygon_success_rate: f64,
    pub daily_bridge_volume_usd: f64,
    pub monthly_bridge_volume_usd: f64,
    pub bridge_fee_revenue_usd: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmartContractPerformance {
    pub average_gas_used: f64,
    pub gas_optimization_score: f64,
    pub cost_per_transaction_usd: f64,
    pub execution_success_rate: f64,
    pub avg_execution_time_ms: f64,
    pub complexity_score: f64,
    pub audit_score: f64,
    pub bug_bounty_active: bool,
    pub insurance_coverage_usd: f64,
}

/// Treats an absent, `null`, or empty-object metric group as missing.
fn non_empty<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(map)) if map.is_empty() => Ok(None),
        Some(other) => serde_json::from_value(other)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_groups_decode_as_missing() {
        let metrics: OffchainMetrics = serde_json::from_value(json!({
            "region": "West Africa",
            "transaction_metrics": {},
            "float_metrics": null,
            "agent_network_metrics": {"total": 10}
        }))
        .unwrap();
        assert!(metrics.transaction_metrics.is_none());
        assert!(metrics.float_metrics.is_none());
        assert_eq!(metrics.agent_network_metrics.unwrap().total, 10.0);
        assert_eq!(metrics.agent_network_metrics.unwrap().active, 0.0);
    }

    #[test]
    fn test_region_defaults() {
        let provider = Provider {
            name: "Kenya".to_string(),
            metrics: ProviderMetrics::Offchain(OffchainMetrics::default()),
        };
        assert_eq!(provider.region(), UNKNOWN_REGION);
        assert_eq!(provider.kind(), ProviderKind::Offchain);

        let chain = Provider {
            name: "Celo".to_string(),
            metrics: ProviderMetrics::Onchain(OnchainMetrics::default()),
        };
        assert_eq!(chain.region(), BLOCKCHAIN_REGION);
        assert!(chain.offchain_metrics().is_none());
        assert!(chain.onchain_metrics().is_some());
    }

    #[test]
    fn test_hybrid_exposes_offchain_schema() {
        let provider = Provider {
            name: "Nigeria".to_string(),
            metrics: ProviderMetrics::Hybrid(OffchainMetrics {
                region: Some("West Africa".to_string()),
                blockchain_metrics: Some(BlockchainMetrics::default()),
                ..Default::default()
            }),
        };
        assert_eq!(provider.kind(), ProviderKind::Hybrid);
        assert_eq!(provider.region(), "West Africa");
        assert!(provider.offchain_metrics().unwrap().has_onchain_data());
    }

    #[test]
    fn test_onchain_decodes_with_defaults() {
        let metrics: OnchainMetrics = serde_json::from_value(json!({
            "tvl_usd": 50_000_000.0,
            "source": "DefiLlama",
            "smart_contract_performance": {"audit_score": 8.5, "bug_bounty_active": true}
        }))
        .unwrap();
        assert_eq!(metrics.daily_volume_usd, 0.0);
        assert_eq!(metrics.source.as_deref(), Some("DefiLlama"));
        let contract = metrics.smart_contract_performance.unwrap();
        assert!(contract.bug_bounty_active);
        assert_eq!(contract.audit_score, 8.5);
        assert!(metrics.blockchain_metrics.is_none());
    }
}
