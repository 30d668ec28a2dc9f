use crate::error::ReportError;
use analytics::efficiency::{MarketEfficiency, OnchainEfficiency};
use analytics::onchain::{
    BlockchainNetworkAnalysis, CrossChainAnalysis, DefiProtocolAnalysis, OnchainInsights,
    SmartContractAnalysis,
};
use analytics::sourcing::{OnchainOffchainComparison, RegionalPattern};
use analytics::{
    EfficiencyInsights, Insight, OnchainEfficiencyInsights, RegionalComparison, SourcingFinding,
};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use uuid::Uuid;

/// The complete output of one analysis run.
///
/// Every keyed section keeps first-encountered order, and the JSON form loads
/// back into an identical value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchReport {
    pub research_metadata: ResearchMetadata,
    pub methodology: Methodology,
    pub findings: Findings,
    pub conclusions: Conclusions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchMetadata {
    pub report_id: Uuid,
    pub title: String,
    pub research_questions: Vec<String>,
    pub methodology_version: String,
    pub analysis_timestamp: DateTime<Utc>,
    pub providers_analyzed: usize,
    /// Describes which input shape the providers came from.
    pub data_structure: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Methodology {
    pub liquidity_sourcing_methodology: String,
    pub efficiency_measurement_methodology: String,
    pub onchain_integration_methodology: String,
    pub data_requirements: String,
    pub analysis_framework: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Findings {
    pub liquidity_sourcing: LiquiditySourcingSection,
    pub efficiency_analysis: EfficiencySection,
    pub onchain_analysis: OnchainSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiquiditySourcingSection {
    pub research_question: String,
    pub analysis_timestamp: DateTime<Utc>,
    pub methodology: String,
    pub findings: IndexMap<String, SourcingFinding>,
    pub regional_patterns: IndexMap<String, RegionalPattern>,
    pub onchain_offchain_comparison: OnchainOffchainComparison,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EfficiencySection {
    pub research_question: String,
    pub analysis_timestamp: DateTime<Utc>,
    pub methodology: String,
    pub market_efficiency: IndexMap<String, MarketEfficiency>,
    pub regional_comparison: RegionalComparison,
    pub efficiency_insights: EfficiencyInsights,
    pub onchain_efficiency: IndexMap<String, OnchainEfficiency>,
    pub onchain_insights: OnchainEfficiencyInsights,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnchainSection {
    pub research_question: String,
    pub analysis_timestamp: DateTime<Utc>,
    pub methodology: String,
    pub blockchain_networks: IndexMap<String, BlockchainNetworkAnalysis>,
    pub defi_protocols: IndexMap<String, DefiProtocolAnalysis>,
    pub cross_chain_efficiency: IndexMap<String, CrossChainAnalysis>,
    pub smart_contract_performance: IndexMap<String, SmartContractAnalysis>,
    pub onchain_insights: OnchainInsights,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conclusions {
    pub liquidity_sourcing_conclusions: Vec<Insight>,
    pub efficiency_conclusions: Vec<Insight>,
    pub onchain_conclusions: Vec<Insight>,
}

impl ResearchReport {
    /// Writes the report as pretty-printed JSON.
    pub fn save_json(&self, path: &Path) -> Result<(), ReportError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|source| ReportError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(path = %path.display(), "Research report saved.");
        Ok(())
    }

    /// Reads back a report written by [`ResearchReport::save_json`].
    pub fn load_json(path: &Path) -> Result<Self, ReportError> {
        let text = fs::read_to_string(path).map_err(|source| ReportError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::ReportAssembler;
    use configuration::Config;
    use core_types::{
        AgentNetwork, FloatBalances, OffchainMetrics, OnchainMetrics, Provider, ProviderMetrics,
        TransactionCounts,
    };
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    fn sample_report() -> ResearchReport {
        let kenya = Provider {
            name: "Kenya".to_string(),
            metrics: ProviderMetrics::Offchain(OffchainMetrics {
                region: Some("East Africa".to_string()),
                liquidity_sources: vec!["banks".to_string()],
                liquidity_volumes: [("banks".to_string(), 1.0 / 3.0)].into_iter().collect(),
                transaction_metrics: Some(TransactionCounts {
                    attempted: 3.0,
                    successful: 2.0,
                    failed: 1.0,
                }),
                float_metrics: Some(FloatBalances {
                    total_volume: 10.0,
                    average_float: 3.0,
                }),
                agent_network_metrics: Some(AgentNetwork {
                    total: 7.0,
                    active: 3.0,
                    with_liquidity: 5.0,
                    with_cash: 6.0,
                }),
                ..Default::default()
            }),
        };
        let celo = Provider {
            name: "Celo".to_string(),
            metrics: ProviderMetrics::Onchain(OnchainMetrics {
                tvl_usd: 12_345_678.9,
                apy_avg: 7.25,
                ..Default::default()
            }),
        };
        ReportAssembler::new(Config::default()).assemble(&[kenya, celo])
    }

    #[test]
    fn test_json_round_trip_is_lossless() {
        let report = sample_report();
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.json");
        report.save_json(&path).unwrap();
        let loaded = ResearchReport::load_json(&path).unwrap();
        assert_eq!(loaded, report);
    }

    #[test]
    fn test_huge_volumes_still_round_trip() {
        let market = |name: &str| Provider {
            name: name.to_string(),
            metrics: ProviderMetrics::Offchain(OffchainMetrics {
                region: Some("East Africa".to_string()),
                liquidity_volumes: [("banks".to_string(), 1e308), ("agents".to_string(), 1e308)]
                    .into_iter()
                    .collect(),
                ..Default::default()
            }),
        };
        let report =
            ReportAssembler::new(Config::default()).assemble(&[market("Kenya"), market("Uganda")]);
        let sourcing = &report.findings.liquidity_sourcing;
        assert_eq!(sourcing.findings["Kenya"].total_liquidity_volume, f64::MAX);
        assert_eq!(sourcing.regional_patterns["East Africa"].total_volume, f64::MAX);

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.json");
        report.save_json(&path).unwrap();
        let loaded = ResearchReport::load_json(&path).unwrap();
        assert_eq!(loaded, report);
    }

    #[test]
    fn test_serialized_shape() {
        let value = serde_json::to_value(sample_report()).unwrap();
        let kenya = &value["findings"]["efficiency_analysis"]["market_efficiency"]["Kenya"];
        assert!(kenya["efficiency_score"]["grade"].is_string());
        let impact = &kenya["friction_analysis"]["service_impact"];
        assert!(impact["cash_out_failures_likely"].is_boolean());
        assert!(value["research_metadata"]["analysis_timestamp"].is_string());
        assert!(value["findings"]["onchain_analysis"]["onchain_insights"].is_object());
        assert!(value["conclusions"]["efficiency_conclusions"].is_array());
    }

    #[test]
    fn test_write_failure_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("report.json");
        let err = sample_report().save_json(&path).unwrap_err();
        assert!(matches!(err, ReportError::Io { .. }));
    }

    #[test]
    fn test_loading_garbage_is_json_error() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"{not json").unwrap();
        let err = ResearchReport::load_json(file.path()).unwrap_err();
        assert!(matches!(err, ReportError::Json(_)));
    }
}
