use crate::model::{
    Conclusions, EfficiencySection, Findings, LiquiditySourcingSection, Methodology,
    OnchainSection, ResearchMetadata, ResearchReport,
};
use analytics::sourcing::RegionalPattern;
use analytics::{
    EfficiencyAnalyzer, EfficiencyInsights, Insight, InsightGenerator, OnchainAnalysis,
    OnchainAnalyzer, SourcingAnalyzer, compare_regions,
};
use chrono::{DateTime, Utc};
use configuration::{Config, ReportConfig};
use core_types::Provider;
use indexmap::IndexMap;
use uuid::Uuid;

const DEFAULT_DATA_STRUCTURE: &str = "Providers array with offchain/onchain classification";

const SOURCING_QUESTION: &str =
    "Where can and do African payment orchestration companies source liquidity?";
const SOURCING_METHOD: &str = "Source identification and volume analysis by market and region";
const EFFICIENCY_QUESTION: &str = "How efficiently is this liquidity used?";
const EFFICIENCY_METHOD: &str =
    "Multi-dimensional efficiency measurement with regional comparison and onchain integration";
const ONCHAIN_QUESTION: &str = "How do onchain data sources enhance liquidity analysis?";
const ONCHAIN_METHOD: &str =
    "Blockchain metrics, DeFi integration, and cross-chain efficiency analysis";

/// Runs every analyzer in dependency order and wraps the results with metadata.
pub struct ReportAssembler {
    report: ReportConfig,
    data_structure: String,
    sourcing: SourcingAnalyzer,
    efficiency: EfficiencyAnalyzer,
    insights: InsightGenerator,
    onchain: OnchainAnalyzer,
}

impl ReportAssembler {
    pub fn new(config: Config) -> Self {
        Self {
            report: config.report,
            data_structure: DEFAULT_DATA_STRUCTURE.to_string(),
            sourcing: SourcingAnalyzer::new(),
            insights: InsightGenerator::new(config.analysis.insights),
            efficiency: EfficiencyAnalyzer::new(config.analysis),
            onchain: OnchainAnalyzer::new(),
        }
    }

    /// Overrides the input-shape description stamped into the metadata.
    pub fn with_data_structure(mut self, description: impl Into<String>) -> Self {
        self.data_structure = description.into();
        self
    }

    pub fn assemble(&self, providers: &[Provider]) -> ResearchReport {
        self.assemble_at(providers, Utc::now())
    }

    /// Like [`ReportAssembler::assemble`], with a fixed analysis timestamp.
    #[tracing::instrument(skip_all, fields(providers = providers.len()))]
    pub fn assemble_at(&self, providers: &[Provider], timestamp: DateTime<Utc>) -> ResearchReport {
        // 1. Sourcing and efficiency are independent of each other.
        let sourcing = self.sourcing.analyze(providers);
        let efficiency = self.efficiency.analyze(providers);

        // 2. Regional comparison and insights build on the efficiency results.
        let regional_comparison = compare_regions(&efficiency.market_efficiency);
        let efficiency_insights = self
            .insights
            .efficiency_insights(&efficiency.market_efficiency, &regional_comparison);
        let onchain_insights = self
            .insights
            .onchain_efficiency_insights(&efficiency.onchain_efficiency);

        // 3. Onchain detail views.
        let onchain = self.onchain.analyze(providers);

        // 4. Conclusions.
        let conclusions = Conclusions {
            liquidity_sourcing_conclusions: sourcing_conclusions(&sourcing.regional_patterns),
            efficiency_conclusions: efficiency_conclusions(&efficiency_insights),
            onchain_conclusions: onchain_conclusions(&onchain),
        };

        let findings = Findings {
            liquidity_sourcing: LiquiditySourcingSection {
                research_question: SOURCING_QUESTION.to_string(),
                analysis_timestamp: timestamp,
                methodology: SOURCING_METHOD.to_string(),
                findings: sourcing.findings,
                regional_patterns: sourcing.regional_patterns,
                onchain_offchain_comparison: sourcing.onchain_offchain_comparison,
            },
            efficiency_analysis: EfficiencySection {
                research_question: EFFICIENCY_QUESTION.to_string(),
                analysis_timestamp: timestamp,
                methodology: EFFICIENCY_METHOD.to_string(),
                market_efficiency: efficiency.market_efficiency,
                regional_comparison,
                efficiency_insights,
                onchain_efficiency: efficiency.onchain_efficiency,
                onchain_insights,
            },
            onchain_analysis: OnchainSection {
                research_question: ONCHAIN_QUESTION.to_string(),
                analysis_timestamp: timestamp,
                methodology: ONCHAIN_METHOD.to_string(),
                blockchain_networks: onchain.blockchain_networks,
                defi_protocols: onchain.defi_protocols,
                cross_chain_efficiency: onchain.cross_chain_efficiency,
                smart_contract_performance: onchain.smart_contract_performance,
                onchain_insights: onchain.onchain_insights,
            },
        };

        let report = ResearchReport {
            research_metadata: ResearchMetadata {
                report_id: Uuid::new_v4(),
                title: self.report.title.clone(),
                research_questions: self.report.research_questions.clone(),
                methodology_version: self.report.methodology_version.clone(),
                analysis_timestamp: timestamp,
                providers_analyzed: providers.len(),
                data_structure: self.data_structure.clone(),
            },
            methodology: methodology(),
            findings,
            conclusions,
        };

        tracing::info!(
            report_id = %report.research_metadata.report_id,
            "Research report assembled."
        );
        report
    }
}

fn methodology() -> Methodology {
    Methodology {
        liquidity_sourcing_methodology:
            "Source identification and volume analysis by provider type (offchain/onchain) and region"
                .to_string(),
        efficiency_measurement_methodology: EFFICIENCY_METHOD.to_string(),
        onchain_integration_methodology:
            "Blockchain metrics, DeFi protocols, cross-chain efficiency, and smart contract performance analysis"
                .to_string(),
        data_requirements:
            "Provider data with type classification (offchain/onchain), traditional metrics, and blockchain metrics"
                .to_string(),
        analysis_framework:
            "Hybrid analysis combining traditional and blockchain efficiency scoring with cross-chain optimization"
                .to_string(),
    }
}

/// One conclusion per sourcing region.
fn sourcing_conclusions(patterns: &IndexMap<String, RegionalPattern>) -> Vec<Insight> {
    patterns
        .iter()
        .map(|(region, pattern)| {
            Insight::new(
                format!("Regional liquidity sourcing patterns in {region}"),
                format!(
                    "{} markets, {} common sources",
                    pattern.market_count,
                    pattern.common_sources.len()
                ),
                "Regional coordination opportunities for liquidity management",
            )
        })
        .collect()
}

fn efficiency_conclusions(insights: &EfficiencyInsights) -> Vec<Insight> {
    insights
        .key_findings
        .iter()
        .chain(&insights.regional_patterns)
        .cloned()
        .collect()
}

fn onchain_conclusions(analysis: &OnchainAnalysis) -> Vec<Insight> {
    analysis.onchain_insights.all().cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::{
        AgentNetwork, BlockchainMetrics, FloatBalances, Grade, OffchainMetrics, OnchainMetrics,
        ProviderMetrics, TransactionCounts,
    };

    fn providers() -> Vec<Provider> {
        vec![
            Provider {
                name: "Kenya".to_string(),
                metrics: ProviderMetrics::Offchain(OffchainMetrics {
                    market_name: Some("Kenya".to_string()),
                    region: Some("East Africa".to_string()),
                    liquidity_sources: vec!["mobile_money".to_string(), "banks".to_string()],
                    liquidity_volumes: [("mobile_money", 300_000.0), ("banks", 200_000.0)]
                        .into_iter()
                        .map(|(source, volume)| (source.to_string(), volume))
                        .collect(),
                    transaction_metrics: Some(TransactionCounts {
                        attempted: 1000.0,
                        successful: 950.0,
                        failed: 50.0,
                    }),
                    float_metrics: Some(FloatBalances {
                        total_volume: 500_000.0,
                        average_float: 50_000.0,
                    }),
                    agent_network_metrics: Some(AgentNetwork {
                        total: 100.0,
                        active: 80.0,
                        with_liquidity: 70.0,
                        with_cash: 75.0,
                    }),
                    ..Default::default()
                }),
            },
            Provider {
                name: "Celo".to_string(),
                metrics: ProviderMetrics::Onchain(OnchainMetrics {
                    tvl_usd: 50_000_000.0,
                    daily_volume_usd: 2_000_000.0,
                    apy_avg: 8.0,
                    cross_chain_transfers: 50_000.0,
                    source: Some("DefiLlama".to_string()),
                    blockchain_metrics: Some(BlockchainMetrics {
                        tvl_usd: 50_000_000.0,
                        ..Default::default()
                    }),
                    ..Default::default()
                }),
            },
        ]
    }

    #[test]
    fn test_assembles_every_section() {
        let timestamp = Utc::now();
        let report = ReportAssembler::new(Config::default()).assemble_at(&providers(), timestamp);

        let meta = &report.research_metadata;
        assert_eq!(meta.providers_analyzed, 2);
        assert_eq!(meta.analysis_timestamp, timestamp);
        assert_eq!(meta.methodology_version, "2.0");
        assert_eq!(meta.data_structure, DEFAULT_DATA_STRUCTURE);

        let findings = &report.findings;
        assert_eq!(findings.liquidity_sourcing.findings.len(), 2);
        let kenya = findings
            .efficiency_analysis
            .market_efficiency
            .get("Kenya")
            .unwrap();
        assert_eq!(kenya.efficiency_score.grade, Grade::BPlus);
        let celo = findings
            .efficiency_analysis
            .onchain_efficiency
            .get("Celo")
            .unwrap();
        assert_eq!(celo.efficiency_score, 43.33);
        assert_eq!(findings.onchain_analysis.blockchain_networks.len(), 1);
        assert_eq!(findings.onchain_analysis.analysis_timestamp, timestamp);
    }

    #[test]
    fn test_conclusions() {
        let report = ReportAssembler::new(Config::default()).assemble(&providers());
        let conclusions = &report.conclusions;

        assert_eq!(conclusions.liquidity_sourcing_conclusions.len(), 1);
        assert_eq!(
            conclusions.liquidity_sourcing_conclusions[0].evidence,
            "1 markets, 2 common sources"
        );
        // One score-range finding; a single region has no disparities.
        assert_eq!(conclusions.efficiency_conclusions.len(), 1);
        assert_eq!(
            conclusions.onchain_conclusions[0].evidence,
            "$50,000,000 TVL across 1 markets"
        );
    }

    #[test]
    fn test_empty_input_yields_empty_sections() {
        let report = ReportAssembler::new(Config::default())
            .with_data_structure("Legacy market map")
            .assemble(&[]);
        assert_eq!(report.research_metadata.providers_analyzed, 0);
        assert_eq!(report.research_metadata.data_structure, "Legacy market map");
        assert!(report.findings.liquidity_sourcing.findings.is_empty());
        assert!(report.findings.efficiency_analysis.market_efficiency.is_empty());
        assert_eq!(report.conclusions, Conclusions::default());
    }

    #[test]
    fn test_report_ids_are_unique() {
        let assembler = ReportAssembler::new(Config::default());
        let a = assembler.assemble(&[]);
        let b = assembler.assemble(&[]);
        assert_ne!(a.research_metadata.report_id, b.research_metadata.report_id);
    }
}
