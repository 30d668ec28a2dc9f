use core_types::{
    BLOCKCHAIN_REGION, OffchainMetrics, OnchainMetrics, Provider, ProviderKind, ProviderMetrics,
};
use crate::util::saturating_sum;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Primary source reported for every onchain provider.
pub const ONCHAIN_PRIMARY_SOURCE: &str = "blockchain_tvl";
const ONCHAIN_SOURCES: [&str; 3] = ["blockchain_tvl", "daily_volume", "cross_chain_transfers"];
const UNKNOWN_DATA_SOURCE: &str = "Unknown";

/// One source's volume and its share of the provider's total.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SourceShare {
    pub volume: f64,
    pub percentage: f64,
}

/// Headline onchain figures carried on an onchain sourcing finding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnchainSourceMetrics {
    pub tvl_usd: f64,
    pub daily_volume_usd: f64,
    pub data_source: String,
}

/// Per-provider sourcing result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourcingFinding {
    pub provider_type: ProviderKind,
    pub market_name: String,
    pub region: String,
    pub liquidity_sources: Vec<String>,
    pub source_distribution: IndexMap<String, SourceShare>,
    /// `None` only when the distribution is empty.
    pub primary_source: Option<String>,
    pub total_liquidity_volume: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub onchain_metrics: Option<OnchainSourceMetrics>,
}

/// Sourcing totals for one region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionalPattern {
    pub markets: Vec<String>,
    /// Union of the member markets' sources, in first-seen order.
    pub common_sources: Vec<String>,
    pub total_volume: f64,
    pub market_count: usize,
    pub avg_volume_per_market: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnchainBucket {
    pub providers: Vec<String>,
    pub total_tvl: f64,
    pub total_daily_volume: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OffchainBucket {
    pub providers: Vec<String>,
    pub total_volume: f64,
}

/// Onchain versus offchain totals. A side is absent when no provider of that kind exists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OnchainOffchainComparison {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub onchain: Option<OnchainBucket>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offchain: Option<OffchainBucket>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourcingReport {
    pub findings: IndexMap<String, SourcingFinding>,
    pub regional_patterns: IndexMap<String, RegionalPattern>,
    pub onchain_offchain_comparison: OnchainOffchainComparison,
}

/// Running totals for a region while the provider list is folded.
#[derive(Debug, Clone, Default, PartialEq)]
struct RegionAccumulator {
    markets: Vec<String>,
    common_sources: Vec<String>,
    total_volume: f64,
}

impl RegionAccumulator {
    fn absorb(mut self, finding: &SourcingFinding) -> Self {
        self.markets.push(finding.market_name.clone());
        for source in &finding.liquidity_sources {
            if !self.common_sources.contains(source) {
                self.common_sources.push(source.clone());
            }
        }
        self.total_volume = saturating_sum([self.total_volume, finding.total_liquidity_volume]);
        self
    }

    fn finish(self) -> RegionalPattern {
        let market_count = self.markets.len();
        let avg_volume_per_market = if market_count > 0 {
            self.total_volume / market_count as f64
        } else {
            0.0
        };
        RegionalPattern {
            markets: self.markets,
            common_sources: self.common_sources,
            total_volume: self.total_volume,
            market_count,
            avg_volume_per_market,
        }
    }
}

/// A liquidity volume as counted in totals. Negative and non-finite volumes count as 0.
fn usable_volume(volume: f64) -> f64 {
    if volume.is_finite() { volume.max(0.0) } else { 0.0 }
}

/// Total of the usable volumes, saturating instead of overflowing.
pub fn total_volume(volumes: &IndexMap<String, f64>) -> f64 {
    saturating_sum(volumes.values().copied().map(usable_volume))
}

/// Splits `volumes` into shares of their total. Every share is 0 when the total is not positive.
///
/// Shares stay within `[0, 100]` and sum to 100 even when the plain total would overflow.
pub fn source_distribution(volumes: &IndexMap<String, f64>) -> IndexMap<String, SourceShare> {
    let sum: f64 = volumes.values().copied().map(usable_volume).sum();
    // Past f64::MAX, rescale by the largest volume so the shares stay exact.
    let (scale, total) = if sum.is_finite() {
        (1.0, sum)
    } else {
        let peak = volumes.values().copied().map(usable_volume).fold(0.0, f64::max);
        let scaled: f64 = volumes.values().map(|&v| usable_volume(v) / peak).sum();
        (peak, scaled)
    };
    volumes
        .iter()
        .map(|(source, &raw)| {
            let volume = usable_volume(raw);
            let share = volume / scale;
            let percentage = if total > 0.0 {
                (share / total * 100.0).clamp(0.0, 100.0)
            } else {
                0.0
            };
            (source.clone(), SourceShare { volume, percentage })
        })
        .collect()
}

/// The source with the largest volume. Ties go to the first-seen source.
pub fn primary_source(distribution: &IndexMap<String, SourceShare>) -> Option<&str> {
    distribution
        .iter()
        .fold(None::<(&str, f64)>, |best, (source, share)| match best {
            Some((_, volume)) if volume >= share.volume => best,
            _ => Some((source.as_str(), share.volume)),
        })
        .map(|(source, _)| source)
}

/// Computes liquidity-source distributions per provider and totals per region.
#[derive(Debug, Default)]
pub struct SourcingAnalyzer {}

impl SourcingAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    #[tracing::instrument(skip_all, fields(providers = providers.len()))]
    pub fn analyze(&self, providers: &[Provider]) -> SourcingReport {
        let mut findings = IndexMap::new();
        let mut comparison = OnchainOffchainComparison::default();
        let mut offchain = OffchainBucket {
            providers: Vec::new(),
            total_volume: 0.0,
        };

        for provider in providers {
            match &provider.metrics {
                ProviderMetrics::Offchain(metrics) | ProviderMetrics::Hybrid(metrics) => {
                    offchain.providers.push(provider.name.clone());
                    offchain.total_volume = saturating_sum([
                        offchain.total_volume,
                        total_volume(&metrics.liquidity_volumes),
                    ]);
                    if let Some(finding) = offchain_finding(provider, metrics) {
                        findings.insert(provider.name.clone(), finding);
                    } else {
                        tracing::debug!(
                            provider = %provider.name,
                            "No liquidity sources or volumes; skipping sourcing finding."
                        );
                    }
                }
                ProviderMetrics::Onchain(metrics) => {
                    let bucket = comparison.onchain.get_or_insert_with(|| OnchainBucket {
                        providers: Vec::new(),
                        total_tvl: 0.0,
                        total_daily_volume: 0.0,
                    });
                    bucket.providers.push(provider.name.clone());
                    bucket.total_tvl = saturating_sum([bucket.total_tvl, metrics.tvl_usd]);
                    bucket.total_daily_volume =
                        saturating_sum([bucket.total_daily_volume, metrics.daily_volume_usd]);
                    findings.insert(provider.name.clone(), onchain_finding(provider, metrics));
                }
                ProviderMetrics::Unknown { declared_type } => {
                    tracing::debug!(
                        provider = %provider.name,
                        declared_type = %declared_type,
                        "Skipping provider of unknown type."
                    );
                }
            }
        }

        if !offchain.providers.is_empty() {
            comparison.offchain = Some(offchain);
        }

        let regional_patterns = regional_patterns(findings.values());

        tracing::info!(
            findings = findings.len(),
            regions = regional_patterns.len(),
            "Completed liquidity sourcing analysis."
        );

        SourcingReport {
            findings,
            regional_patterns,
            onchain_offchain_comparison: comparison,
        }
    }
}

/// Folds offchain and hybrid findings into per-region patterns, in first-seen region order.
pub fn regional_patterns<'a, I>(findings: I) -> IndexMap<String, RegionalPattern>
where
    I: IntoIterator<Item = &'a SourcingFinding>,
{
    findings
        .into_iter()
        .filter(|finding| finding.provider_type.is_offchain_like())
        .fold(
            IndexMap::<String, RegionAccumulator>::new(),
            |mut regions, finding| {
                let slot = regions.entry(finding.region.clone()).or_default();
                *slot = std::mem::take(slot).absorb(finding);
                regions
            },
        )
        .into_iter()
        .map(|(region, acc)| (region, acc.finish()))
        .collect()
}

fn offchain_finding(provider: &Provider, metrics: &OffchainMetrics) -> Option<SourcingFinding> {
    if metrics.liquidity_sources.is_empty() || metrics.liquidity_volumes.is_empty() {
        return None;
    }

    let source_distribution = source_distribution(&metrics.liquidity_volumes);
    let primary_source = primary_source(&source_distribution).map(str::to_string);
    Some(SourcingFinding {
        provider_type: provider.kind(),
        market_name: provider.name.clone(),
        region: metrics.region().to_string(),
        liquidity_sources: metrics.liquidity_sources.clone(),
        total_liquidity_volume: total_volume(&metrics.liquidity_volumes),
        source_distribution,
        primary_source,
        onchain_metrics: None,
    })
}

/// TVL and daily volume measure different things, so each is its own 100% share
/// whenever it is positive.
fn onchain_finding(provider: &Provider, metrics: &OnchainMetrics) -> SourcingFinding {
    let whole = |volume: f64| SourceShare {
        volume,
        percentage: if volume > 0.0 { 100.0 } else { 0.0 },
    };
    let mut source_distribution = IndexMap::new();
    source_distribution.insert("blockchain_tvl".to_string(), whole(metrics.tvl_usd));
    source_distribution.insert("daily_volume".to_string(), whole(metrics.daily_volume_usd));

    SourcingFinding {
        provider_type: ProviderKind::Onchain,
        market_name: provider.name.clone(),
        region: BLOCKCHAIN_REGION.to_string(),
        liquidity_sources: ONCHAIN_SOURCES.iter().map(|s| s.to_string()).collect(),
        source_distribution,
        primary_source: Some(ONCHAIN_PRIMARY_SOURCE.to_string()),
        total_liquidity_volume: metrics.tvl_usd,
        onchain_metrics: Some(OnchainSourceMetrics {
            tvl_usd: metrics.tvl_usd,
            daily_volume_usd: metrics.daily_volume_usd,
            data_source: metrics
                .source
                .clone()
                .unwrap_or_else(|| UNKNOWN_DATA_SOURCE.to_string()),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::assert_close;
    use proptest::prelude::*;

    fn offchain(name: &str, region: &str, volumes: &[(&str, f64)]) -> Provider {
        Provider {
            name: name.to_string(),
            metrics: ProviderMetrics::Offchain(OffchainMetrics {
                region: Some(region.to_string()),
                liquidity_sources: volumes.iter().map(|(s, _)| s.to_string()).collect(),
                liquidity_volumes: volumes.iter().map(|&(s, v)| (s.to_string(), v)).collect(),
                ..Default::default()
            }),
        }
    }

    fn onchain(name: &str, tvl: f64, volume: f64) -> Provider {
        Provider {
            name: name.to_string(),
            metrics: ProviderMetrics::Onchain(OnchainMetrics {
                tvl_usd: tvl,
                daily_volume_usd: volume,
                source: Some("DefiLlama".to_string()),
                ..Default::default()
            }),
        }
    }

    #[test]
    fn test_distribution_and_primary_source() {
        let providers = [offchain(
            "Kenya",
            "East Africa",
            &[("mobile_money", 300.0), ("banks", 100.0)],
        )];
        let report = SourcingAnalyzer::new().analyze(&providers);
        let finding = report.findings.get("Kenya").unwrap();

        assert_eq!(finding.primary_source.as_deref(), Some("mobile_money"));
        assert_eq!(finding.total_liquidity_volume, 400.0);
        let banks = finding.source_distribution.get("banks").unwrap();
        assert_close(banks.percentage, 25.0);
    }

    #[test]
    fn test_primary_source_tie_goes_to_first_seen() {
        let volumes: IndexMap<String, f64> = [("agents", 50.0), ("banks", 50.0), ("users", 10.0)]
            .into_iter()
            .map(|(s, v)| (s.to_string(), v))
            .collect();
        assert_eq!(primary_source(&source_distribution(&volumes)), Some("agents"));
        assert_eq!(primary_source(&IndexMap::new()), None);
    }

    #[test]
    fn test_zero_total_gives_zero_percentages() {
        let volumes: IndexMap<String, f64> =
            [("a".to_string(), 0.0), ("b".to_string(), 0.0)].into_iter().collect();
        let distribution = source_distribution(&volumes);
        assert!(distribution.values().all(|share| share.percentage == 0.0));
    }

    #[test]
    fn test_empty_sources_yield_no_finding() {
        let providers = [offchain("Empty", "West Africa", &[])];
        let report = SourcingAnalyzer::new().analyze(&providers);
        assert!(report.findings.is_empty());
        assert!(report.regional_patterns.is_empty());
        // Still counted on the offchain side of the comparison.
        let bucket = report.onchain_offchain_comparison.offchain.unwrap();
        assert_eq!(bucket.providers, vec!["Empty"]);
    }

    #[test]
    fn test_regional_patterns_union_and_average() {
        let providers = [
            offchain("Kenya", "East Africa", &[("mobile_money", 300.0), ("banks", 100.0)]),
            offchain("Ghana", "West Africa", &[("agents", 50.0)]),
            offchain("Uganda", "East Africa", &[("banks", 200.0), ("agents", 0.0)]),
        ];
        let report = SourcingAnalyzer::new().analyze(&providers);

        assert_eq!(
            report.regional_patterns.keys().collect::<Vec<_>>(),
            vec!["East Africa", "West Africa"]
        );
        let east = report.regional_patterns.get("East Africa").unwrap();
        assert_eq!(east.markets, vec!["Kenya", "Uganda"]);
        assert_eq!(east.common_sources, vec!["mobile_money", "banks", "agents"]);
        assert_eq!(east.market_count, 2);
        assert_eq!(east.total_volume, 600.0);
        assert_eq!(east.avg_volume_per_market, 300.0);
    }

    #[test]
    fn test_onchain_finding_and_comparison() {
        let providers = [
            onchain("Celo", 50_000_000.0, 2_000_000.0),
            onchain("Stellar", 10_000_000.0, 0.0),
            offchain("Kenya", "East Africa", &[("banks", 100.0)]),
        ];
        let report = SourcingAnalyzer::new().analyze(&providers);

        let celo = report.findings.get("Celo").unwrap();
        assert_eq!(celo.region, BLOCKCHAIN_REGION);
        assert_eq!(celo.primary_source.as_deref(), Some(ONCHAIN_PRIMARY_SOURCE));
        assert_eq!(celo.liquidity_sources.len(), 3);
        assert!(celo.source_distribution.values().all(|s| s.percentage == 100.0));
        assert_eq!(celo.onchain_metrics.as_ref().unwrap().data_source, "DefiLlama");

        let stellar = report.findings.get("Stellar").unwrap();
        let volume = stellar.source_distribution.get("daily_volume").unwrap();
        assert_eq!(volume.percentage, 0.0);

        // Onchain findings never form a region.
        assert_eq!(report.regional_patterns.len(), 1);

        let comparison = &report.onchain_offchain_comparison;
        let onchain_side = comparison.onchain.as_ref().unwrap();
        assert_eq!(onchain_side.total_tvl, 60_000_000.0);
        assert_eq!(onchain_side.total_daily_volume, 2_000_000.0);
        assert_eq!(comparison.offchain.as_ref().unwrap().total_volume, 100.0);
    }

    #[test]
    fn test_unknown_providers_are_skipped() {
        let providers = [Provider {
            name: "Mystery".to_string(),
            metrics: ProviderMetrics::Unknown {
                declared_type: "bank".to_string(),
            },
        }];
        let report = SourcingAnalyzer::new().analyze(&providers);
        assert_eq!(report, SourcingReport::default());
    }

    #[test]
    fn test_negative_volumes_count_as_zero() {
        let providers = [offchain("Lagos", "West Africa", &[("a", 200.0), ("b", -100.0)])];
        let report = SourcingAnalyzer::new().analyze(&providers);
        let finding = report.findings.get("Lagos").unwrap();

        assert_eq!(finding.total_liquidity_volume, 200.0);
        assert_eq!(finding.source_distribution.get("a").unwrap().percentage, 100.0);
        assert_eq!(finding.source_distribution.get("b").unwrap().percentage, 0.0);
        assert_eq!(finding.primary_source.as_deref(), Some("a"));
    }

    #[test]
    fn test_overflowing_volumes_stay_finite() {
        let providers = [
            offchain("Big", "East Africa", &[("a", 1e308), ("b", 1e308)]),
            offchain("Bigger", "East Africa", &[("a", 1e308)]),
        ];
        let report = SourcingAnalyzer::new().analyze(&providers);
        let finding = report.findings.get("Big").unwrap();

        assert_eq!(finding.total_liquidity_volume, f64::MAX);
        for share in finding.source_distribution.values() {
            assert_close(share.percentage, 50.0);
        }
        assert_eq!(report.regional_patterns.get("East Africa").unwrap().total_volume, f64::MAX);
        let offchain_side = report.onchain_offchain_comparison.offchain.unwrap();
        assert_eq!(offchain_side.total_volume, f64::MAX);
    }

    proptest! {
        #[test]
        fn prop_percentages_sum_to_100(volumes in prop::collection::vec(-1e9f64..1e9, 1..8)) {
            let map: IndexMap<String, f64> = volumes
                .iter()
                .enumerate()
                .map(|(i, &v)| (format!("source_{i}"), v))
                .collect();
            let distribution = source_distribution(&map);
            let total: f64 = volumes.iter().map(|v| v.max(0.0)).sum();
            let sum: f64 = distribution.values().map(|s| s.percentage).sum();
            if total > 0.0 {
                prop_assert!((sum - 100.0).abs() < 1e-6);
            } else {
                prop_assert_eq!(sum, 0.0);
            }
            prop_assert!(distribution.values().all(|s| (0.0..=100.0 + 1e-9).contains(&s.percentage)));
        }
    }
}
