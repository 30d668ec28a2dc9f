use crate::efficiency::MarketEfficiency;
use crate::util::mean;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Region-level means of the headline efficiency metrics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AverageMetrics {
    pub success_rate: f64,
    pub agent_utilization: f64,
    pub float_turnover: f64,
    pub efficiency_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionalAggregate {
    pub market_count: usize,
    pub average_metrics: AverageMetrics,
    pub markets: Vec<String>,
}

/// Signed differences `first - second` of two regions' averages.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisparityPair {
    pub success_rate_gap: f64,
    pub agent_health_gap: f64,
    pub float_efficiency_gap: f64,
    pub overall_efficiency_gap: f64,
}

impl DisparityPair {
    pub fn between(first: &AverageMetrics, second: &AverageMetrics) -> Self {
        Self {
            success_rate_gap: first.success_rate - second.success_rate,
            agent_health_gap: first.agent_utilization - second.agent_utilization,
            float_efficiency_gap: first.float_turnover - second.float_turnover,
            overall_efficiency_gap: first.efficiency_score - second.efficiency_score,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegionalComparison {
    pub regions: IndexMap<String, RegionalAggregate>,
    /// Keyed `"{first}_vs_{second}"`. Empty with fewer than two regions.
    pub disparity_analysis: IndexMap<String, DisparityPair>,
}

/// Groups scored markets by region, averages them, and compares every pair of regions.
///
/// Regions and pairs follow first-encountered order.
#[tracing::instrument(skip_all, fields(markets = market_efficiency.len()))]
pub fn compare_regions(
    market_efficiency: &IndexMap<String, MarketEfficiency>,
) -> RegionalComparison {
    let grouped = market_efficiency.values().fold(
        IndexMap::<String, Vec<&MarketEfficiency>>::new(),
        |mut groups, market| {
            groups.entry(market.region.clone()).or_default().push(market);
            groups
        },
    );

    let regions: IndexMap<String, RegionalAggregate> = grouped
        .into_iter()
        .map(|(region, markets)| (region, aggregate(&markets)))
        .collect();

    let names: Vec<&str> = regions.keys().map(String::as_str).collect();
    let mut disparity_analysis = IndexMap::new();
    for (i, first) in names.iter().enumerate() {
        for second in &names[i + 1..] {
            let (Some(a), Some(b)) = (regions.get(*first), regions.get(*second)) else {
                continue;
            };
            disparity_analysis.insert(
                format!("{first}_vs_{second}"),
                DisparityPair::between(&a.average_metrics, &b.average_metrics),
            );
        }
    }

    tracing::debug!(
        regions = regions.len(),
        pairs = disparity_analysis.len(),
        "Compared regional efficiency."
    );
    RegionalComparison {
        regions,
        disparity_analysis,
    }
}

fn aggregate(markets: &[&MarketEfficiency]) -> RegionalAggregate {
    let average = |metric: fn(&MarketEfficiency) -> f64| {
        mean(markets.iter().map(|m| metric(m))).unwrap_or_default()
    };
    RegionalAggregate {
        market_count: markets.len(),
        average_metrics: AverageMetrics {
            success_rate: average(|m| m.efficiency_metrics.transaction_efficiency.success_rate),
            agent_utilization: average(|m| {
                m.efficiency_metrics.agent_network_efficiency.utilization_rate
            }),
            float_turnover: average(|m| m.efficiency_metrics.float_efficiency.turnover),
            efficiency_score: average(|m| m.efficiency_score.overall_score),
        },
        markets: markets.iter().map(|m| m.market_name.clone()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::efficiency::EfficiencyAnalyzer;
    use crate::util::assert_close;
    use core_types::{
        AgentNetwork, FloatBalances, OffchainMetrics, Provider, ProviderMetrics,
        TransactionCounts,
    };

    fn market(name: &str, region: &str, successful: f64, active: f64) -> Provider {
        Provider {
            name: name.to_string(),
            metrics: ProviderMetrics::Offchain(OffchainMetrics {
                region: Some(region.to_string()),
                transaction_metrics: Some(TransactionCounts {
                    attempted: 100.0,
                    successful,
                    failed: 100.0 - successful,
                }),
                float_metrics: Some(FloatBalances {
                    total_volume: 1000.0,
                    average_float: 100.0,
                }),
                agent_network_metrics: Some(AgentNetwork {
                    total: 10.0,
                    active,
                    with_liquidity: 10.0,
                    with_cash: 10.0,
                }),
                ..Default::default()
            }),
        }
    }

    fn compare(providers: &[Provider]) -> RegionalComparison {
        let analysis = EfficiencyAnalyzer::default().analyze(providers);
        compare_regions(&analysis.market_efficiency)
    }

    #[test]
    fn test_single_region_has_no_disparities() {
        let comparison = compare(&[
            market("Kenya", "East Africa", 90.0, 8.0),
            market("Uganda", "East Africa", 80.0, 6.0),
        ]);
        assert!(comparison.disparity_analysis.is_empty());

        let east = comparison.regions.get("East Africa").unwrap();
        assert_eq!(east.market_count, 2);
        assert_eq!(east.markets, vec!["Kenya", "Uganda"]);
        assert_close(east.average_metrics.success_rate, 85.0);
        assert_close(east.average_metrics.agent_utilization, 70.0);
        assert_close(east.average_metrics.float_turnover, 10.0);
    }

    #[test]
    fn test_pairs_follow_first_encountered_order() {
        let comparison = compare(&[
            market("Ghana", "West Africa", 80.0, 5.0),
            market("Kenya", "East Africa", 95.0, 8.0),
            market("Zambia", "Southern Africa", 70.0, 9.0),
        ]);
        assert_eq!(
            comparison.disparity_analysis.keys().collect::<Vec<_>>(),
            vec![
                "West Africa_vs_East Africa",
                "West Africa_vs_Southern Africa",
                "East Africa_vs_Southern Africa",
            ]
        );
        let pair = comparison
            .disparity_analysis
            .get("West Africa_vs_East Africa")
            .unwrap();
        assert_close(pair.success_rate_gap, -15.0);
        assert_close(pair.agent_health_gap, -30.0);
        assert_close(pair.float_efficiency_gap, 0.0);
    }

    #[test]
    fn test_disparity_is_antisymmetric() {
        let comparison = compare(&[
            market("Ghana", "West Africa", 80.0, 5.0),
            market("Kenya", "East Africa", 95.0, 8.0),
        ]);
        let west = &comparison.regions.get("West Africa").unwrap().average_metrics;
        let east = &comparison.regions.get("East Africa").unwrap().average_metrics;

        let forward = DisparityPair::between(west, east);
        let backward = DisparityPair::between(east, west);
        assert_eq!(forward.success_rate_gap, -backward.success_rate_gap);
        assert_eq!(forward.overall_efficiency_gap, -backward.overall_efficiency_gap);
        assert_eq!(
            comparison.disparity_analysis.get("West Africa_vs_East Africa"),
            Some(&forward)
        );
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(compare(&[]), RegionalComparison::default());
    }
}
