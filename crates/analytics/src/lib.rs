//! # Liquidity Analytics Engine
//!
//! The scoring core of the workspace: liquidity-source distributions, weighted
//! efficiency scores with letter grades, agent friction diagnostics, regional
//! disparities, and the threshold-triggered insights drawn from them.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** This is a pure logic crate. It depends only on `core-types`
//!   and `configuration` (Layer 0) and never touches files or the network.
//! - **Fixed at construction:** Weights, caps and thresholds come from `AnalysisConfig`
//!   when an analyzer is built; no call takes them as a parameter.
//! - **Per-provider isolation:** A provider with missing metric groups is skipped for
//!   that section only, and an onchain scoring fault scores that provider 0.
//!
//! ## Public API
//!
//! - `SourcingAnalyzer`: source distributions, primary sources and regional patterns.
//! - `EfficiencyAnalyzer`: offchain and onchain efficiency scores, plus `analyze_frictions`.
//! - `compare_regions`: per-region averages and pairwise disparities.
//! - `InsightGenerator`: findings drawn from the efficiency results.
//! - `OnchainAnalyzer`: blockchain, DeFi, bridge and smart-contract detail views.
//! - `AnalyticsError`: the specific error types that can be returned from this crate.

pub mod efficiency;
pub mod error;
pub mod insights;
pub mod onchain;
pub mod regional;
pub mod sourcing;
pub mod util;

pub use efficiency::{
    EfficiencyAnalysis, EfficiencyAnalyzer, EfficiencyScore, FrictionAnalysis, MarketEfficiency,
    OnchainEfficiency, analyze_frictions,
};
pub use error::AnalyticsError;
pub use insights::{EfficiencyInsights, Insight, InsightGenerator, OnchainEfficiencyInsights};
pub use onchain::{OnchainAnalysis, OnchainAnalyzer, OnchainInsights};
pub use regional::{DisparityPair, RegionalAggregate, RegionalComparison, compare_regions};
pub use sourcing::{SourcingAnalyzer, SourcingFinding, SourcingReport};
