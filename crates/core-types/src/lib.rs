//! # Liquidity Research Core Types
//!
//! Layer 0 of the workspace: the data model every other crate speaks.
//!
//! ## Public API
//!
//! - `Provider` / `ProviderMetrics`: one analyzed market or blockchain network, with its
//!   metrics held as a tagged union so each kind is matched exhaustively.
//! - `ProviderKind` and `Grade`: the closed enums used throughout the reports.
//! - `CoreError`: the specific error types that can be returned from this crate.

pub mod enums;
pub mod error;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::{Grade, ProviderKind};
pub use error::CoreError;
pub use structs::{
    AgentNetwork, BlockchainMetrics, CrossChainMetrics, DefiIntegration, FloatBalances,
    OffchainMetrics, OnchainMetrics, Provider, ProviderMetrics, SmartContractPerformance,
    TransactionCounts, BLOCKCHAIN_REGION, UNKNOWN_REGION,
};
