//! # Liquidity Research Report
//!
//! Layer 2 of the workspace. Composes the analytics results into one nested,
//! immutable `ResearchReport` and provides its output surfaces.
//!
//! ## Public API
//!
//! - `ReportAssembler`: runs sourcing, efficiency, regional, insight and onchain
//!   analysis in dependency order and adds metadata and conclusions.
//! - `ResearchReport`: the serializable report, with `save_json` / `load_json`.
//! - `render_html`: a self-contained HTML view of a report.
//! - `ReportError`: the specific error types that can be returned from this crate.

pub mod assembler;
pub mod error;
pub mod html;
pub mod model;

pub use assembler::ReportAssembler;
pub use error::ReportError;
pub use html::render_html;
pub use model::{
    Conclusions, EfficiencySection, Findings, LiquiditySourcingSection, Methodology,
    OnchainSection, ResearchMetadata, ResearchReport,
};
