//! # Liquidity Research Ingest
//!
//! Turns raw market data into the canonical `Provider` list the analyzers consume.
//!
//! ## Public API
//!
//! - `normalize` / `normalize_with_warnings`: accept either a `{"providers": [...]}` object
//!   or a legacy map of market key to metrics, and produce one provider list.
//! - `load_path` / `parse_csv`: read JSON and CSV exports from disk.
//! - `validate`: advisory schema checks. Warnings never abort a report.
//! - `check`: `validate` plus `normalize_with_warnings`, with one merged warning list.
//! - `IngestError`: the fatal errors (unsupported shape or file format, I/O, parse).

pub mod error;
pub mod loader;
pub mod normalizer;
pub mod validation;

pub use error::IngestError;
pub use loader::{load_path, parse_csv};
pub use normalizer::{
    InputShape, Normalized, RawInput, detect_shape, normalize, normalize_with_warnings,
};
pub use validation::{ValidationWarning, check, validate};
