use thiserror::Error;

/// Errors raised while scoring a single provider. The analyzers catch these per
/// provider; they never abort a batch.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    #[error("Metric '{metric}' is not a finite number: {value}")]
    InvalidMetric { metric: &'static str, value: f64 },

    #[error("Error in calculation: {0}")]
    Computation(String),
}
