use crate::analysis_config::AnalysisConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub report: ReportConfig,
    pub logging: LoggingConfig,
    pub analysis: AnalysisConfig,
}

/// Metadata stamped onto every generated report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub title: String,
    pub methodology_version: String,
    /// The research questions the report answers, in presentation order.
    pub research_questions: Vec<String>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            title: "African Liquidity Markets: Sourcing Patterns and Efficiency Analysis"
                .to_string(),
            methodology_version: "2.0".to_string(),
            research_questions: vec![
                "Where can and do African payment orchestration companies source liquidity?"
                    .to_string(),
                "How efficiently is this liquidity used?".to_string(),
                "How does onchain data integration enhance liquidity analysis?".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: LogLevel,
    /// When set, logs are also written to a daily rolling file in this directory.
    pub directory: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// The directive string understood by `tracing_subscriber::EnvFilter`.
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}
