use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod analysis_config;
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use analysis_config::{
    AgentWeights, AnalysisConfig, InsightThresholds, OnchainCaps, ScoringWeights,
};
pub use settings::{Config, LogLevel, LoggingConfig, ReportConfig};

/// Prefix for environment overrides, e.g. `LIQUIDITY__LOGGING__LEVEL=debug`.
const ENV_PREFIX: &str = "LIQUIDITY";

/// Loads the application configuration.
///
/// Reads the optional TOML file at `path` (a missing file is not an error), overlays
/// `LIQUIDITY__*` environment variables, deserializes into our strongly-typed `Config`
/// struct, and validates the analysis rules.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let mut builder = config::Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(config::File::from(path).required(false));
    }
    let settings = builder
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = settings.try_deserialize::<Config>()?;
    config.analysis.validate()?;

    tracing::debug!(?config, "Configuration loaded.");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    /// Writes `contents` to `settings.toml` in a fresh directory. The directory is
    /// removed when the returned guard drops.
    fn temp_toml(contents: &str) -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.toml");
        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.analysis, AnalysisConfig::default());
        assert_eq!(config.report.methodology_version, "2.0");
        assert_eq!(config.report.research_questions.len(), 3);
    }

    #[test]
    fn test_partial_override_keeps_other_defaults() {
        let (_dir, path) = temp_toml(
            r#"
[report]
title = "East Africa Pilot"

[logging]
level = "debug"

[analysis]
float_turnover_cap = 25.0

[analysis.insights]
success_rate_gap_threshold = 2.5
"#,
        );
        let config = load_config(Some(&path)).unwrap();

        assert_eq!(config.report.title, "East Africa Pilot");
        assert_eq!(config.report.methodology_version, "2.0");
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert_eq!(config.analysis.float_turnover_cap, 25.0);
        assert_eq!(config.analysis.insights.success_rate_gap_threshold, 2.5);
        assert_eq!(config.analysis.scoring_weights, ScoringWeights::default());
    }

    #[test]
    fn test_invalid_weights_fail_to_load() {
        let (_dir, path) = temp_toml(
            r#"
[analysis.scoring_weights]
transaction = 0.9
agent_network = 0.35
float_utilization = 0.25
"#,
        );
        let result = load_config(Some(&path));
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }
}
