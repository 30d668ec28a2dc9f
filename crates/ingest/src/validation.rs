use crate::error::IngestError;
use crate::normalizer::{InputShape, Normalized, detect_shape, normalize_with_warnings};
use core_types::ProviderKind;
use serde_json::{Map, Value};
use thiserror::Error;

/// An advisory finding about an input record. Never fatal: analyzers skip whatever
/// metric group the record cannot support.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationWarning {
    #[error("Missing {kind} field '{field}' for {provider}")]
    MissingField {
        provider: String,
        kind: &'static str,
        field: &'static str,
    },

    #[error("Unknown provider type '{declared_type}' for {provider}; it will be skipped")]
    UnknownProviderType {
        provider: String,
        declared_type: String,
    },

    #[error("Inconsistent counts for {provider}: {detail}")]
    InconsistentCounts { provider: String, detail: String },

    #[error("Metrics for {provider} could not be decoded ({reason}); treating them as empty")]
    MalformedMetrics { provider: String, reason: String },

    #[error("Ignored {field} entry for {provider}: {reason}")]
    IgnoredValue {
        provider: String,
        field: String,
        reason: String,
    },
}

impl ValidationWarning {
    pub fn provider(&self) -> &str {
        match self {
            ValidationWarning::MissingField { provider, .. }
            | ValidationWarning::UnknownProviderType { provider, .. }
            | ValidationWarning::InconsistentCounts { provider, .. }
            | ValidationWarning::MalformedMetrics { provider, .. }
            | ValidationWarning::IgnoredValue { provider, .. } => provider,
        }
    }

    /// A short category label for tabular display.
    pub fn category(&self) -> &'static str {
        match self {
            ValidationWarning::MissingField { .. } => "missing field",
            ValidationWarning::UnknownProviderType { .. } => "unknown type",
            ValidationWarning::InconsistentCounts { .. } => "inconsistent counts",
            ValidationWarning::MalformedMetrics { .. } => "malformed metrics",
            ValidationWarning::IgnoredValue { .. } => "ignored value",
        }
    }
}

const OFFCHAIN_REQUIRED: [&str; 5] = [
    "market_name",
    "country",
    "region",
    "liquidity_sources",
    "liquidity_volumes",
];
const ONCHAIN_REQUIRED: [&str; 5] = [
    "tvl_usd",
    "daily_volume_usd",
    "apy_avg",
    "cross_chain_transfers",
    "source",
];
const LEGACY_REQUIRED: [&str; 8] = [
    "market_name",
    "country",
    "region",
    "liquidity_sources",
    "liquidity_volumes",
    "transaction_metrics",
    "float_metrics",
    "agent_network_metrics",
];

/// Checks an input record set for missing or inconsistent fields.
///
/// Fails only when the top-level shape is unsupported. Every warning is also logged.
pub fn validate(input: &Value) -> Result<Vec<ValidationWarning>, IngestError> {
    let shape = detect_shape(input)?;
    let mut warnings = Vec::new();

    match shape {
        InputShape::ProviderList => {
            tracing::info!("Validating providers list structure.");
            let providers = input
                .get("providers")
                .and_then(Value::as_array)
                .map(Vec::as_slice)
                .unwrap_or_default();
            for provider in providers {
                let name = provider
                    .get("name")
                    .and_then(Value::as_str)
                    .unwrap_or("Unknown");
                let declared = provider
                    .get("type")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown");
                let empty = Map::new();
                let metrics = provider
                    .get("metrics")
                    .and_then(Value::as_object)
                    .unwrap_or(&empty);

                match declared.parse::<ProviderKind>() {
                    Ok(ProviderKind::Offchain | ProviderKind::Hybrid) => {
                        let required = &OFFCHAIN_REQUIRED;
                        check_required(name, "offchain", required, metrics, &mut warnings);
                        check_counts(name, metrics, &mut warnings);
                    }
                    Ok(ProviderKind::Onchain) => {
                        let required = &ONCHAIN_REQUIRED;
                        check_required(name, "onchain", required, metrics, &mut warnings);
                    }
                    Ok(ProviderKind::Unknown) | Err(_) => {
                        warnings.push(ValidationWarning::UnknownProviderType {
                            provider: name.to_string(),
                            declared_type: declared.to_string(),
                        })
                    }
                }
            }
        }
        InputShape::MarketMap => {
            tracing::info!("Validating legacy market map structure.");
            let markets = input.as_object().into_iter().flatten();
            for (key, market) in markets {
                let Some(metrics) = market.as_object() else {
                    warnings.push(ValidationWarning::MalformedMetrics {
                        provider: key.clone(),
                        reason: "market entry is not an object".to_string(),
                    });
                    continue;
                };
                let name = metrics
                    .get("market_name")
                    .and_then(Value::as_str)
                    .unwrap_or(key);
                check_required(name, "market", &LEGACY_REQUIRED, metrics, &mut warnings);
                check_counts(name, metrics, &mut warnings);
            }
        }
    }

    for warning in &warnings {
        tracing::warn!(provider = warning.provider(), "{warning}");
    }
    Ok(warnings)
}

/// Validates and normalizes in one pass. The returned warnings cover both steps, with
/// findings reported by both (a non-object market entry) listed once.
pub fn check(input: &Value) -> Result<Normalized, IngestError> {
    let mut warnings = validate(input)?;
    let mut normalized = normalize_with_warnings(input)?;
    for warning in normalized.warnings.drain(..) {
        if !warnings.contains(&warning) {
            warnings.push(warning);
        }
    }
    normalized.warnings = warnings;
    Ok(normalized)
}

fn check_required(
    provider: &str,
    kind: &'static str,
    required: &[&'static str],
    metrics: &Map<String, Value>,
    warnings: &mut Vec<ValidationWarning>,
) {
    for &field in required {
        if !metrics.contains_key(field) {
            warnings.push(ValidationWarning::MissingField {
                provider: provider.to_string(),
                kind,
                field,
            });
        }
    }
}

fn check_counts(
    provider: &str,
    metrics: &Map<String, Value>,
    warnings: &mut Vec<ValidationWarning>,
) {
    let number = |group: &str, field: &str| {
        metrics
            .get(group)
            .and_then(|g| g.get(field))
            .and_then(Value::as_f64)
    };

    if let Some(total) = number("agent_network_metrics", "total") {
        for field in ["active", "with_liquidity", "with_cash"] {
            if let Some(count) = number("agent_network_metrics", field) {
                if count > total {
                    warnings.push(ValidationWarning::InconsistentCounts {
                        provider: provider.to_string(),
                        detail: format!("{field} agents ({count}) exceed total agents ({total})"),
                    });
                }
            }
        }
    }

    if let Some(attempted) = number("transaction_metrics", "attempted") {
        let successful = number("transaction_metrics", "successful").unwrap_or(0.0);
        let failed = number("transaction_metrics", "failed").unwrap_or(0.0);
        if successful + failed > attempted {
            warnings.push(ValidationWarning::InconsistentCounts {
                provider: provider.to_string(),
                detail: format!(
                    "successful ({successful}) + failed ({failed}) transactions exceed attempted ({attempted})"
                ),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_complete_offchain_provider_has_no_warnings() {
        let input = json!({"providers": [{
            "name": "Kenya",
            "type": "offchain",
            "metrics": {
                "market_name": "Kenya", "country": "Kenya", "region": "East Africa",
                "liquidity_sources": ["banks"], "liquidity_volumes": {"banks": 10.0},
                "agent_network_metrics": {"total": 10, "active": 8, "with_liquidity": 7, "with_cash": 9}
            }
        }]});
        assert!(validate(&input).unwrap().is_empty());
    }

    #[test]
    fn test_missing_onchain_fields_reported() {
        let input = json!({"providers": [{
            "name": "Celo", "type": "onchain", "metrics": {"tvl_usd": 1.0, "source": "DefiLlama"}
        }]});
        let warnings = validate(&input).unwrap();
        let missing: Vec<_> = warnings
            .iter()
            .filter_map(|w| match w {
                ValidationWarning::MissingField { field, .. } => Some(*field),
                _ => None,
            })
            .collect();
        assert_eq!(missing, vec!["daily_volume_usd", "apy_avg", "cross_chain_transfers"]);
    }

    #[test]
    fn test_unknown_type_reported() {
        let input = json!({"providers": [{"name": "Mystery", "type": "bank", "metrics": {}}]});
        let warnings = validate(&input).unwrap();
        assert_eq!(
            warnings,
            vec![ValidationWarning::UnknownProviderType {
                provider: "Mystery".to_string(),
                declared_type: "bank".to_string(),
            }]
        );
    }

    #[test]
    fn test_type_matching_agrees_with_normalization() {
        let input = json!({"providers": [
            {"name": "Capitalized", "type": "Offchain", "metrics": {}},
            {"name": "Padded", "type": " onchain", "metrics": {}}
        ]});
        let warnings = validate(&input).unwrap();
        assert_eq!(warnings.len(), 2);
        assert!(warnings.iter().all(|w| w.category() == "unknown type"));

        let providers = crate::normalize(&input).unwrap();
        assert!(providers.iter().all(|p| p.kind() == ProviderKind::Unknown));
    }

    #[test]
    fn test_legacy_map_inconsistent_counts() {
        let input = json!({
            "ghana": {
                "market_name": "Ghana", "country": "Ghana", "region": "West Africa",
                "liquidity_sources": [], "liquidity_volumes": {},
                "transaction_metrics": {"attempted": 100, "successful": 90, "failed": 20},
                "float_metrics": {"total_volume": 1, "average_float": 1},
                "agent_network_metrics": {"total": 10, "active": 12, "with_liquidity": 5, "with_cash": 5}
            }
        });
        let warnings = validate(&input).unwrap();
        assert_eq!(warnings.len(), 2);
        assert!(warnings.iter().all(|w| w.category() == "inconsistent counts"));
        assert!(warnings.iter().all(|w| w.provider() == "Ghana"));
    }

    #[test]
    fn test_check_lists_shared_findings_once() {
        let input = json!({"kenya": {"market_name": "Kenya"}, "junk": 42});
        let checked = check(&input).unwrap();
        assert_eq!(checked.providers.len(), 1);
        let malformed: Vec<_> = checked
            .warnings
            .iter()
            .filter(|w| w.category() == "malformed metrics")
            .collect();
        assert_eq!(malformed.len(), 1);
        assert_eq!(malformed[0].provider(), "junk");
    }

    #[test]
    fn test_check_keeps_normalizer_only_findings() {
        let input = json!({"providers": [{
            "name": "Ghana", "type": "offchain",
            "metrics": {"liquidity_volumes": {"banks": -5.0}}
        }]});
        let checked = check(&input).unwrap();
        assert!(checked.warnings.iter().any(|w| w.category() == "missing field"));
        assert!(checked.warnings.iter().any(|w| w.category() == "ignored value"));
    }

    #[test]
    fn test_unsupported_shape_is_fatal() {
        assert!(matches!(
            validate(&json!([1, 2, 3])),
            Err(IngestError::TypeMismatch(_))
        ));
    }
}
