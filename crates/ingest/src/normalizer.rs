use crate::error::IngestError;
use crate::validation::ValidationWarning;
use core_types::{OffchainMetrics, OnchainMetrics, Provider, ProviderKind, ProviderMetrics};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// The already-parsed input record set handed to the engine.
pub type RawInput = Value;

/// The two accepted top-level shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputShape {
    /// `{"providers": [{name, type, metrics}, ...]}`
    ProviderList,
    /// `{market_key: metrics, ...}`
    MarketMap,
}

impl InputShape {
    pub fn describe(&self) -> &'static str {
        match self {
            InputShape::ProviderList => "Providers array with offchain/onchain classification",
            InputShape::MarketMap => "Legacy market map (offchain/hybrid inferred)",
        }
    }
}

/// The result of normalization: the canonical provider list plus any advisory warnings.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub shape: InputShape,
    pub providers: Vec<Provider>,
    pub warnings: Vec<ValidationWarning>,
}

/// Determines which of the supported shapes `input` has.
pub fn detect_shape(input: &RawInput) -> Result<InputShape, IngestError> {
    let Some(object) = input.as_object() else {
        return Err(IngestError::TypeMismatch(json_type_name(input).to_string()));
    };
    match object.get("providers") {
        Some(Value::Array(_)) => Ok(InputShape::ProviderList),
        Some(other) => Err(IngestError::TypeMismatch(format!(
            "`providers` as {}",
            json_type_name(other)
        ))),
        None => Ok(InputShape::MarketMap),
    }
}

/// Converts either input shape into one canonical list of providers.
pub fn normalize(input: &RawInput) -> Result<Vec<Provider>, IngestError> {
    normalize_with_warnings(input).map(|normalized| normalized.providers)
}

/// Like [`normalize`], but also returns the advisory warnings raised while decoding.
pub fn normalize_with_warnings(input: &RawInput) -> Result<Normalized, IngestError> {
    let shape = detect_shape(input)?;
    let mut warnings = Vec::new();

    let providers: Vec<Provider> = match shape {
        InputShape::ProviderList => input
            .get("providers")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .map(|entry| provider_from_entry(entry, &mut warnings))
            .collect(),
        InputShape::MarketMap => input
            .as_object()
            .into_iter()
            .flatten()
            .filter_map(|(key, market)| provider_from_market(key, market, &mut warnings))
            .collect(),
    };

    for warning in &warnings {
        tracing::warn!(provider = warning.provider(), "{warning}");
    }
    tracing::info!(
        providers = providers.len(),
        shape = shape.describe(),
        "Normalized input records."
    );

    Ok(Normalized {
        shape,
        providers,
        warnings,
    })
}

fn provider_from_entry(entry: &Value, warnings: &mut Vec<ValidationWarning>) -> Provider {
    let name = entry
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or("Unknown")
        .to_string();
    let declared_type = entry
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or("unknown");
    let metrics = entry.get("metrics").cloned().unwrap_or(Value::Null);

    let metrics = match declared_type.parse::<ProviderKind>() {
        Ok(ProviderKind::Offchain) => {
            ProviderMetrics::Offchain(decode_offchain(&name, metrics, warnings))
        }
        Ok(ProviderKind::Hybrid) => {
            ProviderMetrics::Hybrid(decode_offchain(&name, metrics, warnings))
        }
        Ok(ProviderKind::Onchain) => {
            let onchain: OnchainMetrics = decode_metrics(&name, metrics, warnings);
            ProviderMetrics::Onchain(onchain)
        }
        Ok(ProviderKind::Unknown) | Err(_) => {
            tracing::debug!(
                provider = %name,
                declared_type,
                "Carrying provider of unrecognized type."
            );
            ProviderMetrics::Unknown {
                declared_type: declared_type.to_string(),
            }
        }
    };

    Provider { name, metrics }
}

fn provider_from_market(
    key: &str,
    market: &Value,
    warnings: &mut Vec<ValidationWarning>,
) -> Option<Provider> {
    if !market.is_object() {
        warnings.push(ValidationWarning::MalformedMetrics {
            provider: key.to_string(),
            reason: "market entry is not an object".to_string(),
        });
        return None;
    }

    let name = market
        .get("market_name")
        .and_then(Value::as_str)
        .unwrap_or(key)
        .to_string();
    let has_onchain = ["blockchain_metrics", "defi_integration"]
        .iter()
        .any(|field| market.get(*field).is_some_and(|v| !v.is_null()));

    let offchain = decode_offchain(&name, market.clone(), warnings);
    let metrics = if has_onchain {
        ProviderMetrics::Hybrid(offchain)
    } else {
        ProviderMetrics::Offchain(offchain)
    };
    Some(Provider { name, metrics })
}

/// Decodes an offchain metrics object, dropping unusable liquidity entries first so
/// one bad volume does not discard the whole record.
fn decode_offchain(
    provider: &str,
    mut metrics: Value,
    warnings: &mut Vec<ValidationWarning>,
) -> OffchainMetrics {
    if let Some(object) = metrics.as_object_mut() {
        sanitize_volumes(provider, object, warnings);
        sanitize_sources(provider, object, warnings);
    }

    let mut decoded: OffchainMetrics = decode_metrics(provider, metrics, warnings);

    // Sources are a set; keep the first occurrence of each.
    let mut seen = Vec::with_capacity(decoded.liquidity_sources.len());
    decoded.liquidity_sources.retain(|source| {
        if seen.contains(source) {
            false
        } else {
            seen.push(source.clone());
            true
        }
    });
    decoded
}

fn decode_metrics<T: DeserializeOwned + Default>(
    provider: &str,
    metrics: Value,
    warnings: &mut Vec<ValidationWarning>,
) -> T {
    if metrics.is_null() {
        return T::default();
    }
    match serde_json::from_value(metrics) {
        Ok(decoded) => decoded,
        Err(e) => {
            warnings.push(ValidationWarning::MalformedMetrics {
                provider: provider.to_string(),
                reason: e.to_string(),
            });
            T::default()
        }
    }
}

fn sanitize_volumes(
    provider: &str,
    object: &mut Map<String, Value>,
    warnings: &mut Vec<ValidationWarning>,
) {
    let Some(Value::Object(volumes)) = object.get_mut("liquidity_volumes") else {
        return;
    };
    let mut running_total = 0.0_f64;
    volumes.retain(|source, volume| {
        let reason = match volume.as_f64() {
            None => format!("expected a number, found {}", json_type_name(volume)),
            Some(v) if v < 0.0 => format!("negative volume {v}"),
            Some(v) if !(running_total + v).is_finite() => {
                "volume total would overflow".to_string()
            }
            Some(v) => {
                running_total += v;
                return true;
            }
        };
        warnings.push(ValidationWarning::IgnoredValue {
            provider: provider.to_string(),
            field: format!("liquidity_volumes.{source}"),
            reason,
        });
        false
    });
}

fn sanitize_sources(
    provider: &str,
    object: &mut Map<String, Value>,
    warnings: &mut Vec<ValidationWarning>,
) {
    let Some(Value::Array(sources)) = object.get_mut("liquidity_sources") else {
        return;
    };
    sources.retain(|source| {
        let usable = source.is_string();
        if !usable {
            warnings.push(ValidationWarning::IgnoredValue {
                provider: provider.to_string(),
                field: "liquidity_sources".to_string(),
                reason: format!("expected a string, found {}", json_type_name(source)),
            });
        }
        usable
    });
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
