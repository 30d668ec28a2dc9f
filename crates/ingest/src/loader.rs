use crate::error::IngestError;
use crate::normalizer::RawInput;
use serde_json::{Map, Number, Value};
use std::fs;
use std::io::Read;
use std::path::Path;

/// Prefix of CSV columns that carry one liquidity source's volume.
const VOLUME_COLUMN_PREFIX: &str = "volume_";

/// Numeric CSV columns and where they land in the market record.
const CSV_METRIC_COLUMNS: [(&str, &str, &str); 9] = [
    ("attempted", "transaction_metrics", "attempted"),
    ("successful", "transaction_metrics", "successful"),
    ("failed", "transaction_metrics", "failed"),
    ("total_volume", "float_metrics", "total_volume"),
    ("average_float", "float_metrics", "average_float"),
    ("agents_total", "agent_network_metrics", "total"),
    ("agents_active", "agent_network_metrics", "active"),
    ("agents_with_liquidity", "agent_network_metrics", "with_liquidity"),
    ("agents_with_cash", "agent_network_metrics", "with_cash"),
];

/// Loads a record set from disk, dispatching on the file extension.
pub fn load_path(path: &Path) -> Result<RawInput, IngestError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let input = match extension.as_str() {
        "json" => {
            let text = fs::read_to_string(path).map_err(|source| IngestError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            serde_json::from_str(&text)?
        }
        "csv" => {
            let file = fs::File::open(path).map_err(|source| IngestError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            parse_csv(file)?
        }
        _ => return Err(IngestError::UnsupportedFormat(path.display().to_string())),
    };

    tracing::info!(path = %path.display(), "Loaded market data.");
    Ok(input)
}

/// Parses a flat per-market CSV export into the legacy market-map shape.
pub fn parse_csv<R: Read>(reader: R) -> Result<RawInput, IngestError> {
    let mut reader = csv::Reader::from_reader(reader);
    let headers = reader.headers()?.clone();
    let mut markets = Map::new();

    for (index, record) in reader.records().enumerate() {
        let record = record?;
        // Header is line 1.
        let row = index + 2;
        let cell = |column: &str| {
            headers
                .iter()
                .position(|h| h.trim() == column)
                .and_then(|i| record.get(i))
                .map(str::trim)
                .filter(|value| !value.is_empty())
        };

        let mut market = Map::new();
        for column in ["market_name", "country", "region"] {
            if let Some(value) = cell(column) {
                market.insert(column.to_string(), Value::String(value.to_string()));
            }
        }

        let mut sources = Vec::new();
        let mut volumes = Map::new();
        for (header, value) in headers.iter().zip(record.iter()) {
            let Some(source) = header.trim().strip_prefix(VOLUME_COLUMN_PREFIX) else {
                continue;
            };
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            sources.push(Value::String(source.to_string()));
            volumes.insert(source.to_string(), parse_number(row, header, value)?);
        }
        market.insert("liquidity_sources".to_string(), Value::Array(sources));
        market.insert("liquidity_volumes".to_string(), Value::Object(volumes));

        for (column, group, field) in CSV_METRIC_COLUMNS {
            if let Some(value) = cell(column) {
                let number = parse_number(row, column, value)?;
                let group = market
                    .entry(group.to_string())
                    .or_insert_with(|| Value::Object(Map::new()));
                if let Some(group) = group.as_object_mut() {
                    group.insert(field.to_string(), number);
                }
            }
        }

        let key = cell("market_key")
            .or_else(|| cell("market_name"))
            .map(str::to_string)
            .unwrap_or_else(|| format!("market_{row}"));
        markets.insert(key, Value::Object(market));
    }

    Ok(Value::Object(markets))
}

fn parse_number(row: usize, column: &str, value: &str) -> Result<Value, IngestError> {
    value
        .parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .ok_or_else(|| IngestError::InvalidCsvValue {
            row,
            column: column.to_string(),
            value: value.to_string(),
        })
}
