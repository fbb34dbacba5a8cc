pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::{Map, Value};

/// Result fields that hold row series, in the order they are preferred when
/// only one series can be shown.
pub const SERIES_KEYS: [&str; 7] = ["monthly", "points", "rows", "bank_tiers", "banks", "annual", "events"];

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// The `result` object of an envelope, if there is one.
pub fn result_object(value: &Value) -> Option<&Map<String, Value>> {
    value.as_object()?.get("result")?.as_object()
}

/// First preferred series in `result` that is a non-empty array of objects.
pub fn primary_series(result: &Map<String, Value>) -> Option<(&'static str, &Vec<Value>)> {
    SERIES_KEYS.iter().find_map(|key| match result.get(*key) {
        Some(Value::Array(items)) if items.first().is_some_and(Value::is_object) => Some((*key, items)),
        _ => None,
    })
}

pub fn format_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
