pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::Value;

/// Keys under `result` holding per-period rows rather than scalar fields.
pub const ROW_KEYS: [&str; 2] = ["schedule", "summary"];

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// Render a JSON scalar for a table cell or CSV field.
pub fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

/// The per-period rows of a result, if it carries any.
pub fn result_rows(result: &Value) -> Option<&[Value]> {
    ROW_KEYS
        .iter()
        .find_map(|k| result.get(*k).and_then(Value::as_array))
        .map(Vec::as_slice)
}
