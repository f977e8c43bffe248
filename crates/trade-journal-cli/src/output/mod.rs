pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::{Map, Value};

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// Flatten nested objects into dotted keys ("calculations.net_pl").
/// Arrays are left as values.
pub fn flatten(map: &Map<String, Value>) -> Vec<(String, Value)> {
    let mut out = Vec::new();
    flatten_into(&mut out, None, map);
    out
}

fn flatten_into(out: &mut Vec<(String, Value)>, prefix: Option<&str>, map: &Map<String, Value>) {
    for (key, val) in map {
        let full = match prefix {
            Some(p) => format!("{}.{}", p, key),
            None => key.clone(),
        };
        match val {
            Value::Object(inner) if !inner.is_empty() => flatten_into(out, Some(&full), inner),
            _ => out.push((full, val.clone())),
        }
    }
}

/// Render a scalar for a table cell or CSV field.
pub fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(format_value).collect();
            items.join("; ")
        }
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
