use serde_json::Value;

use super::{flatten, format_value};

/// Key answer fields, in priority order. Matched on the last path segment.
const PRIORITY_KEYS: [&str; 6] = [
    "net_pl",
    "risk_reward",
    "valid",
    "total_net_pl",
    "status",
    "total",
];

/// Print just the key answer value from the output.
///
/// Heuristic: look for well-known result fields in order of priority,
/// then fall back to the first field in the result object.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Value::Object(map) = result_obj {
        let flat = flatten(map);
        for key in PRIORITY_KEYS {
            let hit = flat.iter().find(|(k, v)| {
                !v.is_null() && k.rsplit('.').next() == Some(key)
            });
            if let Some((_, val)) = hit {
                println!("{}", format_value(val));
                return;
            }
        }

        if let Some((key, val)) = flat.first() {
            println!("{}: {}", key, format_value(val));
            return;
        }
    }

    println!("{}", format_value(result_obj));
}
