use serde_json::{Map, Value};
use std::io;

use super::{flatten, format_value};

type StdoutWriter = csv::Writer<io::StdoutLock<'static>>;

/// Write output as CSV to stdout.
pub fn print_csv(value: &Value) {
    let mut wtr = csv::Writer::from_writer(io::stdout().lock());

    match value {
        Value::Object(map) => {
            if let Some(Value::Object(result)) = map.get("result") {
                write_fields(&mut wtr, result);
            } else if let Some(Value::Array(items)) = map.get("items") {
                write_array_csv(&mut wtr, items);
            } else {
                write_fields(&mut wtr, map);
            }
        }
        Value::Array(arr) => write_array_csv(&mut wtr, arr),
        _ => {
            let _ = wtr.write_record([format_value(value)]);
        }
    }

    let _ = wtr.flush();
}

/// Two-column CSV: field, value
fn write_fields(wtr: &mut StdoutWriter, map: &Map<String, Value>) {
    let _ = wtr.write_record(["field", "value"]);
    for (key, val) in flatten(map) {
        let _ = wtr.write_record([key, format_value(&val)]);
    }
}

fn write_array_csv(wtr: &mut StdoutWriter, arr: &[Value]) {
    let Some(Value::Object(first)) = arr.first() else {
        for item in arr {
            let _ = wtr.write_record([format_value(item)]);
        }
        return;
    };

    let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
    let _ = wtr.write_record(&headers);
    for item in arr {
        if let Value::Object(map) = item {
            let row: Vec<String> = headers
                .iter()
                .map(|h| map.get(*h).map(format_value).unwrap_or_default())
                .collect();
            let _ = wtr.write_record(&row);
        }
    }
}
