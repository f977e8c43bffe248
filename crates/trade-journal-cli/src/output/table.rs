use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{flatten, format_value};

/// Format output as a table using the tabled crate.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => {
            if let Some(result) = map.get("result") {
                print_result_table(result, map);
            } else if let Some(Value::Array(items)) = map.get("items") {
                print_page_table(items, map);
            } else {
                print_field_table(map);
            }
        }
        Value::Array(arr) => print_array_table(arr),
        _ => println!("{}", value),
    }
}

fn print_result_table(result: &Value, envelope: &Map<String, Value>) {
    match result {
        Value::Object(res_map) => {
            // Series are shown as their own table after the scalar fields
            let (series, scalars): (Map<String, Value>, Map<String, Value>) = res_map
                .clone()
                .into_iter()
                .partition(|(_, v)| matches!(v, Value::Array(a) if a.first().is_some_and(Value::is_object)));
            print_field_table(&scalars);
            for (name, rows) in &series {
                if let Value::Array(rows) = rows {
                    println!("\n{}:", name);
                    print_array_table(rows);
                }
            }
        }
        _ => print_field_table(envelope),
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn print_page_table(items: &[Value], page: &Map<String, Value>) {
    print_array_table(items);
    let field = |k: &str| page.get(k).map(format_value).unwrap_or_default();
    println!(
        "\nPage {} of {} ({} trades)",
        field("page"),
        field("total_pages"),
        field("total")
    );
}

fn print_field_table(map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in flatten(map) {
        builder.push_record([key, format_value(&val)]);
    }
    println!("{}", Table::from(builder));
}

fn print_array_table(arr: &[Value]) {
    if arr.is_empty() {
        println!("(empty)");
        return;
    }

    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<String> = first.keys().cloned().collect();
        let mut builder = Builder::default();
        builder.push_record(headers.clone());

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(h.as_str()).map(format_value).unwrap_or_default())
                    .collect();
                builder.push_record(row);
            }
        }

        println!("{}", Table::from(builder));
    } else {
        for item in arr {
            println!("{}", format_value(item));
        }
    }
}
