use serde_json::Value;
use tabled::{builder::Builder, Table};

use super::{display_value, is_row_array};

/// Format output as tables using the tabled crate.
///
/// Scalar fields of the result render as one Field/Value table; array fields
/// holding objects (schedule entries, projection points, loan breakdowns)
/// each render as their own rows table below it. Envelope warnings and
/// methodology print as footers.
pub fn print_table(value: &Value) {
    let Some(map) = value.as_object() else {
        println!("{}", display_value(value));
        return;
    };

    let result = map.get("result").unwrap_or(value);

    match result {
        Value::Object(res_map) => {
            let scalars: Vec<(&String, &Value)> = res_map
                .iter()
                .filter(|(_, v)| !is_row_array(v))
                .collect();
            if !scalars.is_empty() {
                let mut builder = Builder::default();
                builder.push_record(["Field", "Value"]);
                for (key, val) in scalars {
                    builder.push_record([key.as_str(), &display_value(val)]);
                }
                println!("{}", Table::from(builder));
            }

            for (key, val) in res_map.iter() {
                if let Value::Array(rows) = val {
                    if is_row_array(val) {
                        println!("\n{key}:");
                        print_rows(rows);
                    }
                }
            }
        }
        Value::Array(arr) if is_row_array(result) => print_rows(arr),
        other => println!("{}", display_value(other)),
    }

    if let Some(Value::Array(warnings)) = map.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(methodology)) = map.get("methodology") {
        println!("\nMethodology: {}", methodology);
    }
}

fn print_rows(rows: &[Value]) {
    let Some(Value::Object(first)) = rows.first() else {
        for row in rows {
            println!("{}", display_value(row));
        }
        return;
    };

    let headers: Vec<String> = first.keys().cloned().collect();
    let mut builder = Builder::default();
    builder.push_record(&headers);

    for row in rows {
        if let Value::Object(fields) = row {
            let record: Vec<String> = headers
                .iter()
                .map(|h| fields.get(h.as_str()).map(display_value).unwrap_or_default())
                .collect();
            builder.push_record(record);
        }
    }

    println!("{}", Table::from(builder));
}
