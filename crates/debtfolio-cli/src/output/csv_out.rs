use serde_json::Value;
use std::io;

use super::{display_value, is_row_array};

/// Write output as CSV to stdout.
///
/// When the result carries a single row array (schedule entries or projection
/// points), that array becomes the CSV body; otherwise the scalar fields are
/// written as field,value pairs.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    match result {
        Value::Object(map) => {
            let first_rows = map
                .values()
                .filter(|v| is_row_array(v))
                .find_map(Value::as_array);
            if let Some(rows) = first_rows {
                write_rows(&mut wtr, rows);
            } else {
                let _ = wtr.write_record(["field", "value"]);
                for (key, val) in map {
                    let _ = wtr.write_record([key.as_str(), &csv_value(val)]);
                }
            }
        }
        Value::Array(rows) => write_rows(&mut wtr, rows),
        other => {
            let _ = wtr.write_record([&csv_value(other)]);
        }
    }

    let _ = wtr.flush();
}

fn write_rows(wtr: &mut csv::Writer<io::StdoutLock<'_>>, rows: &[Value]) {
    let Some(Value::Object(first)) = rows.first() else {
        for row in rows {
            let _ = wtr.write_record([&csv_value(row)]);
        }
        return;
    };

    let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
    let _ = wtr.write_record(&headers);

    for row in rows {
        if let Value::Object(fields) = row {
            let record: Vec<String> = headers
                .iter()
                .map(|h| fields.get(*h).map(csv_value).unwrap_or_default())
                .collect();
            let _ = wtr.write_record(&record);
        }
    }
}

fn csv_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
        other => display_value(other),
    }
}
