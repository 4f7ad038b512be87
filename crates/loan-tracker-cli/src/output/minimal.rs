use serde_json::Value;

use super::cell;

/// Print just the key answer value from the output.
///
/// Looks for well-known loan fields in priority order, then falls back to
/// the first field of the result object.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    let priority_keys = [
        "headline",
        "original_emi",
        "total_paid",
        "realised_tenure",
        "closing_balance",
        "deleted",
        "rows",
    ];

    match result_obj {
        Value::Object(map) => {
            for key in &priority_keys {
                if let Some(val) = map.get(*key) {
                    if !val.is_null() {
                        println!("{}", cell(val, "null"));
                        return;
                    }
                }
            }
            if let Some((key, val)) = map.iter().next() {
                println!("{}: {}", key, cell(val, "null"));
                return;
            }
        }
        // lists and statements: one line per entry
        Value::Array(items) => {
            for item in items {
                match item.get("headline").or_else(|| item.get("pending")) {
                    Some(v) => println!("{}", cell(v, "null")),
                    None => println!("{}", cell(item, "null")),
                }
            }
            return;
        }
        _ => {}
    }

    println!("{}", cell(result_obj, "null"));
}
