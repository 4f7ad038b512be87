pub mod csv_out;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::{Map, Value};

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{}", s),
        Err(e) => eprintln!("JSON serialization error: {}", e),
    }
}

/// Flatten nested objects into dotted keys (`of_total_paid.interest_pct`),
/// keeping field order. Arrays and scalars are left as leaves.
pub fn flatten(map: &Map<String, Value>) -> Vec<(String, Value)> {
    let mut out = Vec::with_capacity(map.len());
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
            Value::Object(inner) => flatten_into(out, Some(full.as_str()), inner),
            _ => out.push((full, val.clone())),
        }
    }
}

/// Render a scalar for a single cell.
pub fn cell(value: &Value, null: &str) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => null.to_string(),
        Value::Array(arr) => arr
            .iter()
            .map(|v| cell(v, null))
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flatten_nested_shares() {
        let value = json!({
            "total_paid": "105504",
            "of_total_paid": { "principal_pct": "94.78", "interest_pct": "5.22" },
            "loans": 1
        });
        let flat = flatten(value.as_object().unwrap());
        let keys: Vec<&str> = flat.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(
            keys,
            vec![
                "total_paid",
                "of_total_paid.principal_pct",
                "of_total_paid.interest_pct",
                "loans"
            ]
        );
    }

    #[test]
    fn test_cell_rendering() {
        assert_eq!(cell(&json!(null), "-"), "-");
        assert_eq!(cell(&json!("Jan 2025"), ""), "Jan 2025");
        assert_eq!(cell(&json!(["a", "b"]), ""), "a, b");
    }
}
