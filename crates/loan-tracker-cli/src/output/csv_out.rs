use std::io;

use loan_tracker_core::loan::{StatementRow, EXPORT_HEADERS};
use serde_json::{Map, Value};

use super::{cell, flatten};

/// Write output as CSV to stdout.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    let result = match value {
        Value::Object(map) => match map.get("result") {
            Some(Value::Object(result)) => write_fields(&mut wtr, result),
            Some(Value::Array(rows)) => write_rows(&mut wtr, rows),
            _ => write_fields(&mut wtr, map),
        },
        Value::Array(rows) => write_rows(&mut wtr, rows),
        other => wtr.write_record([cell(other, "")]),
    };

    if let Err(e) = result.and_then(|_| wtr.flush().map_err(csv::Error::from)) {
        eprintln!("CSV output error: {}", e);
    }
}

/// Write a statement in export column order, values as stored.
pub fn write_statement<W: io::Write>(rows: &[StatementRow], writer: W) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(EXPORT_HEADERS)?;
    for row in rows {
        wtr.write_record(row.export_record())?;
    }
    wtr.flush()?;
    Ok(())
}

fn write_fields<W: io::Write>(
    wtr: &mut csv::Writer<W>,
    map: &Map<String, Value>,
) -> Result<(), csv::Error> {
    wtr.write_record(["field", "value"])?;
    for (key, val) in flatten(map) {
        wtr.write_record([key, cell(&val, "")])?;
    }
    Ok(())
}

fn write_rows<W: io::Write>(wtr: &mut csv::Writer<W>, rows: &[Value]) -> Result<(), csv::Error> {
    let Some(Value::Object(first)) = rows.first() else {
        for item in rows {
            wtr.write_record([cell(item, "")])?;
        }
        return Ok(());
    };

    let headers: Vec<String> = flatten(first).into_iter().map(|(k, _)| k).collect();
    wtr.write_record(&headers)?;
    for item in rows {
        if let Value::Object(map) = item {
            let flat = flatten(map);
            let record: Vec<String> = headers
                .iter()
                .map(|h| {
                    flat.iter()
                        .find(|(k, _)| k == h)
                        .map(|(_, v)| cell(v, ""))
                        .unwrap_or_default()
                })
                .collect();
            wtr.write_record(&record)?;
        }
    }
    Ok(())
}
