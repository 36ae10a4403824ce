//! JSON ingestion and output.
//!
//! Supported inputs:
//! - A JSON array of objects: `[{"a":1}, {"a":2}]`
//! - A single JSON object: `{"a":1}`
//! - Newline-delimited JSON (NDJSON): `{"a":1}\n{"a":2}\n`
//!
//! Nested objects are flattened into dot-path field names (`{"user":{"name":"x"}}` becomes
//! `user.name`), the same convention used to address nested fields elsewhere in the crate.

use std::fs;
use std::path::Path;

use chrono::NaiveDate;

use crate::error::{TableError, TableResult};
use crate::types::{Record, Table, Value};

/// Options for [`read_json_str`] / [`read_json_path`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsonOptions {
    /// Flatten nested objects into dot-path fields. When `false`, nested objects are a
    /// [`TableError::SchemaMismatch`].
    pub flatten_nested: bool,
    /// Turn strings of the exact form `YYYY-MM-DD` into [`Value::Date`].
    pub parse_dates: bool,
}

impl Default for JsonOptions {
    fn default() -> Self {
        Self {
            flatten_nested: true,
            parse_dates: false,
        }
    }
}

/// Read a JSON or NDJSON file into a [`Table`].
pub fn read_json_path(path: impl AsRef<Path>, options: &JsonOptions) -> TableResult<Table> {
    let text = fs::read_to_string(path)?;
    read_json_str(&text, options)
}

/// Read JSON from an in-memory string into a [`Table`].
pub fn read_json_str(input: &str, options: &JsonOptions) -> TableResult<Table> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(TableError::SchemaMismatch {
            message: "json input is empty".to_string(),
        });
    }

    // First try parsing as a single JSON value (array or object).
    if let Ok(v) = serde_json::from_str::<serde_json::Value>(trimmed) {
        match v {
            serde_json::Value::Array(items) => read_json_values(&items, options),
            serde_json::Value::Object(_) => read_json_values(std::slice::from_ref(&v), options),
            _ => Err(TableError::SchemaMismatch {
                message: "json must be an object, an array of objects, or NDJSON".to_string(),
            }),
        }
    } else {
        // Fall back to NDJSON.
        let mut values = Vec::new();
        for (i, line) in trimmed.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let v = serde_json::from_str::<serde_json::Value>(line).map_err(|e| TableError::SchemaMismatch {
                message: format!("invalid ndjson at line {}: {}", i + 1, e),
            })?;
            values.push(v);
        }
        read_json_values(&values, options)
    }
}

fn read_json_values(values: &[serde_json::Value], options: &JsonOptions) -> TableResult<Table> {
    let mut records = Vec::with_capacity(values.len());
    for (idx0, v) in values.iter().enumerate() {
        let row_num = idx0 + 1;
        let obj = v.as_object().ok_or_else(|| TableError::SchemaMismatch {
            message: format!("row {row_num} is not a json object"),
        })?;
        let mut record = Record::new();
        flatten_into(&mut record, "", obj, row_num, options)?;
        records.push(record);
    }
    Ok(Table::new(records))
}

fn flatten_into(
    record: &mut Record,
    prefix: &str,
    obj: &serde_json::Map<String, serde_json::Value>,
    row: usize,
    options: &JsonOptions,
) -> TableResult<()> {
    for (key, jv) in obj {
        let name = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match jv {
            serde_json::Value::Object(nested) if options.flatten_nested => {
                flatten_into(record, &name, nested, row, options)?;
            }
            other => {
                let value = convert_json_value(row, &name, other, options)?;
                record.insert(name, value);
            }
        }
    }
    Ok(())
}

fn convert_json_value(
    row: usize,
    column: &str,
    v: &serde_json::Value,
    options: &JsonOptions,
) -> TableResult<Value> {
    match v {
        serde_json::Value::Null => Ok(Value::Null),
        serde_json::Value::Bool(b) => Ok(Value::Bool(*b)),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Int64(i))
            } else {
                n.as_f64().map(Value::Float64).ok_or_else(|| TableError::SchemaMismatch {
                    message: format!("row {row} column '{column}': number {n} is not representable"),
                })
            }
        }
        serde_json::Value::String(s) => {
            if options.parse_dates {
                if let Some(date) = parse_iso_date(s) {
                    return Ok(Value::Date(date));
                }
            }
            Ok(Value::Utf8(s.clone()))
        }
        serde_json::Value::Array(_) => Err(TableError::SchemaMismatch {
            message: format!("row {row} column '{column}': arrays are not supported"),
        }),
        serde_json::Value::Object(_) => Err(TableError::SchemaMismatch {
            message: format!("row {row} column '{column}': nested object (enable flatten_nested)"),
        }),
    }
}

fn parse_iso_date(s: &str) -> Option<NaiveDate> {
    if s.len() != 10 {
        return None;
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// Serialize a table as a pretty-printed JSON array of objects.
pub fn to_json_string(table: &Table) -> TableResult<String> {
    Ok(serde_json::to_string_pretty(table)?)
}

/// Write a table to `path` as a JSON array of objects.
pub fn write_json_path(path: impl AsRef<Path>, table: &Table) -> TableResult<()> {
    let text = to_json_string(table)?;
    fs::write(path, text)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_array_single_object_and_ndjson() {
        let opts = JsonOptions::default();
        assert_eq!(read_json_str(r#"[{"a":1},{"a":2}]"#, &opts).unwrap().row_count(), 2);
        assert_eq!(read_json_str(r#"{"a":1}"#, &opts).unwrap().row_count(), 1);
        let nd = read_json_str("{\"a\":1}\n\n{\"a\":2.5}\n", &opts).unwrap();
        assert_eq!(nd.records[1].get("a"), Some(&Value::Float64(2.5)));
    }

    #[test]
    fn flattens_nested_objects_with_dot_paths() {
        let t = read_json_str(r#"[{"id":1,"user":{"name":"Ada","geo":{"cc":"UK"}}}]"#, &JsonOptions::default())
            .unwrap();
        assert_eq!(t.column_names(), vec!["id", "user.name", "user.geo.cc"]);
        assert_eq!(t.records[0].get("user.geo.cc"), Some(&Value::from("UK")));
    }

    #[test]
    fn nested_objects_rejected_without_flattening() {
        let opts = JsonOptions {
            flatten_nested: false,
            ..JsonOptions::default()
        };
        let err = read_json_str(r#"{"user":{"name":"Ada"}}"#, &opts).unwrap_err();
        assert!(matches!(err, TableError::SchemaMismatch { .. }));
    }

    #[test]
    fn arrays_and_scalars_are_rejected() {
        let opts = JsonOptions::default();
        assert!(read_json_str(r#"[{"tags":[1,2]}]"#, &opts).is_err());
        assert!(read_json_str("42", &opts).is_err());
        assert!(read_json_str("   ", &opts).is_err());
        let err = read_json_str("{\"a\":1}\n{oops", &opts).unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn iso_dates_are_optional() {
        let input = r#"{"d":"2023-07-25","s":"2023-7-25"}"#;
        let plain = read_json_str(input, &JsonOptions::default()).unwrap();
        assert_eq!(plain.records[0].get("d"), Some(&Value::from("2023-07-25")));

        let opts = JsonOptions {
            parse_dates: true,
            ..JsonOptions::default()
        };
        let dated = read_json_str(input, &opts).unwrap();
        assert_eq!(
            dated.records[0].get("d"),
            Some(&Value::Date(NaiveDate::from_ymd_opt(2023, 7, 25).unwrap()))
        );
        assert_eq!(dated.records[0].get("s"), Some(&Value::from("2023-7-25")));
    }

    #[test]
    fn output_is_an_array_of_objects() {
        let t = read_json_str(r#"[{"b":2.0,"a":null}]"#, &JsonOptions::default()).unwrap();
        let text = serde_json::to_string(&t).unwrap();
        assert_eq!(text, r#"[{"b":2,"a":null}]"#);
        assert!(to_json_string(&t).unwrap().starts_with('['));
    }
}
