use chrono::NaiveDate;
use rust_tabular::ingestion::json::{read_json_path, read_json_str, to_json_string, write_json_path, JsonOptions};
use rust_tabular::processing::{agg, AggSpec};
use rust_tabular::types::Value;
use rust_tabular::TableError;

#[test]
fn read_json_array_from_path_happy_path() {
    let t = read_json_path("tests/fixtures/people.json", &JsonOptions::default()).unwrap();

    assert_eq!(t.row_count(), 3);
    assert_eq!(
        t.column_names(),
        vec!["id", "user.name", "user.dept", "score", "active", "joined"]
    );
    assert_eq!(t.records[0].get("id"), Some(&Value::Int64(1)));
    assert_eq!(t.records[0].get("user.name"), Some(&Value::from("Ada")));
    assert_eq!(t.records[1].get("score"), Some(&Value::Float64(87.25)));
    assert_eq!(t.records[2].get("score"), Some(&Value::Null));
    assert_eq!(t.records[1].get("active"), Some(&Value::Bool(false)));
}

#[test]
fn read_json_with_dates() {
    let opts = JsonOptions {
        parse_dates: true,
        ..JsonOptions::default()
    };
    let t = read_json_path("tests/fixtures/people.json", &opts).unwrap();
    assert_eq!(
        t.records[0].get("joined"),
        Some(&Value::Date(NaiveDate::from_ymd_opt(2021, 3, 14).unwrap()))
    );
}

#[test]
fn read_ndjson_and_aggregate() {
    let t = read_json_path("tests/fixtures/sales.ndjson", &JsonOptions::default()).unwrap();
    assert_eq!(t.row_count(), 5);

    let out = agg(&t, &AggSpec::new().group("Name").sum("Amount").count("Orders")).unwrap();
    assert_eq!(out.row_count(), 3);
    assert_eq!(out.records[0].get("Amount"), Some(&Value::Int64(250)));
    assert_eq!(out.records[1].get("Amount"), Some(&Value::Int64(450)));
    assert_eq!(out.records[2].get("Amount"), Some(&Value::Float64(75.5)));
    assert_eq!(out.records[2].get("Orders"), Some(&Value::Int64(1)));
}

#[test]
fn read_json_errors_on_non_object_rows() {
    let err = read_json_str("[1, 2]", &JsonOptions::default()).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("schema mismatch"));
    assert!(msg.contains("row 1 is not a json object"));
}

#[test]
fn read_json_errors_on_missing_file() {
    let err = read_json_path("tests/fixtures/does_not_exist.json", &JsonOptions::default()).unwrap_err();
    assert!(matches!(err, TableError::Io(_)));
}

#[test]
fn written_json_reads_back_identically() {
    let t = read_json_path("tests/fixtures/people.json", &JsonOptions::default()).unwrap();
    let path = std::env::temp_dir().join(format!("rust_tabular_people_{}.json", std::process::id()));

    write_json_path(&path, &t).unwrap();
    let back = read_json_path(&path, &JsonOptions::default()).unwrap();
    let _ = std::fs::remove_file(&path);

    // Dot-path names stay flat on output, so they read back as the same fields.
    assert_eq!(back, t);
    assert!(to_json_string(&t).unwrap().contains("\"user.name\": \"Ada\""));
}
