use rust_tabular::ingestion::{read_json_path, JsonOptions};
use rust_tabular::processing::{desc, df, sort_by, to_object, SortOrder};
use rust_tabular::record;
use rust_tabular::types::{Table, Value};
use rust_tabular::{Accessor, Record, TableError};

fn sales() -> Table {
    read_json_path("tests/fixtures/sales.ndjson", &JsonOptions::default()).unwrap()
}

#[test]
fn df_then_to_table_round_trips() {
    let t = sales();
    let frame = df(&t, None).unwrap();
    assert_eq!(frame.column_names().collect::<Vec<_>>(), vec!["Name", "Age", "Amount"]);
    assert_eq!(frame.row_count(), 5);
    assert_eq!(frame.to_table(), t);
}

#[test]
fn df_rejects_empty_column_names() {
    assert!(matches!(
        df(&sales(), Some("Name,,Age")),
        Err(TableError::InvalidArgument { .. })
    ));
}

#[test]
fn desc_describes_the_sales_fixture() {
    let summary = desc(&sales()).unwrap();
    let by_column = to_object(&summary, &"Column".into()).unwrap();

    let amount = &by_column["Amount"];
    assert_eq!(amount.get("Min"), Some(&Value::Float64(75.5)));
    assert_eq!(amount.get("Max"), Some(&Value::Int64(250)));
    assert_eq!(amount.get("Sum"), Some(&Value::Float64(775.5)));
    assert_eq!(amount.get("Avg"), Some(&Value::Float64(155.1)));
    assert_eq!(amount.get("Count"), Some(&Value::Int64(5)));

    let name = &by_column["Name"];
    assert_eq!(name.get("Unique"), Some(&Value::Int64(3)));
    assert_eq!(name.get("Max"), Some(&Value::from("Mary")));
    assert_eq!(name.get("Avg"), Some(&Value::Null));

    let age = &by_column["Age"];
    assert_eq!(age.get("Unique"), Some(&Value::Int64(3)));
}

#[test]
fn to_object_with_projected_key() {
    let t = sales();
    let key = Accessor::func(|r: &Record| Value::from(format!("{}#{}", r.get_or_null("Name"), r.get_or_null("Amount"))));
    let index = to_object(&t, &key).unwrap();
    assert_eq!(index.len(), 5);
    assert_eq!(index["Mary#75.5"].get("Age"), Some(&Value::Int64(41)));
}

#[test]
fn to_object_requires_a_key() {
    let err = to_object(&sales(), &Accessor::Identity).unwrap_err();
    assert!(err.to_string().contains("requires a key accessor"));
}

#[test]
fn sort_by_descending_amount() {
    let sorted = sort_by(&sales(), &"Amount".into(), SortOrder::Descending).unwrap();
    let amounts: Vec<Value> = sorted.iter().map(|r| r.get_or_null("Amount")).collect();
    assert_eq!(
        amounts,
        vec![
            Value::Int64(250),
            Value::Int64(200),
            Value::Int64(150),
            Value::Int64(100),
            Value::Float64(75.5),
        ]
    );
}

#[test]
fn sort_by_keeps_ties_in_input_order() {
    let t = Table::new(vec![
        record! { "k" => 2, "tag" => "first" },
        record! { "k" => 1 },
        record! { "k" => 2, "tag" => "second" },
        record! { "tag" => "no key" },
    ]);
    let sorted = sort_by(&t, &"k".into(), SortOrder::Descending).unwrap();
    let tags: Vec<Value> = sorted.iter().map(|r| r.get_or_null("tag")).collect();
    assert_eq!(
        tags,
        vec![Value::from("first"), Value::from("second"), Value::Null, Value::from("no key")]
    );
}
