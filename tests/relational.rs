use rust_tabular::processing::{inner_join, left_join, select};
use rust_tabular::record;
use rust_tabular::types::{Record, Table, Value};
use rust_tabular::Accessor;

fn orders() -> Table {
    Table::new(vec![
        record! { "order" => 1, "customer" => 10, "total" => 99.5 },
        record! { "order" => 2, "customer" => 11, "total" => 10.0 },
        record! { "order" => 3, "customer" => 10, "total" => 25.0 },
        record! { "order" => 4, "customer" => 99, "total" => 5.0 },
        record! { "order" => 5, "total" => 1.0 },
    ])
}

fn customers() -> Table {
    Table::new(vec![
        record! { "id" => 10, "name" => "Ada" },
        record! { "id" => 11.0, "name" => "Grace" },
        record! { "id" => "99", "name" => "Not a number" },
    ])
}

#[test]
fn left_join_scenario() {
    let left = Table::new(vec![record! { "a" => 1 }, record! { "a" => 2 }]);
    let right = Table::new(vec![record! { "a" => 1, "b" => "x" }]);
    let out = left_join(&left, &right, &"a".into(), None).unwrap();
    assert_eq!(out.records, vec![record! { "a" => 1, "b" => "x" }, record! { "a" => 2 }]);
}

#[test]
fn left_join_is_total_and_inner_join_is_a_subset() {
    let (l, r) = (orders(), customers());
    let customer: Accessor<'_, Record> = "customer".into();
    let id: Accessor<'_, Record> = "id".into();

    let left = left_join(&l, &r, &customer, Some(&id)).unwrap();
    let inner = inner_join(&l, &r, &customer, Some(&id)).unwrap();

    assert_eq!(left.row_count(), l.row_count());
    assert!(inner.row_count() <= l.row_count());
    // 10 and 11 (11.0 numerically) match; "99" is a string and a missing key never matches.
    assert_eq!(
        inner.iter().map(|r| r.get_or_null("order")).collect::<Vec<_>>(),
        vec![Value::Int64(1), Value::Int64(2), Value::Int64(3)]
    );
    assert_eq!(left.records[1].get("name"), Some(&Value::from("Grace")));
    assert_eq!(left.records[3].get("name"), None);
    assert_eq!(left.records[4], l.records[4]);
}

#[test]
fn inner_join_keeps_all_rows_when_every_key_matches() {
    let l = Table::new(vec![record! { "k" => "a" }, record! { "k" => "b" }]);
    let r = Table::new(vec![record! { "k" => "b", "v" => 2 }, record! { "k" => "a", "v" => 1 }]);
    let out = inner_join(&l, &r, &"k".into(), None).unwrap();
    assert_eq!(out.row_count(), l.row_count());
    assert_eq!(out.records[0].get("v"), Some(&Value::Int64(1)));
}

#[test]
fn right_fields_overwrite_left_fields() {
    let l = Table::new(vec![record! { "id" => 1, "status" => "draft", "owner" => "me" }]);
    let r = Table::new(vec![record! { "id" => 1, "status" => "final" }]);
    let out = left_join(&l, &r, &"id".into(), None).unwrap();
    assert_eq!(out.records[0], record! { "id" => 1, "status" => "final", "owner" => "me" });
    assert_eq!(l.records[0].get("status"), Some(&Value::from("draft")));
}

#[test]
fn select_round_trip_equals_direct_projection() {
    let t = orders();
    let selected = select(&t, "order,total", Some("order,total")).unwrap();
    let projected: Table = t
        .iter()
        .map(|r| {
            r.iter()
                .filter(|(name, _)| matches!(*name, "order" | "total"))
                .map(|(name, value)| (name, value.clone()))
                .collect::<Record>()
        })
        .collect();
    assert_eq!(selected, projected);
}

#[test]
fn select_with_aliases_then_join() {
    let renamed = select(&customers(), "id, name", Some("customer, customer_name")).unwrap();
    let out = inner_join(&orders(), &renamed, &"customer".into(), None).unwrap();
    assert_eq!(out.records[0].get("customer_name"), Some(&Value::from("Ada")));
    assert!(out.records[0].get("name").is_none());
}
