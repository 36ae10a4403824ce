//! Row filtering for [`crate::types::Table`].

use crate::types::{Record, Table};

/// Returns a new [`Table`] containing only records for which `predicate` returns `true`.
///
/// This is a convenience wrapper around [`Table::filter_rows`].
pub fn filter<F>(table: &Table, predicate: F) -> Table
where
    F: FnMut(&Record) -> bool,
{
    table.filter_rows(predicate)
}

#[cfg(test)]
mod tests {
    use super::filter;
    use crate::record;
    use crate::types::{Table, Value};

    fn sample_table() -> Table {
        Table::new(vec![
            record! { "id" => 1, "active" => true, "name" => "a" },
            record! { "id" => 2, "active" => false, "name" => "b" },
            record! { "id" => 3, "active" => true, "name" => "c" },
        ])
    }

    #[test]
    fn filter_rows_by_numeric_predicate() {
        let t = sample_table();
        let out = t.filter_rows(|r| matches!(r.get("id"), Some(Value::Int64(v)) if *v > 1));

        assert_eq!(out.row_count(), 2);
        assert_eq!(
            out.records,
            vec![
                record! { "id" => 2, "active" => false, "name" => "b" },
                record! { "id" => 3, "active" => true, "name" => "c" },
            ]
        );
        // Original unchanged
        assert_eq!(t.row_count(), 3);
    }

    #[test]
    fn filter_rows_by_bool_predicate() {
        let t = sample_table();
        let out = filter(&t, |r| matches!(r.get("active"), Some(Value::Bool(true))));
        assert_eq!(out.column_names(), vec!["id", "active", "name"]);
        assert_eq!(
            out.iter().map(|r| r.get_or_null("name")).collect::<Vec<_>>(),
            vec![Value::from("a"), Value::from("c")]
        );
    }

    #[test]
    fn filter_on_missing_field_matches_nothing() {
        let t = sample_table();
        let out = filter(&t, |r| r.get("missing").is_some());
        assert!(out.is_empty());
    }
}
