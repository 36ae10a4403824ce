//! Column projection (`select`).

use crate::error::{TableError, TableResult};
use crate::types::{Record, Table};

/// Split a comma-separated column list, trimming whitespace around each name.
///
/// Empty names (`"a,,b"`, `""`) are rejected.
pub fn parse_column_list(list: &str) -> TableResult<Vec<String>> {
    list.split(',')
        .map(|name| {
            let name = name.trim();
            if name.is_empty() {
                Err(TableError::invalid_argument(format!(
                    "empty column name in '{list}'"
                )))
            } else {
                Ok(name.to_string())
            }
        })
        .collect()
}

/// Project `table` onto `columns`, optionally renaming them.
///
/// `columns` and `aliases` are comma-separated lists; `aliases` defaults to `columns`.
/// Output record `i` gets field `aliases[k]` = input field `columns[k]`. A source field
/// that is absent from a record is absent from the output record too.
pub fn select(table: &Table, columns: &str, aliases: Option<&str>) -> TableResult<Table> {
    let sources = parse_column_list(columns)?;
    let targets = match aliases {
        Some(list) => parse_column_list(list)?,
        None => sources.clone(),
    };
    if sources.len() != targets.len() {
        return Err(TableError::invalid_argument(format!(
            "select got {} column(s) but {} alias(es)",
            sources.len(),
            targets.len()
        )));
    }

    Ok(table
        .iter()
        .map(|record| {
            let mut out = Record::new();
            for (source, target) in sources.iter().zip(&targets) {
                if let Some(value) = record.get(source) {
                    out.insert(target.as_str(), value.clone());
                }
            }
            out
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record;
    use crate::types::Value;

    fn people() -> Table {
        Table::new(vec![
            record! { "Name" => "John", "Age" => 30, "City" => "New York" },
            record! { "Name" => "Jane", "Age" => 25 },
        ])
    }

    #[test]
    fn select_projects_and_renames() {
        let out = select(&people(), "Name, City", Some("Who,Where")).unwrap();
        assert_eq!(
            out.records,
            vec![
                record! { "Who" => "John", "Where" => "New York" },
                record! { "Who" => "Jane" },
            ]
        );
    }

    #[test]
    fn select_keeps_requested_order() {
        let out = select(&people(), "Age,Name", None).unwrap();
        assert_eq!(out.records[0].field_names().collect::<Vec<_>>(), vec!["Age", "Name"]);
        assert_eq!(out.records[1].get("Age"), Some(&Value::Int64(25)));
    }

    #[test]
    fn alias_count_must_match() {
        let err = select(&people(), "Name,Age", Some("Only")).unwrap_err();
        assert!(err.to_string().contains("2 column(s) but 1 alias(es)"));
    }

    #[test]
    fn empty_names_are_rejected() {
        assert!(parse_column_list("a,,b").is_err());
        assert_eq!(parse_column_list(" a , b ").unwrap(), vec!["a", "b"]);
    }
}
