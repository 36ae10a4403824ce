//! Reshaping: columnar view, per-column summaries, keyed lookup and sorting.

use std::cmp::Ordering;

use indexmap::IndexMap;

use crate::accessor::Accessor;
use crate::error::{TableError, TableResult};
use crate::processing::project::parse_column_list;
use crate::processing::reduce;
use crate::types::{DataFrame, Record, Table, Value};

/// Sort direction for [`sort_by`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// Transpose `table` into a [`DataFrame`].
///
/// `columns` is a comma-separated list; when `None`, the first record's fields are used.
/// Records missing a column contribute `Null`.
pub fn df(table: &Table, columns: Option<&str>) -> TableResult<DataFrame> {
    let names = match columns {
        Some(list) => parse_column_list(list)?,
        None => table.column_names(),
    };
    let mut frame = DataFrame::new();
    for name in names {
        let values = table.iter().map(|record| record.get_or_null(&name)).collect();
        frame.insert_column(name, values);
    }
    Ok(frame)
}

/// Descriptive statistics: one record per column of `df(table)`.
///
/// Fields: `Column`, `Min`, `Max`, `Sum`, `Avg`, `StDev`, `Count`, `Unique`.
///
/// - `Min`/`Max` use value ordering, so they also apply to string and date columns.
/// - `Sum`/`Avg`/`StDev` are filled for numeric columns only; `Avg`/`StDev` are `Null`
///   when there are too few values (`StDev` is the sample statistic).
/// - `Count` and `Unique` count non-null values.
///
/// A column mixing incomparable kinds (e.g. numbers and strings) is a
/// [`TableError::TypeMismatch`].
pub fn desc(table: &Table) -> TableResult<Table> {
    let frame = df(table, None)?;
    let mut out = Vec::with_capacity(frame.column_count());
    for (name, column) in frame.columns() {
        let present: Vec<Value> = column.iter().filter(|v| !v.is_null()).cloned().collect();
        let all = Accessor::Identity;
        let is_numeric = present.iter().all(|v| v.as_f64().is_some());

        let mut row = Record::new();
        row.insert("Column", name);
        row.insert("Min", reduce::min(&present, &all)?);
        row.insert("Max", reduce::max(&present, &all)?);
        if is_numeric {
            row.insert("Sum", reduce::sum(&present, &all)?);
            row.insert("Avg", undefined_as_null(reduce::avg(&present, &all))?);
            row.insert("StDev", undefined_as_null(reduce::stdev(&present, &all))?);
        } else {
            row.insert("Sum", Value::Null);
            row.insert("Avg", Value::Null);
            row.insert("StDev", Value::Null);
        }
        row.insert("Count", present.len() as i64);
        row.insert("Unique", reduce::unique(&present, &all)?.len() as i64);
        out.push(row);
    }
    Ok(Table::new(out))
}

/// Map "not enough values" to `Null`; every other error propagates.
fn undefined_as_null(result: TableResult<f64>) -> TableResult<Value> {
    match result {
        Ok(v) => Ok(Value::Float64(v)),
        Err(TableError::InsufficientData { .. }) => Ok(Value::Null),
        Err(e) => Err(e),
    }
}

/// Index records by key for O(1) lookup.
///
/// Keys are rendered with `Display` (`1` and `"1"` collide, as JSON object keys would).
/// `key` must select something: [`Accessor::Identity`] (no key) is rejected before any
/// record is read. A `Null` key or a key seen twice is an error.
pub fn to_object(table: &Table, key: &Accessor<'_, Record>) -> TableResult<IndexMap<String, Record>> {
    if key.is_identity() {
        return Err(TableError::invalid_argument("to_object requires a key accessor"));
    }
    let mut out = IndexMap::with_capacity(table.row_count());
    for (row, record) in table.iter().enumerate() {
        let value = key.extract(record)?;
        if value.is_null() {
            return Err(TableError::invalid_argument(format!(
                "to_object key is null at row {}",
                row + 1
            )));
        }
        let rendered = value.to_string();
        if out.contains_key(&rendered) {
            return Err(TableError::DuplicateKey { key: rendered });
        }
        out.insert(rendered, record.clone());
    }
    Ok(out)
}

/// Stable sort by an accessor. Nulls sort last in either direction.
///
/// All non-null keys must be mutually comparable; otherwise a
/// [`TableError::TypeMismatch`] is returned and nothing is sorted.
pub fn sort_by(table: &Table, key: &Accessor<'_, Record>, order: SortOrder) -> TableResult<Table> {
    let keys: Vec<Value> = table
        .iter()
        .map(|record| key.extract(record).map(|v| v.into_owned()))
        .collect::<TableResult<_>>()?;

    if let Some(first) = keys.iter().find(|v| !v.is_null()) {
        for other in keys.iter().filter(|v| !v.is_null()) {
            first.try_cmp(other)?;
        }
    }

    let mut indices: Vec<usize> = (0..keys.len()).collect();
    indices.sort_by(|&a, &b| match (&keys[a], &keys[b]) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Greater,
        (_, Value::Null) => Ordering::Less,
        (x, y) => {
            // Comparability was checked above.
            let ord = x.try_cmp(y).unwrap_or(Ordering::Equal);
            match order {
                SortOrder::Ascending => ord,
                SortOrder::Descending => ord.reverse(),
            }
        }
    });
    Ok(indices.into_iter().map(|i| table.records[i].clone()).collect())
}
