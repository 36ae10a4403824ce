//! Key-equality joins between two tables.
//!
//! Matching is a nested loop over precomputed right-side keys (O(n·m)); key equality is
//! [`Value::strict_eq`]. A matched output record is the shallow merge of the left record
//! and every matching right record, in right-table order: later fields overwrite earlier
//! ones. Neither input is modified.

use crate::accessor::Accessor;
use crate::error::TableResult;
use crate::types::{Record, Table, Value};

/// Join flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    /// Every left record appears exactly once, matched or not.
    Left,
    /// Only left records with at least one match appear.
    Inner,
}

/// Left join. `right_key` defaults to `left_key`.
///
/// The output always has exactly `left.row_count()` records.
pub fn left_join(
    left: &Table,
    right: &Table,
    left_key: &Accessor<'_, Record>,
    right_key: Option<&Accessor<'_, Record>>,
) -> TableResult<Table> {
    join(left, right, left_key, right_key, JoinKind::Left)
}

/// Inner join. `right_key` defaults to `left_key`.
pub fn inner_join(
    left: &Table,
    right: &Table,
    left_key: &Accessor<'_, Record>,
    right_key: Option<&Accessor<'_, Record>>,
) -> TableResult<Table> {
    join(left, right, left_key, right_key, JoinKind::Inner)
}

/// Join with an explicit [`JoinKind`].
pub fn join(
    left: &Table,
    right: &Table,
    left_key: &Accessor<'_, Record>,
    right_key: Option<&Accessor<'_, Record>>,
    kind: JoinKind,
) -> TableResult<Table> {
    let right_key = right_key.unwrap_or(left_key);
    let right_keys: Vec<Value> = right
        .iter()
        .map(|record| right_key.extract(record).map(|v| v.into_owned()))
        .collect::<TableResult<_>>()?;

    let mut out = Vec::with_capacity(left.row_count());
    for record in left {
        let key = left_key.extract(record)?;
        let mut merged = record.clone();
        let mut matched = false;
        for (candidate, right_record) in right_keys.iter().zip(right) {
            if key.strict_eq(candidate) {
                merged.merge(right_record);
                matched = true;
            }
        }
        if matched || kind == JoinKind::Left {
            out.push(merged);
        }
    }
    Ok(Table::new(out))
}
