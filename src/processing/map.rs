//! Record mapping for [`crate::types::Table`].

use crate::types::{Record, Table};

/// Returns a new [`Table`] by applying `mapper` to every record.
///
/// Records may change shape freely; there is no schema to preserve. This is a convenience
/// wrapper around [`Table::map_rows`].
pub fn map<F>(table: &Table, mapper: F) -> Table
where
    F: FnMut(&Record) -> Record,
{
    table.map_rows(mapper)
}
