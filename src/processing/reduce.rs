//! Column reducers over a sequence of rows.
//!
//! Every reducer takes a slice of rows (a `Table`'s records, or raw [`Value`]s) and an
//! [`Accessor`] selecting the value to reduce.
//!
//! - `Null` values are ignored by every reducer except [`count`].
//! - Numeric reducers reject non-numeric values with [`TableError::TypeMismatch`].
//! - Statistics that divide by the number of values fail with
//!   [`TableError::InsufficientData`] instead of producing `NaN`/`inf`.

use std::cmp::Ordering;

use indexmap::IndexMap;

use crate::accessor::{Accessor, Row};
use crate::error::{TableError, TableResult};
use crate::stats::{self, KahanSum, VarianceKind};
use crate::types::{value_key, Value};

/// Built-in reduction operations over a single column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReduceOp {
    /// Count all rows (including nulls).
    Count,
    /// Sum of numeric values, typed like `agg`'s `Sum`: `Int64` for all-integer input
    /// that does not overflow, otherwise a compensated `Float64`.
    Sum,
    /// Minimum value.
    Min,
    /// Maximum value.
    Max,
    /// `max - min` of numeric values.
    Range,
    /// Compensated mean.
    Avg,
    /// Sample variance.
    Variance,
    /// Sample standard deviation.
    StDev,
    /// Median of numeric values.
    Median,
}

/// Reduce a column using a built-in [`ReduceOp`].
///
/// `Min`/`Max`/`Range` over no values return `Value::Null`; the other statistics
/// propagate their errors.
pub fn reduce<R: Row>(rows: &[R], accessor: &Accessor<'_, R>, op: ReduceOp) -> TableResult<Value> {
    Ok(match op {
        ReduceOp::Count => Value::Int64(count(rows) as i64),
        ReduceOp::Sum => sum_value(rows, accessor)?,
        ReduceOp::Min => min(rows, accessor)?.unwrap_or(Value::Null),
        ReduceOp::Max => max(rows, accessor)?.unwrap_or(Value::Null),
        ReduceOp::Range => range(rows, accessor)?.into(),
        ReduceOp::Avg => Value::Float64(avg(rows, accessor)?),
        ReduceOp::Variance => Value::Float64(variance(rows, accessor)?),
        ReduceOp::StDev => Value::Float64(stdev(rows, accessor)?),
        ReduceOp::Median => Value::Float64(median(rows, accessor)?),
    })
}

/// Numeric values of a column, nulls skipped.
pub fn numbers<R: Row>(rows: &[R], accessor: &Accessor<'_, R>) -> TableResult<Vec<f64>> {
    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        if let Some(v) = numeric(&*accessor.extract(row)?)? {
            out.push(v);
        }
    }
    Ok(out)
}

/// `Ok(None)` for null, the number for numeric values, an error otherwise.
pub(crate) fn numeric(value: &Value) -> TableResult<Option<f64>> {
    match value {
        Value::Null => Ok(None),
        other => other.as_f64().map(Some).ok_or(TableError::TypeMismatch {
            expected: "number",
            found: other.type_name(),
        }),
    }
}

/// Number of rows.
pub fn count<R>(rows: &[R]) -> usize {
    rows.len()
}

/// Number of rows for which `predicate` holds.
pub fn count_where<R, F>(rows: &[R], mut predicate: F) -> usize
where
    F: FnMut(&R) -> bool,
{
    rows.iter().filter(|row| predicate(row)).count()
}

/// Kahan-compensated sum. An empty input sums to `0.0`.
pub fn sum<R: Row>(rows: &[R], accessor: &Accessor<'_, R>) -> TableResult<f64> {
    let mut acc = KahanSum::new();
    for row in rows {
        if let Some(v) = numeric(&*accessor.extract(row)?)? {
            acc.add(v);
        }
    }
    Ok(acc.total())
}

/// Sum as a [`Value`]: an exact `Int64` while every input is an integer and the total
/// fits, the compensated `Float64` total otherwise.
pub fn sum_value<R: Row>(rows: &[R], accessor: &Accessor<'_, R>) -> TableResult<Value> {
    let mut exact = Some(0i64);
    let mut acc = KahanSum::new();
    for row in rows {
        let value = accessor.extract(row)?;
        if let Some(v) = numeric(&value)? {
            acc.add(v);
            exact = match (exact, &*value) {
                (Some(total), Value::Int64(i)) => total.checked_add(*i),
                _ => None,
            };
        }
    }
    Ok(exact.map_or(Value::Float64(acc.total()), Value::Int64))
}

/// Compensated mean of the non-null values.
pub fn avg<R: Row>(rows: &[R], accessor: &Accessor<'_, R>) -> TableResult<f64> {
    let values = numbers(rows, accessor)?;
    stats::mean(&values).ok_or(TableError::InsufficientData {
        op: "avg",
        required: 1,
        found: values.len(),
    })
}

/// Sample variance (`n - 1`).
pub fn variance<R: Row>(rows: &[R], accessor: &Accessor<'_, R>) -> TableResult<f64> {
    variance_with(rows, accessor, VarianceKind::Sample)
}

/// Variance with an explicit divisor convention.
pub fn variance_with<R: Row>(
    rows: &[R],
    accessor: &Accessor<'_, R>,
    kind: VarianceKind,
) -> TableResult<f64> {
    let values = numbers(rows, accessor)?;
    stats::variance(&values, kind).ok_or(TableError::InsufficientData {
        op: "variance",
        required: kind.min_count(),
        found: values.len(),
    })
}

/// Sample standard deviation (`n - 1`).
pub fn stdev<R: Row>(rows: &[R], accessor: &Accessor<'_, R>) -> TableResult<f64> {
    stdev_with(rows, accessor, VarianceKind::Sample)
}

/// Standard deviation with an explicit divisor convention.
pub fn stdev_with<R: Row>(rows: &[R], accessor: &Accessor<'_, R>, kind: VarianceKind) -> TableResult<f64> {
    let values = numbers(rows, accessor)?;
    stats::std_dev(&values, kind).ok_or(TableError::InsufficientData {
        op: "stdev",
        required: kind.min_count(),
        found: values.len(),
    })
}

fn paired_numbers<R: Row>(
    rows: &[R],
    first: &Accessor<'_, R>,
    second: &Accessor<'_, R>,
) -> TableResult<(Vec<f64>, Vec<f64>)> {
    let mut xs = Vec::with_capacity(rows.len());
    let mut ys = Vec::with_capacity(rows.len());
    for row in rows {
        let x = numeric(&*first.extract(row)?)?;
        let y = numeric(&*second.extract(row)?)?;
        if let (Some(x), Some(y)) = (x, y) {
            xs.push(x);
            ys.push(y);
        }
    }
    Ok((xs, ys))
}

/// Sample covariance of two columns. Rows where either side is null are skipped.
pub fn covariance<R: Row>(rows: &[R], first: &Accessor<'_, R>, second: &Accessor<'_, R>) -> TableResult<f64> {
    let (xs, ys) = paired_numbers(rows, first, second)?;
    stats::covariance(&xs, &ys, VarianceKind::Sample).ok_or(TableError::InsufficientData {
        op: "covariance",
        required: 2,
        found: xs.len(),
    })
}

/// Pearson correlation of two columns.
pub fn correlation<R: Row>(rows: &[R], first: &Accessor<'_, R>, second: &Accessor<'_, R>) -> TableResult<f64> {
    let (xs, ys) = paired_numbers(rows, first, second)?;
    if xs.len() < 2 {
        return Err(TableError::InsufficientData {
            op: "correlation",
            required: 2,
            found: xs.len(),
        });
    }
    stats::correlation(&xs, &ys).ok_or(TableError::ZeroVariance { op: "correlation" })
}

fn extreme<R: Row>(rows: &[R], accessor: &Accessor<'_, R>, keep: Ordering) -> TableResult<Option<Value>> {
    let mut best: Option<Value> = None;
    for row in rows {
        let value = accessor.extract(row)?;
        if value.is_null() {
            continue;
        }
        best = match best {
            Some(current) if value.try_cmp(&current)? != keep => Some(current),
            _ => Some(value.into_owned()),
        };
    }
    Ok(best)
}

/// Smallest non-null value, or `None` if there is none.
pub fn min<R: Row>(rows: &[R], accessor: &Accessor<'_, R>) -> TableResult<Option<Value>> {
    extreme(rows, accessor, Ordering::Less)
}

/// Largest non-null value, or `None` if there is none.
pub fn max<R: Row>(rows: &[R], accessor: &Accessor<'_, R>) -> TableResult<Option<Value>> {
    extreme(rows, accessor, Ordering::Greater)
}

/// `max - min` over numeric values, or `None` if there are none.
///
/// Values are ordered with [`f64::total_cmp`] like [`min`] and [`max`], so a `NaN`
/// input makes the range `NaN`.
pub fn range<R: Row>(rows: &[R], accessor: &Accessor<'_, R>) -> TableResult<Option<f64>> {
    let values = numbers(rows, accessor)?;
    let lo = values.iter().copied().min_by(f64::total_cmp);
    let hi = values.iter().copied().max_by(f64::total_cmp);
    Ok(lo.zip(hi).map(|(lo, hi)| hi - lo))
}

/// Median of the numeric values. The input rows are never reordered.
pub fn median<R: Row>(rows: &[R], accessor: &Accessor<'_, R>) -> TableResult<f64> {
    let values = numbers(rows, accessor)?;
    stats::median(&values).ok_or(TableError::InsufficientData {
        op: "median",
        required: 1,
        found: 0,
    })
}

/// Most frequent non-null value(s); ties are returned in first-seen order.
pub fn mode<R: Row>(rows: &[R], accessor: &Accessor<'_, R>) -> TableResult<Vec<Value>> {
    let mut counts: IndexMap<String, (Value, usize)> = IndexMap::new();
    for row in rows {
        let value = accessor.extract(row)?;
        if value.is_null() {
            continue;
        }
        let key = value_key(&value);
        counts.entry(key).or_insert_with(|| (value.into_owned(), 0)).1 += 1;
    }
    let top = counts.values().map(|(_, n)| *n).max().unwrap_or(0);
    Ok(counts
        .into_values()
        .filter(|(_, n)| *n == top)
        .map(|(v, _)| v)
        .collect())
}

/// Distinct values (nulls included) in first-occurrence order.
pub fn unique<R: Row>(rows: &[R], accessor: &Accessor<'_, R>) -> TableResult<Vec<Value>> {
    let mut seen: IndexMap<String, Value> = IndexMap::new();
    for row in rows {
        let value = accessor.extract(row)?;
        let key = value_key(&value);
        seen.entry(key).or_insert_with(|| value.into_owned());
    }
    Ok(seen.into_values().collect())
}
