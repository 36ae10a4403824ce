//! Grouping and aggregation (`agg`).
//!
//! An [`AggSpec`] lists output columns in order, each tagged with an [`AggOp`]. Columns
//! tagged [`AggOp::Group`] form the group key; every other column is reduced per group.
//!
//! ```rust
//! use rust_tabular::processing::{agg, AggSpec};
//! use rust_tabular::record;
//! use rust_tabular::types::{Table, Value};
//!
//! let sales = Table::new(vec![
//!     record! { "Name" => "John", "Amount" => 100 },
//!     record! { "Name" => "Jane", "Amount" => 200 },
//!     record! { "Name" => "John", "Amount" => 150 },
//! ]);
//! let totals = agg(&sales, &AggSpec::new().group("Name").sum("Amount")).unwrap();
//! assert_eq!(totals.records[0].get("Amount"), Some(&Value::Int64(250)));
//! assert_eq!(totals.records[1].get("Name"), Some(&Value::from("Jane")));
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;

use crate::error::{TableError, TableResult};
use crate::processing::reduce::numeric;
use crate::stats::{self, VarianceKind};
use crate::types::{tuple_key, Record, Table, Value, NULL};

/// Per-column operation tag in an [`AggSpec`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggOp {
    /// Part of the group key; the first record's value is copied.
    Group,
    /// Compensated sum. Stays `Int64` while every input is an integer.
    Sum,
    /// Smallest non-null value.
    Min,
    /// Largest non-null value.
    Max,
    /// Number of records in the group.
    Count,
    /// Compensated mean of the non-null values.
    Avg,
    /// Standard deviation of the non-null values ([`AggOptions::variance`] convention).
    StDev,
}

impl AggOp {
    /// Lowercase tag, as accepted by [`FromStr`].
    pub fn as_str(self) -> &'static str {
        match self {
            AggOp::Group => "group",
            AggOp::Sum => "sum",
            AggOp::Min => "min",
            AggOp::Max => "max",
            AggOp::Count => "count",
            AggOp::Avg => "avg",
            AggOp::StDev => "stdev",
        }
    }
}

impl fmt::Display for AggOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AggOp {
    type Err = TableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "group" => Ok(AggOp::Group),
            "sum" => Ok(AggOp::Sum),
            "min" => Ok(AggOp::Min),
            "max" => Ok(AggOp::Max),
            "count" => Ok(AggOp::Count),
            "avg" => Ok(AggOp::Avg),
            "stdev" => Ok(AggOp::StDev),
            other => Err(TableError::invalid_argument(format!(
                "unknown aggregation op '{other}'"
            ))),
        }
    }
}

/// Ordered mapping from output column to [`AggOp`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggSpec {
    columns: Vec<(String, AggOp)>,
}

impl AggSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a column. Re-adding an existing column replaces its op in place.
    pub fn with(mut self, column: impl Into<String>, op: AggOp) -> Self {
        let column = column.into();
        match self.columns.iter_mut().find(|(name, _)| *name == column) {
            Some(entry) => entry.1 = op,
            None => self.columns.push((column, op)),
        }
        self
    }

    pub fn group(self, column: impl Into<String>) -> Self {
        self.with(column, AggOp::Group)
    }

    pub fn sum(self, column: impl Into<String>) -> Self {
        self.with(column, AggOp::Sum)
    }

    pub fn min(self, column: impl Into<String>) -> Self {
        self.with(column, AggOp::Min)
    }

    pub fn max(self, column: impl Into<String>) -> Self {
        self.with(column, AggOp::Max)
    }

    pub fn count(self, column: impl Into<String>) -> Self {
        self.with(column, AggOp::Count)
    }

    pub fn avg(self, column: impl Into<String>) -> Self {
        self.with(column, AggOp::Avg)
    }

    pub fn stdev(self, column: impl Into<String>) -> Self {
        self.with(column, AggOp::StDev)
    }

    /// Columns and ops in output order.
    pub fn columns(&self) -> impl Iterator<Item = (&str, AggOp)> {
        self.columns.iter().map(|(name, op)| (name.as_str(), *op))
    }

    /// Names of the group-key columns.
    pub fn group_columns(&self) -> impl Iterator<Item = &str> {
        self.columns()
            .filter(|(_, op)| *op == AggOp::Group)
            .map(|(name, _)| name)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, AggOp)> for AggSpec {
    fn from_iter<I: IntoIterator<Item = (K, AggOp)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(AggSpec::new(), |spec, (name, op)| spec.with(name, op))
    }
}

/// Options for [`agg_with`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggOptions {
    /// Divisor convention for [`AggOp::StDev`]. Defaults to the sample (`n - 1`) statistic,
    /// the same as [`crate::processing::reduce::stdev`].
    pub variance: VarianceKind,
}

/// Group `table` by the `AggSpec` group columns and reduce the rest.
///
/// One output record per distinct group key, in first-seen order, with fields in spec
/// order. Null inputs are skipped by reduced columns; a group without enough values for
/// `Avg`/`StDev` gets `Null` in that column.
pub fn agg(table: &Table, spec: &AggSpec) -> TableResult<Table> {
    agg_with(table, spec, &AggOptions::default())
}

/// [`agg`] with explicit options.
pub fn agg_with(table: &Table, spec: &AggSpec, options: &AggOptions) -> TableResult<Table> {
    let mut grouping = Grouping::new(spec)?;
    for record in table {
        grouping.update(record)?;
    }
    Ok(grouping.finish(options))
}

#[derive(Debug, Clone)]
struct SumState {
    // Exact integer total while every input is an Int64 and nothing overflowed.
    exact: Option<i64>,
    // Inputs in row order; the float total is compensated over these at finish so that
    // merged chunk partials round exactly like a single pass.
    values: Vec<f64>,
}

#[derive(Debug, Clone)]
enum Accumulator {
    Group(Value),
    Sum(SumState),
    Extreme { keep: Ordering, best: Option<Value> },
    Count(usize),
    Samples { op: AggOp, values: Vec<f64> },
}

impl Accumulator {
    fn start(op: AggOp, value: &Value) -> Self {
        match op {
            AggOp::Group => Accumulator::Group(value.clone()),
            AggOp::Sum => Accumulator::Sum(SumState {
                exact: Some(0),
                values: Vec::new(),
            }),
            AggOp::Min => Accumulator::Extreme {
                keep: Ordering::Less,
                best: None,
            },
            AggOp::Max => Accumulator::Extreme {
                keep: Ordering::Greater,
                best: None,
            },
            AggOp::Count => Accumulator::Count(0),
            AggOp::Avg | AggOp::StDev => Accumulator::Samples { op, values: Vec::new() },
        }
    }

    fn update(&mut self, value: &Value) -> TableResult<()> {
        match self {
            Accumulator::Group(_) => {}
            Accumulator::Sum(state) => {
                if let Some(v) = numeric(value)? {
                    state.values.push(v);
                    state.exact = match (state.exact, value) {
                        (Some(acc), Value::Int64(i)) => acc.checked_add(*i),
                        _ => None,
                    };
                }
            }
            Accumulator::Extreme { keep, best } => {
                if !value.is_null() {
                    let replace = match best {
                        None => true,
                        Some(current) => value.try_cmp(current)? == *keep,
                    };
                    if replace {
                        *best = Some(value.clone());
                    }
                }
            }
            Accumulator::Count(n) => *n += 1,
            Accumulator::Samples { values, .. } => {
                if let Some(v) = numeric(value)? {
                    values.push(v);
                }
            }
        }
        Ok(())
    }

    /// Fold a later partial accumulator (same column) into this one.
    fn merge(&mut self, other: Accumulator) -> TableResult<()> {
        match (self, other) {
            (Accumulator::Group(_), Accumulator::Group(_)) => {}
            (Accumulator::Sum(a), Accumulator::Sum(b)) => {
                a.values.extend(b.values);
                a.exact = match (a.exact, b.exact) {
                    (Some(x), Some(y)) => x.checked_add(y),
                    _ => None,
                };
            }
            (Accumulator::Extreme { keep, best }, Accumulator::Extreme { best: Some(other), .. }) => {
                let replace = match best {
                    None => true,
                    Some(current) => other.try_cmp(current)? == *keep,
                };
                if replace {
                    *best = Some(other);
                }
            }
            (Accumulator::Extreme { .. }, Accumulator::Extreme { best: None, .. }) => {}
            (Accumulator::Count(a), Accumulator::Count(b)) => *a += b,
            (Accumulator::Samples { values, .. }, Accumulator::Samples { values: more, .. }) => {
                values.extend(more);
            }
            _ => {
                return Err(TableError::invalid_argument(
                    "cannot merge groupings built from different specs",
                ));
            }
        }
        Ok(())
    }

    fn finish(self, options: &AggOptions) -> Value {
        match self {
            Accumulator::Group(v) => v,
            Accumulator::Sum(state) => match state.exact {
                Some(i) => Value::Int64(i),
                None => Value::Float64(stats::kahan_sum(&state.values)),
            },
            Accumulator::Extreme { best, .. } => best.unwrap_or(Value::Null),
            Accumulator::Count(n) => Value::Int64(n as i64),
            Accumulator::Samples { op: AggOp::Avg, values } => stats::mean(&values).into(),
            Accumulator::Samples { values, .. } => stats::std_dev(&values, options.variance).into(),
        }
    }
}

/// Partial aggregation state: one accumulator row per group key, in first-seen order.
///
/// Groupings built over consecutive chunks of a table can be merged left to right; the
/// result has the same groups, in the same order, as a single pass over the whole table.
#[derive(Debug)]
pub(crate) struct Grouping<'s> {
    spec: &'s AggSpec,
    groups: IndexMap<String, Vec<Accumulator>>,
}

impl<'s> Grouping<'s> {
    pub(crate) fn new(spec: &'s AggSpec) -> TableResult<Self> {
        if spec.is_empty() {
            return Err(TableError::invalid_argument("aggregation spec has no columns"));
        }
        Ok(Self {
            spec,
            groups: IndexMap::new(),
        })
    }

    /// Key of the ordered spec tuple: group values, a placeholder for reduced columns.
    fn key(&self, record: &Record) -> String {
        tuple_key(
            self.spec
                .columns()
                .map(|(name, op)| (op == AggOp::Group).then(|| record.get(name).unwrap_or(&NULL))),
        )
    }

    pub(crate) fn update(&mut self, record: &Record) -> TableResult<()> {
        let key = self.key(record);
        let spec = self.spec;
        let accumulators = self.groups.entry(key).or_insert_with(|| {
            spec.columns()
                .map(|(name, op)| Accumulator::start(op, record.get(name).unwrap_or(&NULL)))
                .collect()
        });
        for ((name, _), acc) in spec.columns().zip(accumulators.iter_mut()) {
            acc.update(record.get(name).unwrap_or(&NULL))?;
        }
        Ok(())
    }

    pub(crate) fn merge(&mut self, other: Grouping<'_>) -> TableResult<()> {
        for (key, accumulators) in other.groups {
            match self.groups.get_mut(&key) {
                Some(existing) => {
                    for (acc, more) in existing.iter_mut().zip(accumulators) {
                        acc.merge(more)?;
                    }
                }
                None => {
                    self.groups.insert(key, accumulators);
                }
            }
        }
        Ok(())
    }

    pub(crate) fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub(crate) fn finish(self, options: &AggOptions) -> Table {
        let spec = self.spec;
        self.groups
            .into_values()
            .map(|accumulators| {
                spec.columns()
                    .zip(accumulators)
                    .map(|((name, _), acc)| (name.to_string(), acc.finish(options)))
                    .collect::<Record>()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record;

    fn sales() -> Table {
        Table::new(vec![
            record! { "Name" => "John", "Age" => 30, "Amount" => 100 },
            record! { "Name" => "Jane", "Age" => 25, "Amount" => 200 },
            record! { "Name" => "John", "Age" => 30, "Amount" => 150 },
            record! { "Name" => "Jane", "Age" => 25, "Amount" => 300 },
        ])
    }

    #[test]
    fn groups_in_first_seen_order() {
        let out = agg(&sales(), &AggSpec::new().group("Name").sum("Amount")).unwrap();
        assert_eq!(
            out.records,
            vec![
                record! { "Name" => "John", "Amount" => 250 },
                record! { "Name" => "Jane", "Amount" => 500 },
            ]
        );
    }

    #[test]
    fn all_ops_per_group() {
        let spec = AggSpec::new()
            .group("Name")
            .count("Rows")
            .avg("Amount")
            .stdev("Spread");
        let t: Table = sales()
            .records
            .into_iter()
            .map(|mut r| {
                let amount = r.get_or_null("Amount");
                r.insert("Spread", amount);
                r
            })
            .collect();
        let out = agg(&t, &spec).unwrap();
        let john = &out.records[0];
        assert_eq!(john.get("Amount"), Some(&Value::Float64(125.0)));
        assert_eq!(john.get("Rows"), Some(&Value::Int64(2)));
        let spread = john.get("Spread").and_then(Value::as_f64).unwrap();
        assert!((spread - 35.355_339_059_327_38).abs() < 1e-9);
    }

    #[test]
    fn min_max_do_not_treat_zero_as_unset() {
        let t = Table::new(vec![
            record! { "k" => "a", "v" => -5 },
            record! { "k" => "a", "v" => 0 },
            record! { "k" => "a", "v" => -2 },
        ]);
        let out = agg(&t, &AggSpec::new().group("k").min("v").with("hi", AggOp::Max)).unwrap();
        assert_eq!(out.records[0].get("v"), Some(&Value::Int64(-5)));
        // "hi" is absent from every record, so it has no values at all.
        assert_eq!(out.records[0].get("hi"), Some(&Value::Null));

        let out = agg(&t, &AggSpec::new().group("k").max("v")).unwrap();
        assert_eq!(out.records[0].get("v"), Some(&Value::Int64(0)));
    }

    #[test]
    fn stdev_of_single_row_group_is_null() {
        let t = Table::new(vec![record! { "k" => "a", "v" => 3.5 }]);
        let out = agg(&t, &AggSpec::new().group("k").stdev("v")).unwrap();
        assert_eq!(out.records[0].get("v"), Some(&Value::Null));

        let population = AggOptions {
            variance: VarianceKind::Population,
        };
        let out = agg_with(&t, &AggSpec::new().group("k").stdev("v"), &population).unwrap();
        assert_eq!(out.records[0].get("v"), Some(&Value::Float64(0.0)));
    }

    #[test]
    fn sum_falls_back_to_float_when_inputs_are_mixed() {
        let t = Table::new(vec![
            record! { "k" => 1, "v" => 1 },
            record! { "k" => 1, "v" => 0.5 },
            record! { "k" => 1, "v" => Value::Null },
        ]);
        let out = agg(&t, &AggSpec::new().group("k").sum("v")).unwrap();
        assert_eq!(out.records[0].get("v"), Some(&Value::Float64(1.5)));
    }

    #[test]
    fn integral_float_and_int_keys_share_a_group() {
        let t = Table::new(vec![record! { "k" => 1, "v" => 1 }, record! { "k" => 1.0, "v" => 2 }]);
        let out = agg(&t, &AggSpec::new().group("k").sum("v")).unwrap();
        assert_eq!(out.row_count(), 1);
    }

    #[test]
    fn sum_of_strings_is_a_type_mismatch() {
        let err = agg(&sales(), &AggSpec::new().group("Age").sum("Name")).unwrap_err();
        assert!(matches!(err, TableError::TypeMismatch { expected: "number", .. }));
    }

    #[test]
    fn empty_spec_is_rejected_and_empty_table_is_empty() {
        assert!(matches!(
            agg(&sales(), &AggSpec::new()),
            Err(TableError::InvalidArgument { .. })
        ));
        let out = agg(&Table::default(), &AggSpec::new().group("Name")).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn op_tags_parse() {
        assert_eq!("StDev".parse::<AggOp>().unwrap(), AggOp::StDev);
        assert_eq!(" group ".parse::<AggOp>().unwrap(), AggOp::Group);
        assert!("median".parse::<AggOp>().is_err());
        let spec: AggSpec = vec![("Name", AggOp::Group), ("Amount", AggOp::Sum)].into_iter().collect();
        assert_eq!(spec.group_columns().collect::<Vec<_>>(), vec!["Name"]);
    }

    #[test]
    fn merged_chunks_match_single_pass() {
        let t = sales();
        let spec = AggSpec::new().group("Name").sum("Amount").min("Age").avg("Total");
        let mut left = Grouping::new(&spec).unwrap();
        let mut right = Grouping::new(&spec).unwrap();
        for r in &t.records[..1] {
            left.update(r).unwrap();
        }
        for r in &t.records[1..] {
            right.update(r).unwrap();
        }
        left.merge(right).unwrap();
        assert_eq!(left.group_count(), 2);
        assert_eq!(left.finish(&AggOptions::default()), agg(&t, &spec).unwrap());
    }
}
