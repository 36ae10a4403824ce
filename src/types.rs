//! Core data model types.
//!
//! A [`Table`] is an ordered sequence of [`Record`]s; a record maps field names to typed
//! [`Value`]s. There is no schema object: operations infer shape from the records they see
//! (usually the first one). [`DataFrame`] is the transposed, column-major view of a table.

use std::cmp::Ordering;
use std::fmt::{self, Write};

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Serialize, Serializer};

use crate::error::{TableError, TableResult};

/// Largest magnitude at which every integer is exactly representable as `f64`.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// `2^63`: floats in `[-2^63, 2^63)` convert to `i64` without saturating.
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

/// Shared `Null` for lookups that fall back to a borrowed value.
pub(crate) static NULL: Value = Value::Null;

/// A single typed value in a [`Record`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Missing/empty value.
    Null,
    /// 64-bit signed integer.
    Int64(i64),
    /// 64-bit float.
    Float64(f64),
    /// Boolean.
    Bool(bool),
    /// UTF-8 string.
    Utf8(String),
    /// Calendar date without time zone.
    Date(NaiveDate),
}

impl Value {
    /// Returns `true` for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Numeric view of the value (`Int64` and `Float64` only).
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int64(v) => Some(*v as f64),
            Value::Float64(v) => Some(*v),
            _ => None,
        }
    }

    /// Short type label used in error messages. Both numeric variants report `"number"`.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Int64(_) | Value::Float64(_) => "number",
            Value::Bool(_) => "bool",
            Value::Utf8(_) => "string",
            Value::Date(_) => "date",
        }
    }

    /// Total ordering between two values of the same kind.
    ///
    /// Integers and floats compare numerically with each other (floats via
    /// [`f64::total_cmp`]). Any other pairing of different kinds is a
    /// [`TableError::TypeMismatch`] rather than an arbitrary order.
    pub fn try_cmp(&self, other: &Self) -> TableResult<Ordering> {
        match (self, other) {
            (Value::Null, Value::Null) => Ok(Ordering::Equal),
            (Value::Int64(a), Value::Int64(b)) => Ok(a.cmp(b)),
            (Value::Bool(a), Value::Bool(b)) => Ok(a.cmp(b)),
            (Value::Utf8(a), Value::Utf8(b)) => Ok(a.cmp(b)),
            (Value::Date(a), Value::Date(b)) => Ok(a.cmp(b)),
            (a, b) => match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => Ok(x.total_cmp(&y)),
                _ => Err(TableError::TypeMismatch {
                    expected: a.type_name(),
                    found: b.type_name(),
                }),
            },
        }
    }

    /// Strict equality used for join keys.
    ///
    /// Numbers compare numerically, other kinds only match their own kind, and `Null`
    /// never matches anything (including another `Null`).
    pub fn strict_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, _) | (_, Value::Null) => false,
            (Value::Int64(a), Value::Int64(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Utf8(a), Value::Utf8(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            (a, b) => matches!((a.as_f64(), b.as_f64()), (Some(x), Some(y)) if x == y),
        }
    }
}

/// JSON form of a value.
///
/// Integral finite floats below `2^53` are written as integers, so `250.0` and `250`
/// serialize identically.
impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Int64(v) => serializer.serialize_i64(*v),
            Value::Float64(v) if v.is_finite() && v.fract() == 0.0 && v.abs() < MAX_SAFE_INTEGER => {
                serializer.serialize_i64(*v as i64)
            }
            Value::Float64(v) => serializer.serialize_f64(*v),
            Value::Bool(v) => serializer.serialize_bool(*v),
            Value::Utf8(v) => serializer.serialize_str(v),
            Value::Date(v) => serializer.collect_str(v),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Int64(v) => write!(f, "{v}"),
            Value::Float64(v) => write!(f, "{v}"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Utf8(v) => write!(f, "{v}"),
            Value::Date(v) => write!(f, "{v}"),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int64(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float64(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Utf8(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Utf8(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Date(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

/// Hash key of a value, used wherever two values must be "the same" (group keys, `unique`,
/// `mode`).
///
/// An integral float that fits in `i64` shares the key of that integer. Every `NaN` shares
/// one key, distinct from `Null` and from the infinities.
pub(crate) fn value_key(value: &Value) -> String {
    let mut out = String::new();
    push_key(&mut out, value);
    out
}

/// Key of an ordered tuple; `None` marks a position that takes no part in the key.
pub(crate) fn tuple_key<'a>(values: impl IntoIterator<Item = Option<&'a Value>>) -> String {
    let mut out = String::new();
    for value in values {
        match value {
            Some(v) => push_key(&mut out, v),
            None => out.push_str("-;"),
        }
    }
    out
}

fn push_key(out: &mut String, value: &Value) {
    // Writing to a String never fails.
    let _ = match value {
        Value::Null => write!(out, "n;"),
        Value::Int64(v) => write!(out, "i{v};"),
        Value::Float64(v) if v.is_nan() => write!(out, "f:nan;"),
        Value::Float64(v) if v.fract() == 0.0 && (-I64_BOUND..I64_BOUND).contains(v) => {
            write!(out, "i{};", *v as i64)
        }
        Value::Float64(v) => write!(out, "f{:x};", v.to_bits()),
        Value::Bool(v) => write!(out, "b{v};"),
        Value::Utf8(v) => write!(out, "s{}:{v};", v.len()),
        Value::Date(v) => write!(out, "d{v};"),
    };
}

/// An insertion-ordered mapping from field name to [`Value`].
///
/// Equality ignores field order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Record {
    fields: IndexMap<String, Value>,
}

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of `name`, if the field is present.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Value of `name`, reading an absent field as [`Value::Null`].
    pub fn get_or_null(&self, name: &str) -> Value {
        self.get(name).cloned().unwrap_or(Value::Null)
    }

    /// Set a field. An existing field keeps its position; a new one is appended.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(name.into(), value.into())
    }

    /// Remove a field, preserving the order of the remaining ones.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.fields.shift_remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Field names in insertion order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Shallow merge: copies every field of `other` into `self`, overwriting on collision.
    pub fn merge(&mut self, other: &Record) {
        for (name, value) in &other.fields {
            self.fields.insert(name.clone(), value.clone());
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// Build a [`Record`] from `name => value` pairs.
///
/// ```rust
/// use rust_tabular::record;
/// use rust_tabular::types::Value;
///
/// let r = record! { "Name" => "John", "Amount" => 100 };
/// assert_eq!(r.get("Amount"), Some(&Value::Int64(100)));
/// ```
#[macro_export]
macro_rules! record {
    () => {
        $crate::types::Record::new()
    };
    ($($name:expr => $value:expr),+ $(,)?) => {{
        let mut record = $crate::types::Record::new();
        $(
            record.insert($name, $value);
        )+
        record
    }};
}

/// In-memory table: an ordered sequence of records.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Table {
    /// Row storage, in insertion order.
    pub records: Vec<Record>,
}

impl Table {
    /// Create a table from records.
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    /// Number of records in the table.
    pub fn row_count(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn push(&mut self, record: Record) {
        self.records.push(record);
    }

    /// Column names inferred from the first record (empty for an empty table).
    pub fn column_names(&self) -> Vec<String> {
        self.records
            .first()
            .map(|r| r.field_names().map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// Create a new table containing only records that match `predicate`.
    pub fn filter_rows<F>(&self, mut predicate: F) -> Self
    where
        F: FnMut(&Record) -> bool,
    {
        let records = self
            .records
            .iter()
            .filter(|record| predicate(record))
            .cloned()
            .collect();
        Self { records }
    }

    /// Create a new table by applying `mapper` to every record.
    pub fn map_rows<F>(&self, mapper: F) -> Self
    where
        F: FnMut(&Record) -> Record,
    {
        Self {
            records: self.records.iter().map(mapper).collect(),
        }
    }

    /// Fold all records into an accumulator value.
    pub fn reduce_rows<A, F>(&self, init: A, mut reducer: F) -> A
    where
        F: FnMut(A, &Record) -> A,
    {
        self.records.iter().fold(init, |acc, record| reducer(acc, record))
    }
}

impl From<Vec<Record>> for Table {
    fn from(records: Vec<Record>) -> Self {
        Self::new(records)
    }
}

impl FromIterator<Record> for Table {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Table {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Column-major view of a [`Table`]: one value sequence per field, one entry per record.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DataFrame {
    columns: IndexMap<String, Vec<Value>>,
}

impl DataFrame {
    /// Create an empty frame.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a column.
    pub fn insert_column(&mut self, name: impl Into<String>, values: Vec<Value>) {
        self.columns.insert(name.into(), values);
    }

    pub fn column(&self, name: &str) -> Option<&[Value]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &[Value])> {
        self.columns.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Length of the longest column.
    pub fn row_count(&self) -> usize {
        self.columns.values().map(Vec::len).max().unwrap_or(0)
    }

    /// Transpose back into a row-major [`Table`]. Short columns are padded with `Null`.
    pub fn to_table(&self) -> Table {
        (0..self.row_count())
            .map(|i| {
                self.columns
                    .iter()
                    .map(|(name, values)| (name.clone(), values.get(i).cloned().unwrap_or(Value::Null)))
                    .collect()
            })
            .collect()
    }
}
