//! Column accessors: how an operation reads "the value" out of a row.
//!
//! An [`Accessor`] is one of
//!
//! - [`Accessor::Identity`]: the row itself (only meaningful for tables of raw scalars),
//! - [`Accessor::Field`]: a field name,
//! - [`Accessor::Func`]: a projection closure computing a value from the row.
//!
//! Every reducer, join and reshape operation takes an accessor and calls
//! [`Accessor::extract`] per row. Resolution is stateless: nothing is cached between calls.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use crate::error::{TableError, TableResult};
use crate::types::{Record, Value};

/// Something an [`Accessor`] can read from: a [`Record`] with named fields, or a bare
/// [`Value`] acting as a one-column row.
pub trait Row {
    /// Looks up a named field. `Ok(None)` means the field is absent;
    /// `Err` means the row has no named fields at all.
    fn field(&self, name: &str) -> TableResult<Option<&Value>>;

    /// The row as a single scalar value. `Err` for rows that are not scalars.
    fn scalar(&self) -> TableResult<&Value>;
}

impl Row for Record {
    fn field(&self, name: &str) -> TableResult<Option<&Value>> {
        Ok(self.get(name))
    }

    fn scalar(&self) -> TableResult<&Value> {
        Err(TableError::TypeMismatch {
            expected: "scalar",
            found: "record",
        })
    }
}

impl Row for Value {
    fn field(&self, _name: &str) -> TableResult<Option<&Value>> {
        Err(TableError::TypeMismatch {
            expected: "record",
            found: self.type_name(),
        })
    }

    fn scalar(&self) -> TableResult<&Value> {
        Ok(self)
    }
}

/// Projection closure type carried by [`Accessor::Func`].
pub type Projection<'a, R> = Arc<dyn Fn(&R) -> Value + Send + Sync + 'a>;

/// A polymorphic column reference.
pub enum Accessor<'a, R> {
    /// Use the row itself.
    Identity,
    /// Read a named field; an absent field reads as [`Value::Null`].
    Field(Cow<'a, str>),
    /// Compute a value from the row.
    Func(Projection<'a, R>),
}

impl<'a, R> Accessor<'a, R> {
    /// Field accessor.
    pub fn field(name: impl Into<Cow<'a, str>>) -> Self {
        Accessor::Field(name.into())
    }

    /// Projection accessor.
    pub fn func<F>(f: F) -> Self
    where
        F: Fn(&R) -> Value + Send + Sync + 'a,
    {
        Accessor::Func(Arc::new(f))
    }

    pub fn is_identity(&self) -> bool {
        matches!(self, Accessor::Identity)
    }
}

impl<R: Row> Accessor<'_, R> {
    /// Extract this accessor's value from `row`.
    ///
    /// Borrowed for identity/field lookups, owned for projections.
    pub fn extract<'r>(&self, row: &'r R) -> TableResult<Cow<'r, Value>> {
        match self {
            Accessor::Identity => row.scalar().map(Cow::Borrowed),
            Accessor::Field(name) => Ok(match row.field(name)? {
                Some(value) => Cow::Borrowed(value),
                None => Cow::Owned(Value::Null),
            }),
            Accessor::Func(f) => Ok(Cow::Owned(f(row))),
        }
    }

    /// Resolve into a plain extraction function returning owned values.
    pub fn resolve(&self) -> impl Fn(&R) -> TableResult<Value> + '_ {
        move |row: &R| self.extract(row).map(Cow::into_owned)
    }
}

impl<R> Clone for Accessor<'_, R> {
    fn clone(&self) -> Self {
        match self {
            Accessor::Identity => Accessor::Identity,
            Accessor::Field(name) => Accessor::Field(name.clone()),
            Accessor::Func(f) => Accessor::Func(Arc::clone(f)),
        }
    }
}

impl<R> Default for Accessor<'_, R> {
    fn default() -> Self {
        Accessor::Identity
    }
}

impl<R> fmt::Debug for Accessor<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Accessor::Identity => f.write_str("Identity"),
            Accessor::Field(name) => f.debug_tuple("Field").field(name).finish(),
            Accessor::Func(_) => f.write_str("Func(..)"),
        }
    }
}

impl<'a, R> From<&'a str> for Accessor<'a, R> {
    fn from(name: &'a str) -> Self {
        Accessor::Field(Cow::Borrowed(name))
    }
}

impl<R> From<String> for Accessor<'_, R> {
    fn from(name: String) -> Self {
        Accessor::Field(Cow::Owned(name))
    }
}
