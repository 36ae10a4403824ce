//! In-memory table transformations.
//!
//! The processing layer operates on [`crate::types::Table`] values, either built in code or
//! produced by [`crate::ingestion`]. Every operation returns a new value; inputs are never
//! modified.
//!
//! Currently implemented:
//!
//! - [`filter()`] / [`map()`]: record filtering and mapping
//! - [`reduce()`] and the per-statistic reducers in [`reduce`]: sum, avg, variance, stdev,
//!   covariance, correlation, min, max, range, median, mode, unique, count
//! - [`agg()`]: group-by with per-column [`AggOp`]s
//! - [`select()`]: projection with optional renaming
//! - [`left_join()`] / [`inner_join()`]: key-equality joins
//! - [`df()`], [`desc()`], [`to_object()`], [`sort_by()`]: reshaping
//!
//! ## Example: filter → map → agg
//!
//! ```rust
//! use rust_tabular::processing::{agg, filter, map, AggSpec};
//! use rust_tabular::record;
//! use rust_tabular::types::{Table, Value};
//!
//! let orders = Table::new(vec![
//!     record! { "region" => "east", "active" => true, "amount" => 10.0 },
//!     record! { "region" => "west", "active" => false, "amount" => 20.0 },
//!     record! { "region" => "east", "active" => true, "amount" => 5.0 },
//! ]);
//!
//! // Keep only active orders.
//! let active = filter(&orders, |r| matches!(r.get("active"), Some(Value::Bool(true))));
//!
//! // Apply a multiplier to amount.
//! let scaled = map(&active, |r| {
//!     let mut out = r.clone();
//!     if let Some(v) = r.get("amount").and_then(Value::as_f64) {
//!         out.insert("amount", v * 2.0);
//!     }
//!     out
//! });
//!
//! let totals = agg(&scaled, &AggSpec::new().group("region").sum("amount")).unwrap();
//! assert_eq!(totals.row_count(), 1);
//! assert_eq!(totals.records[0].get("amount"), Some(&Value::Float64(30.0)));
//! ```

pub mod aggregate;
pub mod filter;
pub mod join;
pub mod map;
pub mod project;
pub mod reduce;
pub mod reshape;

pub use aggregate::{agg, agg_with, AggOp, AggOptions, AggSpec};
pub use filter::filter;
pub use join::{inner_join, join, left_join, JoinKind};
pub use map::map;
pub use project::{parse_column_list, select};
pub use reduce::{reduce, ReduceOp};
pub use reshape::{desc, df, sort_by, to_object, SortOrder};
