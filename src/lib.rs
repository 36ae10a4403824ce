//! `rust-tabular` is a small library of spreadsheet-style operations over in-memory
//! [`types::Table`]s: ordered sequences of [`types::Record`]s whose fields hold typed
//! [`types::Value`]s.
//!
//! ## What you can do
//!
//! - **Reduce** a column with numerically stable statistics (Kahan-compensated sums):
//!   sum, avg, variance, stdev, covariance, correlation, min, max, range, median, mode,
//!   unique, count ([`processing::reduce`]).
//! - **Aggregate** with a group-by spec ([`processing::agg`], [`processing::AggSpec`]).
//! - **Project and join**: [`processing::select`], [`processing::left_join`],
//!   [`processing::inner_join`].
//! - **Reshape**: [`processing::df`] (column-major view), [`processing::desc`] (per-column
//!   summary), [`processing::to_object`] (keyed lookup), [`processing::sort_by`].
//! - **Run in parallel** with throttling and metrics ([`execution::ExecutionEngine`]).
//! - **Read and write JSON** / NDJSON ([`ingestion::json`]).
//!
//! Every operation takes an [`Accessor`] (field name, projection closure, or the row itself)
//! to say which value it reads, and returns a new value: inputs are never modified.
//!
//! ## Quick example
//!
//! ```rust
//! use rust_tabular::processing::{agg, left_join, reduce, AggSpec};
//! use rust_tabular::record;
//! use rust_tabular::types::{Table, Value};
//!
//! # fn main() -> Result<(), rust_tabular::TableError> {
//! let sales = Table::new(vec![
//!     record! { "Name" => "John", "Amount" => 100 },
//!     record! { "Name" => "Jane", "Amount" => 200 },
//!     record! { "Name" => "John", "Amount" => 150 },
//! ]);
//!
//! let total = reduce::sum(&sales.records, &"Amount".into())?;
//! assert_eq!(total, 450.0);
//!
//! let per_name = agg(&sales, &AggSpec::new().group("Name").sum("Amount").count("Orders"))?;
//! assert_eq!(per_name.records[0].get("Amount"), Some(&Value::Int64(250)));
//! assert_eq!(per_name.records[0].get("Orders"), Some(&Value::Int64(2)));
//!
//! let regions = Table::new(vec![record! { "Name" => "Jane", "Region" => "EU" }]);
//! let joined = left_join(&sales, &regions, &"Name".into(), None)?;
//! assert_eq!(joined.records[1].get("Region"), Some(&Value::from("EU")));
//! assert_eq!(joined.records[0].get("Region"), None);
//! # Ok(())
//! # }
//! ```
//!
//! ## Reading JSON
//!
//! ```no_run
//! use rust_tabular::ingestion::{read_json_path, JsonOptions};
//!
//! # fn main() -> Result<(), rust_tabular::TableError> {
//! // Nested objects are flattened into dot-path fields (e.g. `user.name`).
//! let events = read_json_path("events.ndjson", &JsonOptions::default())?;
//! println!("rows={}", events.row_count());
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`types`]: values, records, tables and the column-major [`types::DataFrame`]
//! - [`accessor`]: how operations pick a value out of a row
//! - [`stats`]: slice-level numeric kernels (Kahan sum, variance, correlation, median)
//! - [`processing`]: table operations (reduce/agg/select/join/reshape)
//! - [`execution`]: chunked parallel execution with observer hooks
//! - [`ingestion`]: JSON input/output
//! - [`dates`]: Excel/Unix date conversions
//! - [`error`]: the crate error type

pub mod accessor;
pub mod dates;
pub mod error;
pub mod execution;
pub mod ingestion;
pub mod processing;
pub mod stats;
pub mod types;

pub use accessor::{Accessor, Row};
pub use error::{TableError, TableResult};
pub use types::{Record, Table, Value};
