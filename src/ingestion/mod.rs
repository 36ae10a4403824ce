//! Ingestion and output.
//!
//! Tables are read from and written to JSON (an array of objects, a single object, or
//! NDJSON). See [`json`] for the value mapping.

pub mod json;

pub use json::{read_json_path, read_json_str, to_json_string, write_json_path, JsonOptions};
