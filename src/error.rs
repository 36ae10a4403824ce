use thiserror::Error;

/// Convenience result type for table operations.
pub type TableResult<T> = Result<T, TableError>;

/// Error type returned by table operations.
///
/// A single error enum shared by reducers, aggregation, relational operators, JSON ingestion
/// and the execution engine. Every error is returned synchronously to the caller.
#[derive(Debug, Error)]
pub enum TableError {
    /// A required argument is missing or malformed (e.g. `to_object` without a key accessor).
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    /// A reducer needs more values than the input provides (e.g. `avg` of nothing).
    #[error("{op} requires at least {required} value(s), found {found}")]
    InsufficientData {
        op: &'static str,
        required: usize,
        found: usize,
    },

    /// A statistic divides by a standard deviation of zero.
    #[error("{op} is undefined for a column with zero variance")]
    ZeroVariance { op: &'static str },

    /// Values of incompatible types were compared or used as numbers.
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// `to_object` met the same key twice.
    #[error("duplicate key '{key}'")]
    DuplicateKey { key: String },

    /// JSON input does not have a tabular shape.
    #[error("schema mismatch: {message}")]
    SchemaMismatch { message: String },

    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The execution engine could not build its worker pool.
    #[error("thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl TableError {
    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }
}
