use thiserror::Error;

use crate::types::DataType;

/// Convenience result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Error type returned by every stage of the detection pipeline.
///
/// This is a single error enum shared across schema inference, batch
/// reading, column extraction, and detection. All errors are terminal for
/// the current invocation; there is no retry inside the crate.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV-level read error (quoting, unequal record lengths, ...).
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// The input had no header or no data rows where at least one was required.
    #[error("empty input: {message}")]
    EmptyInput { message: String },

    /// The header row or schema cannot support the requested operation
    /// (duplicate/empty column names, no numeric column to auto-select, ...).
    #[error("schema mismatch: {message}")]
    SchemaMismatch { message: String },

    /// The named column does not exist in the schema (or a batch is
    /// narrower than the schema says it should be).
    #[error("column '{column}' not found")]
    ColumnNotFound { column: String },

    /// The target column is not numeric.
    #[error("column '{column}' has non-numeric type {data_type:?}")]
    TypeMismatch { column: String, data_type: DataType },

    /// A non-null field failed to parse against its declared type.
    ///
    /// Carries enough context (row, column, offending token) for the caller
    /// to decide retry/skip policy; the reader itself never skips silently.
    #[error("malformed row {row}, column '{column}': {message} (raw='{raw}')")]
    MalformedRow {
        row: u64,
        column: String,
        raw: String,
        message: String,
    },

    /// The column has zero non-null values, so statistics are undefined.
    #[error("column '{column}' has no non-null values")]
    NoValidData { column: String },

    /// The read loop was aborted by the caller's cancellation token.
    #[error("read cancelled")]
    Cancelled,
}
