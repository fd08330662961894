use thiserror::Error;

/// Convenience result type for ingestion operations.
pub type IngestionResult<T> = Result<T, IngestionError>;

/// Convenience result type for encoding operations.
pub type EncodingResult<T> = Result<T, EncodingError>;

/// Error type returned by ingestion and indexing.
///
/// Every variant is fatal for the ingestion run: no partial table or index is returned.
#[derive(Debug, Error)]
pub enum IngestionError {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Delimited-text reader error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// The input has no header row.
    #[error("input is empty: expected a header row")]
    EmptyInput,

    /// A data row does not have the same number of fields as the header.
    ///
    /// `row` is the 0-based data-row position (the header is not counted), the same
    /// numbering used by [`crate::types::ValueIndex`].
    #[error("Expected Columns: {expected}. Got {actual} columns in row {row}")]
    RowLengthMismatch {
        row: usize,
        expected: usize,
        actual: usize,
    },
}

/// Error type returned by the encoding pipeline.
#[derive(Debug, Error)]
pub enum EncodingError {
    /// The categorical hint vector does not cover every header column.
    #[error("categorical hints cover {actual} columns but the header has {expected}")]
    HintLengthMismatch { expected: usize, actual: usize },

    /// A categorical column has no observed values, so it has no category ordering.
    #[error("column '{column}' has no observed values")]
    EmptyColumn { column: String },

    /// A numeric cell could not be parsed (only surfaced under [`crate::processing::ConversionPolicy::FailFast`]).
    #[error("failed to convert value at row {row} column '{column}': {message} (raw='{raw}')")]
    Conversion {
        row: usize,
        column: String,
        raw: String,
        message: String,
    },

    /// The pipeline configuration could not be loaded.
    #[error("invalid pipeline config: {message}")]
    Config { message: String },

    /// Ingestion failed before encoding started.
    #[error(transparent)]
    Ingestion(#[from] IngestionError),
}
