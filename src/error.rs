use std::path::PathBuf;

use thiserror::Error;

/// The loaded table does not have the shape the dashboard needs.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("required column '{column}' is missing")]
    MissingColumn { column: String },

    /// Row numbers are 1-based and count data rows only (the header is not a row).
    #[error("row {row}: outcome '{value}' is neither 'yes' nor 'no'")]
    UnknownOutcome { row: usize, value: String },
}

/// Failure to produce a [`Dataset`](crate::data::model::Dataset).
///
/// Every variant is fatal for the session: no partial dataset is ever
/// returned.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed delimited text in {source_name}: {source}")]
    Csv {
        source_name: String,
        #[source]
        source: csv::Error,
    },

    #[error("malformed JSON in {source_name}: {source}")]
    Json {
        source_name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to decode parquet {source_name}: {source}")]
    Parquet {
        source_name: String,
        #[source]
        source: parquet::errors::ParquetError,
    },

    #[error("failed to convert columns of {source_name}: {source}")]
    Arrow {
        source_name: String,
        #[source]
        source: arrow::error::ArrowError,
    },

    /// The file parsed, but its layout is not a table of records.
    #[error("{source_name}: {message}")]
    Layout { source_name: String, message: String },

    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    #[error("{0} contains no records")]
    Empty(String),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

pub type Result<T, E = LoadError> = std::result::Result<T, E>;
