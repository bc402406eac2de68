//! Error types for tablimpa.

use std::path::PathBuf;

/// Result type alias for tablimpa operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in tablimpa operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// I/O error during file operations.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        /// The path where the error occurred, if known.
        path: Option<PathBuf>,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Arrow error during data processing.
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Input is a single labeled column rather than a table.
    #[error(
        "single-column input is not supported; \
         try simple statistical outlier detection instead"
    )]
    SingleColumn,

    /// Input is not tabular at all.
    #[error("unsupported input: only two-dimensional labeled tables are accepted")]
    UnsupportedInput,

    /// Column not found in schema.
    #[error("column '{name}' not found in schema")]
    ColumnNotFound {
        /// The name of the missing column.
        name: String,
    },

    /// Table has no rows.
    #[error("table is empty")]
    EmptyTable,

    /// Invalid configuration.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the configuration error.
        message: String,
    },

    /// Label was never seen by the fitted encoder.
    #[error("unknown label '{label}' for encoder '{encoder}'")]
    UnknownLabel {
        /// The unseen label.
        label: String,
        /// The encoder (derived column) name.
        encoder: String,
    },

    /// Column has a data type an operation cannot handle.
    #[error("unsupported type {datatype} for column '{column}'")]
    UnsupportedType {
        /// The column name.
        column: String,
        /// The Arrow data type, rendered for display.
        datatype: String,
    },
}

impl Error {
    /// Create an I/O error with a path context.
    pub fn io(source: std::io::Error, path: impl Into<PathBuf>) -> Self {
        Self::Io {
            path: Some(path.into()),
            source,
        }
    }

    /// Create a column not found error.
    pub fn column_not_found(name: impl Into<String>) -> Self {
        Self::ColumnNotFound { name: name.into() }
    }

    /// Create an invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an unsupported type error for a column.
    pub fn unsupported_type(
        column: impl Into<String>,
        datatype: &arrow::datatypes::DataType,
    ) -> Self {
        Self::UnsupportedType {
            column: column.into(),
            datatype: format!("{datatype:?}"),
        }
    }

    /// Create an unknown label error.
    pub fn unknown_label(label: impl Into<String>, encoder: impl Into<String>) -> Self {
        Self::UnknownLabel {
            label: label.into(),
            encoder: encoder.into(),
        }
    }
}
