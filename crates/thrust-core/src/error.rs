use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the thrust plotter.
#[derive(Error, Debug)]
pub enum ThrustError {
    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A CSV file could not be decoded into rows.
    #[error("Failed to parse CSV file {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A JSON document could not be produced or parsed.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// A header row claims the same role twice before it can be used.
    #[error("{path}: row {row}: reached second {role} field (containing '{cell}') at column {column}{detail}")]
    HeaderConflict {
        path: PathBuf,
        row: usize,
        role: String,
        cell: String,
        column: String,
        detail: String,
    },

    /// No row in the file yields a complete set of header columns.
    #[error("No complete indexes found in {0}")]
    HeaderNotFound(PathBuf),

    /// A data row cannot form a setup key.
    #[error("Invalid setup key in {path} on row {row}: missing {attribute} cell (column {column})")]
    InvalidSetupKey {
        path: PathBuf,
        row: usize,
        attribute: String,
        column: String,
    },

    /// An attribute has more distinct values than a bitmask can hold.
    #[error("Too many distinct {attribute} values: {count} (at most {max} supported)")]
    TooManyValues {
        attribute: String,
        count: usize,
        max: usize,
    },

    /// A filter names a value that does not occur in the data.
    #[error("Unknown {attribute} value: {value}")]
    UnknownValue { attribute: String, value: String },

    /// The expected data directory does not exist.
    #[error("Data path not found: {0}")]
    DataPathNotFound(PathBuf),

    /// No CSV files were found under the given directory.
    #[error("No CSV files found in {0}")]
    NoDataFiles(PathBuf),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ThrustError {
    /// Whether the error only invalidates the file it was raised for.
    ///
    /// File-scoped errors are logged and the file is skipped; everything else
    /// aborts the run.
    pub fn is_file_scoped(&self) -> bool {
        matches!(
            self,
            ThrustError::FileRead { .. }
                | ThrustError::Csv { .. }
                | ThrustError::HeaderConflict { .. }
                | ThrustError::HeaderNotFound(_)
        )
    }
}

/// Convenience alias used throughout the thrust crates.
pub type Result<T> = std::result::Result<T, ThrustError>;
