//! Error types for batch loading and artifact writing

use thiserror::Error;

/// Result type for batch-io operations
pub type Result<T> = std::result::Result<T, Error>;

/// Batch-io errors
#[derive(Debug, Error)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV read/write error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A field failed domain validation after CSV decoding
    #[error("invalid {field} {value:?} on line {line}")]
    InvalidField {
        /// Column name
        field: &'static str,
        /// Offending value
        value: String,
        /// 1-based line number, counting the header
        line: usize,
    },
}
