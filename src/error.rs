//! Error handling module for storygen
//!
//! Provides centralized error handling with proper error types using thiserror.
//! Library code returns these types; the binary wraps them with anyhow context.

use thiserror::Error;

/// Main error type for storygen
#[derive(Error, Debug)]
pub enum StorygenError {
    /// Placeholder row and data row have a different number of cells
    #[error("row {row}: placeholder row has {placeholders} cells but data row has {values}")]
    ShapeMismatch {
        row: usize,
        placeholders: usize,
        values: usize,
    },

    /// Line index outside the valid bounds of an insert/remove
    #[error("line {line} is out of range for a document of {lines} lines")]
    OutOfRange { line: usize, lines: usize },

    /// A required input file was not supplied
    #[error("Missing input: {0}")]
    MissingInput(String),

    /// IO errors (reading inputs, writing outputs)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Zip archive errors
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Invalid regular expression in a rewrite rule or anchor
    #[error("Pattern error: {0}")]
    Pattern(String),

    /// Table loading errors (CSV, workbook)
    #[error("Table error: {0}")]
    Table(String),

    /// Output name could not be derived for a row
    #[error("Naming error: {0}")]
    Naming(String),

    /// Configuration errors (invalid combination of settings)
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for storygen operations
pub type Result<T> = std::result::Result<T, StorygenError>;

// Convenient error constructors
impl StorygenError {
    /// Create a missing input error
    pub fn missing_input(msg: impl Into<String>) -> Self {
        Self::MissingInput(msg.into())
    }

    /// Create a pattern error
    pub fn pattern(msg: impl Into<String>) -> Self {
        Self::Pattern(msg.into())
    }

    /// Create a table error
    pub fn table(msg: impl Into<String>) -> Self {
        Self::Table(msg.into())
    }

    /// Create a naming error
    pub fn naming(msg: impl Into<String>) -> Self {
        Self::Naming(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether this error concerns a single row and leaves the rest of the batch usable.
    ///
    /// Sink and IO failures are not row-scoped: once the output cannot be written
    /// there is nothing left to continue with.
    pub fn is_row_scoped(&self) -> bool {
        matches!(
            self,
            Self::ShapeMismatch { .. } | Self::OutOfRange { .. } | Self::Naming(_)
        )
    }
}
