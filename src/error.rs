//! Error types for the Loupe library.
//!
//! All fallible operations return [`Result`], whose error side is the
//! [`LoupeError`] enum. Variants map onto the failure classes of the search
//! core: query boundary errors, build-time document and feed errors, rebuild
//! contention, and storage problems.
//!
//! # Examples
//!
//! ```
//! use loupe::error::{LoupeError, Result};
//!
//! fn parse_page(raw: &str) -> Result<usize> {
//!     raw.parse()
//!         .map_err(|_| LoupeError::invalid_argument(format!("bad page: {raw}")))
//! }
//!
//! assert!(parse_page("x").unwrap_err().is_client_error());
//! ```

use std::io;

use thiserror::Error;

/// The main error type for Loupe operations.
#[derive(Error, Debug)]
pub enum LoupeError {
    /// I/O errors (index files, source feeds).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The query string was blank.
    #[error("Empty query")]
    EmptyQuery,

    /// The query string could not be parsed.
    #[error("Malformed query: {0}")]
    MalformedQuery(String),

    /// A source record is missing a required field.
    #[error("Malformed document: {0}")]
    MalformedDocument(String),

    /// The document source failed while being iterated.
    #[error("Source feed failure: {0}")]
    SourceFeed(String),

    /// Another rebuild is already running.
    #[error("Rebuild already in progress")]
    RebuildInProgress,

    /// Storage-related errors (directory layout, pointer files).
    #[error("Storage error: {0}")]
    Storage(String),

    /// On-disk data failed validation.
    #[error("Corrupted index: {0}")]
    Corrupted(String),

    /// A caller passed an argument outside its contract.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// An internal invariant did not hold.
    #[error("Internal error: {0}")]
    Internal(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for operations that may fail with LoupeError.
pub type Result<T> = std::result::Result<T, LoupeError>;

impl LoupeError {
    /// Create a new malformed query error.
    pub fn malformed_query<S: Into<String>>(msg: S) -> Self {
        LoupeError::MalformedQuery(msg.into())
    }

    /// Create a new malformed document error.
    pub fn malformed_document<S: Into<String>>(msg: S) -> Self {
        LoupeError::MalformedDocument(msg.into())
    }

    /// Create a new source feed error.
    pub fn source_feed<S: Into<String>>(msg: S) -> Self {
        LoupeError::SourceFeed(msg.into())
    }

    /// Create a new storage error.
    pub fn storage<S: Into<String>>(msg: S) -> Self {
        LoupeError::Storage(msg.into())
    }

    /// Create a new corruption error.
    pub fn corrupted<S: Into<String>>(msg: S) -> Self {
        LoupeError::Corrupted(msg.into())
    }

    /// Create a new invalid argument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        LoupeError::InvalidArgument(msg.into())
    }

    /// Create a new internal error.
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        LoupeError::Internal(msg.into())
    }

    /// Whether the error was caused by the caller's input rather than the
    /// engine or its environment.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            LoupeError::EmptyQuery | LoupeError::MalformedQuery(_) | LoupeError::InvalidArgument(_)
        )
    }
}
