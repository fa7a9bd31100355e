//! Error types for the Pike library.
//!
//! All fallible operations return [`Result`], whose error side is the
//! [`PikeError`] enum. Configuration problems (an unsupported relational
//! dialect, an unknown endpoint) and malformed filters are raised before any
//! network call is made; transport and record-store failures are carried
//! through unchanged.
//!
//! # Examples
//!
//! ```
//! use pike::error::{PikeError, Result};
//!
//! fn example_operation() -> Result<()> {
//!     Err(PikeError::invalid_argument("page must be at least 1"))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::io;

use thiserror::Error;

/// The main error type for Pike operations.
#[derive(Error, Debug)]
pub enum PikeError {
    /// I/O errors (reading configuration files, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Query-related errors (malformed filter templates, bad boosts, etc.)
    #[error("Query error: {0}")]
    Query(String),

    /// Fatal configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid argument supplied by the caller
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Failure raised by the search transport
    #[error("Transport error: {0}")]
    Transport(anyhow::Error),

    /// Failure raised by the relational record store
    #[error("Record store error: {0}")]
    Store(anyhow::Error),

    /// Generic anyhow error
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with PikeError.
pub type Result<T> = std::result::Result<T, PikeError>;

impl PikeError {
    /// Create a new query error.
    pub fn query<S: Into<String>>(msg: S) -> Self {
        PikeError::Query(msg.into())
    }

    /// Create a new configuration error.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        PikeError::Config(msg.into())
    }

    /// Create a new invalid argument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        PikeError::InvalidArgument(msg.into())
    }

    /// Wrap an error raised by a transport implementation.
    pub fn transport<E: Into<anyhow::Error>>(err: E) -> Self {
        PikeError::Transport(err.into())
    }

    /// Wrap an error raised by a record store implementation.
    pub fn store<E: Into<anyhow::Error>>(err: E) -> Self {
        PikeError::Store(err.into())
    }

    /// Whether this error is a configuration problem rather than a runtime failure.
    pub fn is_config(&self) -> bool {
        matches!(self, PikeError::Config(_))
    }
}
