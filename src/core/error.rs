//! Error types for segment and directory operations
//!
//! This module defines all error types used throughout the crate. End of
//! stream is deliberately absent: a stream that runs out mid-read produces a
//! truncated [`ReadOutcome`](crate::core::reader::ReadOutcome), not an error.

use thiserror::Error;

/// Error types for segment framing and metadata operations
#[derive(Debug, Error)]
pub enum MetadataError {
    /// Malformed marker sequence, bad start-of-image or negative segment length
    #[error("Framing error: {0}")]
    Framing(String),

    /// Bad argument provided to a function
    #[error("Bad argument: {0}")]
    Argument(String),

    /// Operation not supported by this object
    #[error("Operation not supported: {0}")]
    UnsupportedOperation(String),

    /// The requested tag has no value in the directory
    #[error("Tag 0x{tag:04X} not found in directory '{directory}'")]
    TagNotFound {
        /// Name of the directory that was queried
        directory: String,
        /// Tag id that was requested
        tag: i32,
    },

    /// The stored value cannot be converted to the requested type
    #[error("Tag 0x{tag:04X} in directory '{directory}' cannot be converted to {target}")]
    Coercion {
        /// Name of the directory that was queried
        directory: String,
        /// Tag id that was requested
        tag: i32,
        /// Name of the requested type
        target: &'static str,
    },

    /// A format reader failed while decoding a payload
    #[error("Decoder error: {0}")]
    Decoder(String),

    /// Bad value (e.g., unparseable date/time)
    #[error("Bad value: {0}")]
    BadValue(String),

    /// IO error other than end of stream
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for metadata operations
pub type MetadataResult<T> = Result<T, MetadataError>;
