//! Error types for minexr operations.

use thiserror::Error;

/// All errors that can occur when reading OpenEXR files.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error from the underlying reader.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file does not start with the OpenEXR magic number.
    #[error("Not an OpenEXR file. Expected magic 20000630, found {found}")]
    NotThisFormat { found: i32 },

    /// Tiled, multi-part, deep, compressed or mixed pixel type files.
    #[error("Unsupported file variant: {0}")]
    UnsupportedVariant(String),

    /// Attribute table or chunk offset table is structurally invalid.
    #[error("Malformed header: {0}")]
    MalformedHeader(String),

    /// Missing NUL terminator or invalid UTF-8.
    #[error("Malformed string: {0}")]
    MalformedString(String),

    /// Fewer bytes available than a read requires.
    #[error("Truncated input: requested {requested} bytes, {remaining} remaining")]
    TruncatedInput { requested: usize, remaining: usize },

    /// Channel pixel type code outside UINT/HALF/FLOAT.
    #[error("Unsupported pixel type code: {0}")]
    UnsupportedPixelType(i32),

    /// Selection references a channel absent from the header.
    #[error("Unknown channel: {0}")]
    UnknownChannel(String),

    /// Typed access with an element type that differs from the pixel type.
    #[error("Type mismatch: expected '{expected}', found '{found}'")]
    TypeMismatch { expected: String, found: String },

    /// A configured resource limit was exceeded.
    #[error("{what} of {actual} exceeds limit of {limit}")]
    LimitExceeded {
        what: &'static str,
        actual: u64,
        limit: u64,
    },
}
