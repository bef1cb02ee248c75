//! Error types for bitmap encoding and decoding.

use thiserror::Error;

/// Errors that can occur while writing or reading a bitmap.
#[derive(Error, Debug)]
pub enum FormatError {
    /// I/O error during file operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// File does not start with the `BM` signature
    #[error("Invalid signature: expected \"BM\", found {found:?}")]
    InvalidSignature {
        /// The two bytes found at the start of the file
        found: [u8; 2],
    },

    /// Header field holds a value outside the supported subset
    #[error("Unsupported {field}: {value}")]
    Unsupported {
        /// Name of the header field
        field: &'static str,
        /// Value found in the file
        value: u32,
    },

    /// Data ended before the expected number of bytes
    #[error("Truncated bitmap: expected {expected} bytes, found {found}")]
    Truncated {
        /// Number of bytes required
        expected: usize,
        /// Number of bytes available
        found: usize,
    },

    /// Encoded image would not fit the 32-bit file size field
    #[error("Image too large: {height}x{width} exceeds the 4 GiB bitmap limit")]
    TooLarge {
        /// Image height
        height: u32,
        /// Image width
        width: u32,
    },

    /// Header fields disagree with each other or with the data length
    #[error("Dimension mismatch: {message}")]
    DimensionMismatch {
        /// Description of the mismatch
        message: String,
    },
}

impl FormatError {
    /// Create an unsupported field error.
    pub fn unsupported(field: &'static str, value: u32) -> Self {
        Self::Unsupported { field, value }
    }

    /// Create a dimension mismatch error with a message.
    pub fn dimension_mismatch(message: impl Into<String>) -> Self {
        Self::DimensionMismatch {
            message: message.into(),
        }
    }
}
