//! Bitmap file encoding.
//!
//! Generated images are stored as uncompressed 24-bit bitmaps. Encoding is
//! deterministic: the same canvas always produces the same bytes. A decoder
//! for the same subset is provided so written files can be verified.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use defectgen::canvas::Canvas;
//! use defectgen::format::{encode, decode};
//!
//! let canvas = Canvas::new(100, 100);
//! let bytes = encode(&canvas)?;
//! assert_eq!(decode(&bytes)?, canvas);
//! ```

mod bmp;
mod error;

#[cfg(test)]
mod tests;

pub use bmp::{
    FileHeader, InfoHeader, decode, encode, file_size, row_padding, row_stride, write_bitmap,
};
pub use error::FormatError;
