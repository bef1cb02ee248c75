//! Uncompressed 24-bit bitmap encoding.
//!
//! Layout:
//! - file header (14 bytes): `BM`, file size, reserved, pixel data offset
//! - info header (40 bytes): header size, width, height, planes, bit depth,
//!   every other field zero
//! - `height` rows of `width` blue/green/red triples, each row zero padded to
//!   a multiple of 4 bytes
//!
//! All integers are little-endian. Rows are written in canvas order, top row
//! first, with a positive height field.

use std::path::Path;

use crate::canvas::{Canvas, Rgb};
use crate::constants::{BYTES_PER_PIXEL, FILE_HEADER_SIZE, INFO_HEADER_SIZE, PIXEL_DATA_OFFSET};
use crate::format::error::FormatError;

const SIGNATURE: [u8; 2] = *b"BM";
const COLOR_PLANES: u16 = 1;
const BITS_PER_PIXEL: u16 = (BYTES_PER_PIXEL * 8) as u16;

/// Zero bytes appended to each row so its length is a multiple of 4.
pub fn row_padding(width: u32) -> usize {
    (4 - (BYTES_PER_PIXEL * width as usize) % 4) % 4
}

/// Bytes per encoded row, padding included.
pub fn row_stride(width: u32) -> usize {
    BYTES_PER_PIXEL * width as usize + row_padding(width)
}

/// Total size of the encoded file.
///
/// The file header stores the size in 32 bits, so images whose encoding
/// would exceed `u32::MAX` bytes are rejected with [`FormatError::TooLarge`].
pub fn file_size(height: u32, width: u32) -> Result<u32, FormatError> {
    (BYTES_PER_PIXEL * width as usize)
        .checked_add(row_padding(width))
        .and_then(|stride| stride.checked_mul(height as usize))
        .and_then(|pixels| pixels.checked_add(PIXEL_DATA_OFFSET))
        .and_then(|len| u32::try_from(len).ok())
        .ok_or(FormatError::TooLarge { height, width })
}

/// The 14-byte file header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHeader {
    pub file_size: u32,
    pub pixel_offset: u32,
}

impl FileHeader {
    pub fn for_image(height: u32, width: u32) -> Result<Self, FormatError> {
        Ok(Self {
            file_size: file_size(height, width)?,
            pixel_offset: PIXEL_DATA_OFFSET as u32,
        })
    }

    pub fn to_bytes(&self) -> [u8; FILE_HEADER_SIZE] {
        let mut bytes = [0u8; FILE_HEADER_SIZE];
        bytes[0..2].copy_from_slice(&SIGNATURE);
        bytes[2..6].copy_from_slice(&self.file_size.to_le_bytes());
        // 6..10 reserved
        bytes[10..14].copy_from_slice(&self.pixel_offset.to_le_bytes());
        bytes
    }

    pub fn parse(bytes: &[u8]) -> Result<Self, FormatError> {
        let bytes = take(bytes, 0, FILE_HEADER_SIZE)?;
        let signature = [bytes[0], bytes[1]];
        if signature != SIGNATURE {
            return Err(FormatError::InvalidSignature { found: signature });
        }
        Ok(Self {
            file_size: read_u32(bytes, 2),
            pixel_offset: read_u32(bytes, 10),
        })
    }
}

/// The 40-byte info header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InfoHeader {
    pub header_size: u32,
    pub width: u32,
    pub height: u32,
    pub planes: u16,
    pub bits_per_pixel: u16,
    pub compression: u32,
}

impl InfoHeader {
    pub fn for_image(height: u32, width: u32) -> Self {
        Self {
            header_size: INFO_HEADER_SIZE as u32,
            width,
            height,
            planes: COLOR_PLANES,
            bits_per_pixel: BITS_PER_PIXEL,
            compression: 0,
        }
    }

    pub fn to_bytes(&self) -> [u8; INFO_HEADER_SIZE] {
        let mut bytes = [0u8; INFO_HEADER_SIZE];
        bytes[0..4].copy_from_slice(&self.header_size.to_le_bytes());
        bytes[4..8].copy_from_slice(&self.width.to_le_bytes());
        bytes[8..12].copy_from_slice(&self.height.to_le_bytes());
        bytes[12..14].copy_from_slice(&self.planes.to_le_bytes());
        bytes[14..16].copy_from_slice(&self.bits_per_pixel.to_le_bytes());
        bytes[16..20].copy_from_slice(&self.compression.to_le_bytes());
        // image size, resolution and palette fields stay zero
        bytes
    }

    pub fn parse(bytes: &[u8]) -> Result<Self, FormatError> {
        let bytes = take(bytes, FILE_HEADER_SIZE, INFO_HEADER_SIZE)?;
        Ok(Self {
            header_size: read_u32(bytes, 0),
            width: read_u32(bytes, 4),
            height: read_u32(bytes, 8),
            planes: read_u16(bytes, 12),
            bits_per_pixel: read_u16(bytes, 14),
            compression: read_u32(bytes, 16),
        })
    }
}

/// Encode a canvas into the bytes of a bitmap file.
pub fn encode(canvas: &Canvas) -> Result<Vec<u8>, FormatError> {
    let (height, width) = (canvas.height(), canvas.width());
    let file_header = FileHeader::for_image(height, width)?;
    let padding = [0u8; 3];
    let padding = &padding[..row_padding(width)];

    let mut out = Vec::with_capacity(file_header.file_size as usize);
    out.extend_from_slice(&file_header.to_bytes());
    out.extend_from_slice(&InfoHeader::for_image(height, width).to_bytes());

    for row in canvas.rows().take(height as usize) {
        for pixel in row {
            out.extend_from_slice(&[pixel.b, pixel.g, pixel.r]);
        }
        out.extend_from_slice(padding);
    }

    debug_assert_eq!(out.len(), file_header.file_size as usize);
    Ok(out)
}

/// Encode a canvas and write it to `path`, replacing any existing file.
pub fn write_bitmap(canvas: &Canvas, path: impl AsRef<Path>) -> Result<usize, FormatError> {
    let path = path.as_ref();
    let bytes = encode(canvas)?;
    std::fs::write(path, &bytes)?;
    log::debug!("Wrote {} bytes to {:?}", bytes.len(), path);
    Ok(bytes.len())
}

/// Decode a bitmap produced by [`encode`] back into a canvas.
///
/// Only the subset this crate writes is accepted: 40-byte info header,
/// 24 bits per pixel, no compression, pixel data directly after the headers.
pub fn decode(bytes: &[u8]) -> Result<Canvas, FormatError> {
    let file_header = FileHeader::parse(bytes)?;
    let info = InfoHeader::parse(bytes)?;

    if info.header_size != INFO_HEADER_SIZE as u32 {
        return Err(FormatError::unsupported("info header size", info.header_size));
    }
    if info.bits_per_pixel != BITS_PER_PIXEL {
        return Err(FormatError::unsupported(
            "bits per pixel",
            u32::from(info.bits_per_pixel),
        ));
    }
    if info.compression != 0 {
        return Err(FormatError::unsupported("compression", info.compression));
    }
    if file_header.pixel_offset != PIXEL_DATA_OFFSET as u32 {
        return Err(FormatError::unsupported(
            "pixel data offset",
            file_header.pixel_offset,
        ));
    }

    let expected = file_size(info.height, info.width).map_err(|_| {
        FormatError::dimension_mismatch(format!(
            "a {}x{} image does not fit a 32-bit file size",
            info.width, info.height
        ))
    })?;
    if file_header.file_size != expected {
        return Err(FormatError::dimension_mismatch(format!(
            "header declares {} bytes but a {}x{} image needs {}",
            file_header.file_size, info.width, info.height, expected
        )));
    }
    let expected = expected as usize;
    if bytes.len() < expected {
        return Err(FormatError::Truncated {
            expected,
            found: bytes.len(),
        });
    }

    let stride = row_stride(info.width);
    let row_bytes = BYTES_PER_PIXEL * info.width as usize;
    let mut pixels = Vec::with_capacity(info.height as usize * info.width as usize);

    for row in bytes[PIXEL_DATA_OFFSET..expected].chunks_exact(stride.max(1)) {
        pixels.extend(
            row[..row_bytes]
                .chunks_exact(BYTES_PER_PIXEL)
                .map(|bgr| Rgb::new(bgr[2], bgr[1], bgr[0])),
        );
    }

    Canvas::from_pixels(info.height, info.width, pixels)
        .ok_or_else(|| FormatError::dimension_mismatch("pixel count does not match header"))
}

fn take(bytes: &[u8], offset: usize, len: usize) -> Result<&[u8], FormatError> {
    bytes
        .get(offset..offset + len)
        .ok_or(FormatError::Truncated {
            expected: offset + len,
            found: bytes.len(),
        })
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

fn read_u16(bytes: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([bytes[at], bytes[at + 1]])
}
