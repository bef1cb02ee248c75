//! Global constants for defectgen

/// Bytes per pixel in the in-memory canvas and the encoded file (red, green, blue)
pub const BYTES_PER_PIXEL: usize = 3;

/// Size of the bitmap file header in bytes
pub const FILE_HEADER_SIZE: usize = 14;

/// Size of the bitmap info header in bytes
pub const INFO_HEADER_SIZE: usize = 40;

/// Offset from the start of the file to the pixel array
pub const PIXEL_DATA_OFFSET: usize = FILE_HEADER_SIZE + INFO_HEADER_SIZE;

/// Smallest radius a deformity can be drawn with
pub const MIN_DEFORMITY_RADIUS: u32 = 1;

/// Largest share of canvas area a deformity may cover and still be `None`
pub const MAX_NONE_RATIO: f64 = 0.05;

/// Largest share of canvas area for a `Low` deformity
pub const MAX_LOW_RATIO: f64 = 0.40;

/// Largest share of canvas area for a `Medium` deformity
pub const MAX_MEDIUM_RATIO: f64 = 0.60;

/// Margin added to every ratio when deriving radius boundaries
pub const RATIO_MARGIN: f64 = 0.01;

/// Default name of the classification log
pub const DEFAULT_CLASSIFICATION_FILE: &str = "classification.txt";

/// Default file name prefix for generated bitmaps
pub const DEFAULT_FILE_PREFIX: &str = "bitmap";

/// Extension of generated bitmaps
pub const BITMAP_EXTENSION: &str = "bmp";
