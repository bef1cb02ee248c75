//! In-memory pixel buffer for a single generated image.
//!
//! Pixels are stored row-major in red, green, blue order. A canvas is
//! allocated fresh for every image and dropped once it has been encoded.

/// A single 8-bit-per-channel color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Background color of every canvas.
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    /// Color of deformity pixels.
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Row-major grid of `height * width` pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<Rgb>,
}

impl Canvas {
    /// Create a canvas filled with white.
    pub fn new(height: u32, width: u32) -> Self {
        Self::filled(height, width, Rgb::WHITE)
    }

    /// Create a canvas where every pixel has the given color.
    pub fn filled(height: u32, width: u32, color: Rgb) -> Self {
        let len = height as usize * width as usize;
        Self {
            width,
            height,
            pixels: vec![color; len],
        }
    }

    /// Build a canvas from row-major pixels.
    ///
    /// Returns `None` if the pixel count does not match the dimensions.
    pub fn from_pixels(height: u32, width: u32, pixels: Vec<Rgb>) -> Option<Self> {
        if pixels.len() != height as usize * width as usize {
            return None;
        }
        Some(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[Rgb] {
        &self.pixels
    }

    fn index(&self, row: u32, col: u32) -> usize {
        debug_assert!(row < self.height && col < self.width);
        row as usize * self.width as usize + col as usize
    }

    pub fn get(&self, row: u32, col: u32) -> Rgb {
        self.pixels[self.index(row, col)]
    }

    pub fn set(&mut self, row: u32, col: u32, color: Rgb) {
        let idx = self.index(row, col);
        self.pixels[idx] = color;
    }

    /// Iterate over rows from top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Rgb]> {
        // chunks_exact panics on zero, and an empty canvas has no rows anyway
        self.pixels.chunks_exact(self.width.max(1) as usize)
    }

    /// Number of pixels with exactly this color.
    pub fn count(&self, color: Rgb) -> usize {
        self.pixels.iter().filter(|&&p| p == color).count()
    }

    /// Whether every pixel is either pure black or pure white.
    pub fn is_monochrome(&self) -> bool {
        self.pixels
            .iter()
            .all(|&p| p == Rgb::WHITE || p == Rgb::BLACK)
    }
}
