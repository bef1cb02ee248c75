//! Deformity placement and painting.
//!
//! A deformity is a single dark region on a white canvas. Its radius is drawn
//! first and the center ranges are derived from it, so the region never
//! touches the canvas border.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::canvas::{Canvas, Rgb};
use crate::constants::MIN_DEFORMITY_RADIUS;

/// Outline used when painting a deformity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    /// Filled Euclidean circle
    #[default]
    Circle,
    /// Axis-aligned square with side `2 * radius - 1`
    Square,
}

impl Shape {
    pub fn name(&self) -> &'static str {
        match self {
            Shape::Circle => "circle",
            Shape::Square => "square",
        }
    }
}

/// Center and radius of one deformity, in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deformity {
    pub center_row: u32,
    pub center_col: u32,
    pub radius: u32,
}

impl Deformity {
    pub fn new(center_row: u32, center_col: u32, radius: u32) -> Self {
        Self {
            center_row,
            center_col,
            radius,
        }
    }

    /// Whether the pixel at `(row, col)` lies inside the deformity.
    pub fn contains(&self, row: u32, col: u32, shape: Shape) -> bool {
        let dr = i64::from(row) - i64::from(self.center_row);
        let dc = i64::from(col) - i64::from(self.center_col);
        let r = i64::from(self.radius);

        match shape {
            Shape::Circle => dr * dr + dc * dc < r * r,
            Shape::Square => dr.abs() < r && dc.abs() < r,
        }
    }

    /// Whether the deformity has a usable radius and stays inside a
    /// `height x width` canvas without touching the far edge.
    pub fn fits(&self, height: u32, width: u32) -> bool {
        let r = u64::from(self.radius);
        let (row, col) = (u64::from(self.center_row), u64::from(self.center_col));

        self.radius >= MIN_DEFORMITY_RADIUS
            && row >= r
            && col >= r
            && row + r < u64::from(height)
            && col + r < u64::from(width)
    }
}

/// How the deformity of each image is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Placement {
    /// Radius and center drawn from the generator's random stream
    #[default]
    Random,
    /// The same deformity for every image; consumes no randomness
    Fixed(Deformity),
}

/// Largest radius random placement can draw for a dimension.
///
/// Centers are drawn from `[r + 1, dim - r - 1]`, which is empty once
/// `2r + 2 > dim`.
pub fn max_random_radius(dim: u32) -> u32 {
    dim.saturating_sub(2) / 2
}

/// Choose the deformity for one image.
///
/// Random placement draws the radius from `[1, max_radius]`, then the column
/// and the row of the center, in that order. `max_radius` must not exceed
/// [`max_random_radius`] of either dimension; configuration validation
/// guarantees this before generation starts.
pub fn place<R: Rng + ?Sized>(
    height: u32,
    width: u32,
    max_radius: u32,
    placement: Placement,
    rng: &mut R,
) -> Deformity {
    match placement {
        Placement::Fixed(deformity) => deformity,
        Placement::Random => {
            let radius = rng.gen_range(MIN_DEFORMITY_RADIUS..=max_radius);
            let center_col = rng.gen_range(radius + 1..=width - radius - 1);
            let center_row = rng.gen_range(radius + 1..=height - radius - 1);
            Deformity::new(center_row, center_col, radius)
        }
    }
}

/// Paint every pixel of the canvas: black inside the deformity, white elsewhere.
///
/// Returns the number of black pixels.
pub fn paint(canvas: &mut Canvas, deformity: &Deformity, shape: Shape) -> usize {
    let mut inside = 0;
    for row in 0..canvas.height() {
        for col in 0..canvas.width() {
            if deformity.contains(row, col, shape) {
                canvas.set(row, col, Rgb::BLACK);
                inside += 1;
            } else {
                canvas.set(row, col, Rgb::WHITE);
            }
        }
    }

    inside
}
