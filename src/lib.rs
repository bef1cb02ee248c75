//! defectgen - labeled deformity bitmap generator
//!
//! Synthesizes batches of white 24-bit bitmaps, each carrying one black
//! deformity of random size and position, and labels every image with a
//! severity class derived from the deformity radius and the canvas area.

pub mod canvas;
pub mod classify;
pub mod config;
pub mod constants;
pub mod deformity;
pub mod format;
pub mod generator;

pub use canvas::{Canvas, Rgb};
pub use classify::{Boundaries, ClassificationLog, ClassificationRecord, Severity};
pub use config::{ConfigError, GeneratorConfig, Layout, LogLevel};
pub use deformity::{Deformity, Placement, Shape};
pub use format::FormatError;
pub use generator::{BatchReport, GenerateError, GeneratedImage, Generator};
