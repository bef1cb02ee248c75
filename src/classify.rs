//! Severity classification of deformities and the classification log.
//!
//! The severity of an image depends only on the deformity radius compared
//! with three radius boundaries derived from the canvas area. Every generated
//! image appends one `"<file name>, <Label>"` line to the log.

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::{MAX_LOW_RATIO, MAX_MEDIUM_RATIO, MAX_NONE_RATIO, RATIO_MARGIN};

/// Severity class of a generated image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    None,
    Low,
    Medium,
    High,
}

impl Severity {
    /// Label written to the classification log.
    pub fn label(&self) -> &'static str {
        match self {
            Severity::None => "None",
            Severity::Low => "Low",
            Severity::Medium => "Medium",
            Severity::High => "High",
        }
    }

    /// All classes from least to most severe.
    pub fn all() -> &'static [Severity] {
        &[
            Severity::None,
            Severity::Low,
            Severity::Medium,
            Severity::High,
        ]
    }

    /// Parse a label as written by [`Severity::label`].
    pub fn from_label(label: &str) -> Option<Self> {
        Self::all().iter().copied().find(|s| s.label() == label)
    }

    /// Position in [`Severity::all`].
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Minimum radius of each class above `None` for one canvas size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Boundaries {
    pub low: u32,
    pub medium: u32,
    pub high: u32,
}

impl Boundaries {
    /// Derive the boundaries from the area of a `height x width` canvas.
    pub fn for_canvas(height: u32, width: u32) -> Self {
        let area = f64::from(height) * f64::from(width);
        Self {
            low: boundary_radius(area, MAX_NONE_RATIO),
            medium: boundary_radius(area, MAX_LOW_RATIO),
            high: boundary_radius(area, MAX_MEDIUM_RATIO),
        }
    }

    /// Map a radius to its severity class.
    pub fn classify(&self, radius: u32) -> Severity {
        // Boundaries are nondecreasing, so the ordered checks are total.
        if radius < self.low {
            Severity::None
        } else if radius < self.medium {
            Severity::Low
        } else if radius < self.high {
            Severity::Medium
        } else {
            Severity::High
        }
    }
}

/// Radius of a circle covering `ratio + RATIO_MARGIN` of `area`, floored.
fn boundary_radius(area: f64, ratio: f64) -> u32 {
    (area * (ratio + RATIO_MARGIN) / std::f64::consts::PI)
        .sqrt()
        .floor() as u32
}

/// One line of the classification log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationRecord {
    pub file_name: String,
    pub severity: Severity,
}

impl ClassificationRecord {
    pub fn new(file_name: impl Into<String>, severity: Severity) -> Self {
        Self {
            file_name: file_name.into(),
            severity,
        }
    }

    /// Parse a `"<file name>, <Label>"` line. Trailing newlines are ignored.
    pub fn parse_line(line: &str) -> Option<Self> {
        let line = line.trim_end_matches(['\r', '\n']);
        let (file_name, label) = line.rsplit_once(", ")?;
        if file_name.is_empty() {
            return None;
        }
        Some(Self::new(file_name, Severity::from_label(label)?))
    }
}

impl fmt::Display for ClassificationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.file_name, self.severity)
    }
}

/// Append-only writer for the classification log.
///
/// The file is opened once per batch. Buffered lines are flushed by
/// [`ClassificationLog::finish`] or, on early exit, when the log is dropped.
pub struct ClassificationLog {
    path: PathBuf,
    writer: BufWriter<File>,
    records: usize,
}

impl ClassificationLog {
    /// Open `path` for appending, creating it if needed.
    pub fn open(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        log::debug!("Opened classification log {:?}", path);
        Ok(Self {
            path,
            writer: BufWriter::new(file),
            records: 0,
        })
    }

    /// Append one record.
    pub fn record(&mut self, file_name: &str, severity: Severity) -> std::io::Result<()> {
        writeln!(self.writer, "{}, {}", file_name, severity)?;
        self.records += 1;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of records appended through this handle.
    pub fn records(&self) -> usize {
        self.records
    }

    /// Flush buffered records and close the file.
    pub fn finish(mut self) -> std::io::Result<usize> {
        self.writer.flush()?;
        log::debug!(
            "Closed classification log {:?} after {} records",
            self.path,
            self.records
        );
        Ok(self.records)
    }
}

/// Read every well-formed record from a classification log.
pub fn read_log(path: impl AsRef<Path>) -> std::io::Result<Vec<ClassificationRecord>> {
    let content = std::fs::read_to_string(path)?;
    Ok(content
        .lines()
        .filter_map(ClassificationRecord::parse_line)
        .collect())
}
