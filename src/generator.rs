//! Batch generation of labeled deformity bitmaps.
//!
//! Each image is placed, painted, encoded and classified before the next one
//! starts. The only state shared between images is the random stream and the
//! classification log.

use std::path::PathBuf;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;
use web_time::{Duration, Instant};

use crate::canvas::Canvas;
use crate::classify::{Boundaries, ClassificationLog, Severity};
use crate::config::{ConfigError, GeneratorConfig, Layout};
use crate::constants::BITMAP_EXTENSION;
use crate::deformity::{Deformity, paint, place};
use crate::format::{FormatError, write_bitmap};

/// Errors that abort a batch.
#[derive(Error, Debug)]
pub enum GenerateError {
    /// The configuration failed validation
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A bitmap could not be written
    #[error("Failed to write {path:?}: {source}")]
    Bitmap {
        /// Destination of the bitmap
        path: PathBuf,
        /// Underlying error
        source: FormatError,
    },

    /// The classification log could not be opened or written
    #[error("Classification log {path:?}: {source}")]
    Log {
        /// Path of the log
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// An output directory could not be created
    #[error("Failed to create directory {path:?}: {source}")]
    CreateDir {
        /// Directory that could not be created
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },
}

/// One generated image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    /// File name recorded in the classification log
    pub file_name: String,
    /// Where the bitmap was written
    pub path: PathBuf,
    pub deformity: Deformity,
    pub severity: Severity,
    /// Number of pixels painted black
    pub black_pixels: usize,
}

/// Summary of a finished batch.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Images in generation order
    pub images: Vec<GeneratedImage>,
    /// Wall-clock time of the whole batch
    pub elapsed: Duration,
    /// Image count per severity, indexed by [`Severity::index`]
    pub counts: [usize; 4],
}

impl BatchReport {
    /// Number of images labeled with `severity`.
    pub fn count(&self, severity: Severity) -> usize {
        self.counts[severity.index()]
    }
}

/// Generates a batch of images described by a [`GeneratorConfig`].
pub struct Generator<R: Rng = StdRng> {
    config: GeneratorConfig,
    boundaries: Boundaries,
    rng: R,
}

impl Generator<StdRng> {
    /// Create a generator seeded from system entropy.
    pub fn new(config: GeneratorConfig) -> Result<Self, GenerateError> {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Create a generator with a reproducible random stream.
    pub fn seeded(config: GeneratorConfig, seed: u64) -> Result<Self, GenerateError> {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> Generator<R> {
    /// Create a generator drawing from `rng`. The configuration is validated here.
    pub fn with_rng(config: GeneratorConfig, rng: R) -> Result<Self, GenerateError> {
        config.validate()?;
        let boundaries = Boundaries::for_canvas(config.height, config.width);
        Ok(Self {
            config,
            boundaries,
            rng,
        })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn boundaries(&self) -> Boundaries {
        self.boundaries
    }

    /// File name of the `index`-th image (1-based).
    pub fn file_name(&self, index: u32) -> String {
        format!("{}{}.{}", self.config.file_prefix, index, BITMAP_EXTENSION)
    }

    fn image_path(&self, file_name: &str, severity: Severity) -> Result<PathBuf, GenerateError> {
        let dir = match self.config.layout {
            Layout::Flat => self.config.output_dir.clone(),
            Layout::ByClass => self.config.output_dir.join(severity.label()),
        };
        std::fs::create_dir_all(&dir).map_err(|source| GenerateError::CreateDir {
            path: dir.clone(),
            source,
        })?;
        Ok(dir.join(file_name))
    }

    /// Generate, write and record the `index`-th image.
    pub fn generate_one(
        &mut self,
        index: u32,
        log: &mut ClassificationLog,
    ) -> Result<GeneratedImage, GenerateError> {
        let config = &self.config;
        let deformity = place(
            config.height,
            config.width,
            config.max_radius,
            config.placement,
            &mut self.rng,
        );
        log::debug!(
            "Deformity location [{}, {}], radius = {}",
            deformity.center_row,
            deformity.center_col,
            deformity.radius
        );

        let mut canvas = Canvas::new(config.height, config.width);
        let black_pixels = paint(&mut canvas, &deformity, config.shape);

        let severity = self.boundaries.classify(deformity.radius);
        let file_name = self.file_name(index);
        // per-image diagnostics are only emitted in trace mode
        if self.config.trace {
            log::trace!(
                "Image {}, {} r = {}, {} black pixels, min low r = {}, min medium r = {}, min high r = {}",
                file_name,
                self.config.shape.name(),
                deformity.radius,
                black_pixels,
                self.boundaries.low,
                self.boundaries.medium,
                self.boundaries.high
            );
        }

        let path = self.image_path(&file_name, severity)?;
        write_bitmap(&canvas, &path).map_err(|source| GenerateError::Bitmap {
            path: path.clone(),
            source,
        })?;
        if let Err(source) = log.record(&file_name, severity) {
            return Err(GenerateError::Log {
                path: log.path().to_path_buf(),
                source,
            });
        }

        log::info!("Image {} generated ({})", file_name, severity);

        Ok(GeneratedImage {
            file_name,
            path,
            deformity,
            severity,
            black_pixels,
        })
    }

    /// Generate the whole batch.
    ///
    /// The classification log is opened once in append mode and closed when
    /// the batch ends, including when an image fails and the batch aborts.
    pub fn run(&mut self) -> Result<BatchReport, GenerateError> {
        let start = Instant::now();
        let log_path = self.config.log_file.clone();
        let log_error = |source| GenerateError::Log {
            path: log_path.clone(),
            source,
        };

        log::info!(
            "Generating {} {}x{} images, max radius {}",
            self.config.image_count,
            self.config.height,
            self.config.width,
            self.config.max_radius
        );

        let mut log = ClassificationLog::open(&self.config.log_file).map_err(log_error)?;
        let mut report = BatchReport::default();

        for index in 1..=self.config.image_count {
            let image = self.generate_one(index, &mut log)?;
            report.counts[image.severity.index()] += 1;
            report.images.push(image);
        }

        log.finish().map_err(log_error)?;
        report.elapsed = start.elapsed();

        log::info!(
            "Generated {} images in {:.2}s",
            report.images.len(),
            report.elapsed.as_secs_f64()
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::read_log;
    use crate::deformity::{Placement, Shape};
    use crate::format::{decode, file_size};

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "defectgen_generator_{}_{}",
            name,
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn config_in(
        dir: &std::path::Path,
        height: u32,
        width: u32,
        count: u32,
        max_radius: u32,
    ) -> GeneratorConfig {
        GeneratorConfig::new(height, width, count, max_radius)
            .with_output_dir(dir)
            .with_log_file(dir.join("classification.txt"))
    }

    #[test]
    fn test_single_image_end_to_end() {
        let dir = scratch_dir("single");
        let mut generator = Generator::seeded(config_in(&dir, 100, 100, 1, 30), 1).unwrap();
        let report = generator.run().unwrap();

        assert_eq!(report.images.len(), 1);
        let image = &report.images[0];
        assert_eq!(image.file_name, "bitmap1.bmp");
        assert_eq!(image.path, dir.join("bitmap1.bmp"));
        assert!(image.deformity.radius >= 1 && image.deformity.radius <= 30);

        let bytes = std::fs::read(&image.path).unwrap();
        assert_eq!(bytes.len(), 30054);

        let expected = Boundaries::for_canvas(100, 100).classify(image.deformity.radius);
        let log = std::fs::read_to_string(dir.join("classification.txt")).unwrap();
        assert_eq!(log, format!("bitmap1.bmp, {}\n", expected));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_written_images_match_records() {
        let dir = scratch_dir("records");
        let mut generator = Generator::seeded(config_in(&dir, 30, 45, 12, 13), 99).unwrap();
        let report = generator.run().unwrap();

        let records = read_log(dir.join("classification.txt")).unwrap();
        assert_eq!(records.len(), 12);

        for (i, (image, record)) in report.images.iter().zip(&records).enumerate() {
            assert_eq!(record.file_name, format!("bitmap{}.bmp", i + 1));
            assert_eq!(record.severity, image.severity);

            let bytes = std::fs::read(&image.path).unwrap();
            assert_eq!(bytes.len(), file_size(30, 45).unwrap() as usize);

            let canvas = decode(&bytes).unwrap();
            assert!(canvas.is_monochrome());
            assert!(image.deformity.fits(30, 45));
            let d = image.deformity;
            assert_eq!(canvas.get(d.center_row, d.center_col), crate::canvas::Rgb::BLACK);
            assert_eq!(canvas.count(crate::canvas::Rgb::BLACK), image.black_pixels);
        }

        let total: usize = Severity::all().iter().map(|&s| report.count(s)).sum();
        assert_eq!(total, 12);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_same_seed_same_batch() {
        let dir_a = scratch_dir("seed_a");
        let dir_b = scratch_dir("seed_b");

        let a = Generator::seeded(config_in(&dir_a, 40, 40, 5, 15), 5).unwrap().run().unwrap();
        let b = Generator::seeded(config_in(&dir_b, 40, 40, 5, 15), 5).unwrap().run().unwrap();

        for (x, y) in a.images.iter().zip(&b.images) {
            assert_eq!(x.deformity, y.deformity);
            assert_eq!(std::fs::read(&x.path).unwrap(), std::fs::read(&y.path).unwrap());
        }

        std::fs::remove_dir_all(&dir_a).unwrap();
        std::fs::remove_dir_all(&dir_b).unwrap();
    }

    #[test]
    fn test_fixed_placement_is_byte_identical() {
        let dir = scratch_dir("fixed");
        let config = config_in(&dir, 100, 100, 3, 30)
            .with_placement(Placement::Fixed(Deformity::new(21, 21, 20)));
        let report = Generator::new(config).unwrap().run().unwrap();

        let first = std::fs::read(&report.images[0].path).unwrap();
        for image in &report.images[1..] {
            assert_eq!(std::fs::read(&image.path).unwrap(), first);
            // 13 <= 20 < 36 on a 100x100 canvas
            assert_eq!(image.severity, Severity::Low);
        }

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_log_is_appended_across_runs() {
        let dir = scratch_dir("append");
        let config = config_in(&dir, 20, 20, 2, 5).with_shape(Shape::Square);

        Generator::seeded(config.clone(), 1).unwrap().run().unwrap();
        Generator::seeded(config, 2).unwrap().run().unwrap();

        let records = read_log(dir.join("classification.txt")).unwrap();
        let names: Vec<_> = records.iter().map(|r| r.file_name.as_str()).collect();
        assert_eq!(names, ["bitmap1.bmp", "bitmap2.bmp", "bitmap1.bmp", "bitmap2.bmp"]);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_by_class_layout() {
        let dir = scratch_dir("by_class");
        let config = config_in(&dir, 50, 50, 8, 24).with_layout(Layout::ByClass);
        let report = Generator::seeded(config, 3).unwrap().run().unwrap();

        for image in &report.images {
            assert_eq!(
                image.path,
                dir.join(image.severity.label()).join(&image.file_name)
            );
            assert!(image.path.is_file());
        }

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_zero_images_still_creates_log() {
        let dir = scratch_dir("zero");
        let report = Generator::seeded(config_in(&dir, 10, 10, 0, 2), 0)
            .unwrap()
            .run()
            .unwrap();

        assert!(report.images.is_empty());
        assert_eq!(std::fs::read_to_string(dir.join("classification.txt")).unwrap(), "");

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_invalid_config_is_rejected_before_output() {
        let dir = scratch_dir("invalid");
        let err = Generator::seeded(config_in(&dir, 10, 10, 1, 6), 0).err().unwrap();
        assert!(matches!(err, GenerateError::Config(ConfigError::RadiusTooLarge { .. })));
        assert!(!dir.join("classification.txt").exists());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_unwritable_bitmap_aborts_without_log_line() {
        let dir = scratch_dir("unwritable_bitmap");
        // a directory occupies the first bitmap's file name
        std::fs::create_dir_all(dir.join("bitmap1.bmp")).unwrap();

        let err = Generator::seeded(config_in(&dir, 20, 20, 2, 5), 0)
            .unwrap()
            .run()
            .unwrap_err();

        match err {
            GenerateError::Bitmap { path, source } => {
                assert_eq!(path, dir.join("bitmap1.bmp"));
                assert!(matches!(source, FormatError::Io(_)));
            }
            other => panic!("expected a bitmap write error, got {:?}", other),
        }
        assert_eq!(
            std::fs::read_to_string(dir.join("classification.txt")).unwrap(),
            ""
        );
        assert!(!dir.join("bitmap2.bmp").exists());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_unwritable_output_aborts() {
        let dir = scratch_dir("unwritable");
        // a regular file where the output directory should be
        let blocker = dir.join("blocked");
        std::fs::write(&blocker, b"").unwrap();

        let config = GeneratorConfig::new(10, 10, 1, 2)
            .with_output_dir(&blocker)
            .with_log_file(dir.join("classification.txt"));
        let err = Generator::seeded(config, 0).unwrap().run().unwrap_err();
        assert!(matches!(err, GenerateError::CreateDir { .. }));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
