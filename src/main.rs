//! defectgen command line entry point.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{CommandFactory, Parser, ValueEnum};
use defectgen::{Deformity, GenerateError, Generator, GeneratorConfig, Layout, Placement, Shape};
use log::LevelFilter;

#[derive(Parser)]
#[command(name = "defectgen")]
#[command(about = "Generate labeled bitmaps with a single randomly placed deformity")]
#[command(version)]
struct Cli {
    /// Image height in pixels.
    #[arg(required_unless_present = "config")]
    height: Option<u32>,

    /// Image width in pixels.
    #[arg(required_unless_present = "config")]
    width: Option<u32>,

    /// Number of images to create.
    #[arg(required_unless_present = "config")]
    image_count: Option<u32>,

    /// Maximum deformity radius.
    #[arg(required_unless_present = "config")]
    max_radius: Option<u32>,

    /// Load the batch configuration from a JSON file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Deformity outline.
    #[arg(long, value_enum)]
    shape: Option<CliShape>,

    /// Use the same deformity for every image, given as ROW,COL,RADIUS.
    #[arg(long, value_parser = parse_fixed)]
    fixed: Option<Deformity>,

    /// Log geometry and class boundaries of every image.
    #[arg(long)]
    trace: bool,

    /// Write each bitmap into a sub-directory named after its class.
    #[arg(long)]
    by_class: bool,

    /// Directory bitmaps are written to.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Classification log, appended to across runs.
    #[arg(long)]
    log: Option<PathBuf>,

    /// Seed for a reproducible batch.
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliShape {
    Circle,
    Square,
}

impl From<CliShape> for Shape {
    fn from(shape: CliShape) -> Self {
        match shape {
            CliShape::Circle => Shape::Circle,
            CliShape::Square => Shape::Square,
        }
    }
}

fn parse_fixed(s: &str) -> Result<Deformity, String> {
    let parts = s
        .split(',')
        .map(|p| p.trim().parse::<u32>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("expected ROW,COL,RADIUS: {}", e))?;
    match parts.as_slice() {
        &[row, col, radius] => Ok(Deformity::new(row, col, radius)),
        _ => Err(format!("expected 3 comma separated values, got {}", parts.len())),
    }
}

impl Cli {
    fn into_config(self) -> Result<GeneratorConfig, GenerateError> {
        let mut config = match &self.config {
            Some(path) => GeneratorConfig::load(path)?,
            None => GeneratorConfig::new(0, 0, 0, 0),
        };

        if let Some(height) = self.height {
            config.height = height;
        }
        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(count) = self.image_count {
            config.image_count = count;
        }
        if let Some(max_radius) = self.max_radius {
            config.max_radius = max_radius;
        }
        if let Some(shape) = self.shape {
            config.shape = shape.into();
        }
        if let Some(fixed) = self.fixed {
            config.placement = Placement::Fixed(fixed);
        }
        if self.trace {
            config.trace = true;
        }
        if self.by_class {
            config.layout = Layout::ByClass;
        }
        if let Some(out) = self.out {
            config.output_dir = out;
        }
        if let Some(log) = self.log {
            config.log_file = log;
        }

        config.validate()?;
        Ok(config)
    }
}

/// Level used until the configuration is loaded.
fn startup_level(trace: bool) -> LevelFilter {
    if trace {
        LevelFilter::Trace
    } else {
        LevelFilter::Info
    }
}

fn usage_error(error: &GenerateError) -> ExitCode {
    eprintln!("ERROR: {}", error);
    eprintln!("{}", Cli::command().render_usage());
    ExitCode::FAILURE
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let seed = cli.seed;

    // RUST_LOG takes precedence over the configured level
    let env_filter = std::env::var_os("RUST_LOG").is_some();
    env_logger::Builder::new()
        .filter_level(LevelFilter::Trace)
        .parse_default_env()
        .init();
    if !env_filter {
        log::set_max_level(startup_level(cli.trace));
    }

    let config = match cli.into_config() {
        Ok(config) => config,
        Err(e) => return usage_error(&e),
    };
    if !env_filter {
        log::set_max_level(config.level_filter());
    }

    let generator = match seed {
        Some(seed) => Generator::seeded(config, seed),
        None => Generator::new(config),
    };
    let mut generator = match generator {
        Ok(generator) => generator,
        Err(e) => return usage_error(&e),
    };

    match generator.run() {
        Ok(report) => {
            for image in &report.images {
                let d = image.deformity;
                println!(
                    "{}: deformity at [{}, {}], radius = {}, {}",
                    image.file_name, d.center_row, d.center_col, d.radius, image.severity
                );
            }
            println!("Time taken: {:.2}s", report.elapsed.as_secs_f64());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Generation failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
