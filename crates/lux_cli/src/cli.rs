use clap::{Parser, ValueEnum};
use log::LevelFilter;
use lux_renderer::{GatherMode, RenderConfig};
use std::path::PathBuf;

/// Log levels accepted on the command line
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Render the Cornell box demo scene with photon mapping.
#[derive(Parser, Debug)]
#[command(name = "lux")]
#[command(about = "Photon mapping renderer")]
pub struct Args {
    /// JSON render config; flags below override its values
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output PNG path
    #[arg(short, long, default_value = "render.png")]
    pub output: PathBuf,

    /// Logging level (RUST_LOG takes precedence)
    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,

    /// Image width in pixels
    #[arg(long)]
    pub width: Option<u32>,

    /// Image height in pixels
    #[arg(long)]
    pub height: Option<u32>,

    /// Camera rays per pixel
    #[arg(short = 's', long)]
    pub samples_per_pixel: Option<u32>,

    /// Photons emitted for the diffuse map
    #[arg(long)]
    pub photons: Option<usize>,

    /// Photons accepted into the caustic map
    #[arg(long)]
    pub caustic_photons: Option<usize>,

    /// Build and gather from a caustic map
    #[arg(long)]
    pub caustics: bool,

    /// Photon gather radius
    #[arg(long)]
    pub gather_radius: Option<f32>,

    /// Show where photons land instead of estimating density
    #[arg(long)]
    pub visualize: bool,

    /// Direct lighting only, no photon pass
    #[arg(long)]
    pub backward_only: bool,

    /// Lens cone angle in degrees; 0 renders with a pinhole
    #[arg(long)]
    pub defocus_angle: Option<f32>,

    /// Distance to the plane of perfect focus
    #[arg(long)]
    pub focus_distance: Option<f32>,

    /// Seed for a reproducible render
    #[arg(long)]
    pub seed: Option<u64>,
}

impl Args {
    /// Fold command-line overrides into `config`.
    pub fn apply(&self, config: &mut RenderConfig) {
        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(height) = self.height {
            config.height = height;
        }
        if let Some(samples) = self.samples_per_pixel {
            config.samples_per_pixel = samples;
        }
        if let Some(photons) = self.photons {
            config.photons.diffuse_photons = photons;
        }
        if let Some(photons) = self.caustic_photons {
            config.photons.caustic_photons = photons;
        }
        if self.caustics {
            config.photons.caustics = true;
        }
        if let Some(radius) = self.gather_radius {
            config.photons.gather_radius = radius;
        }
        if self.visualize {
            config.photons.gather_mode = GatherMode::Visualize;
        }
        if let Some(angle) = self.defocus_angle {
            config.lens.defocus_angle = angle;
        }
        if self.focus_distance.is_some() {
            config.lens.focus_distance = self.focus_distance;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
    }
}
