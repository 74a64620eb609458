//! Generation settings.
//!
//! [`TerrainConfig`] is loaded from a RON file, overridden from the command
//! line and validated before any terrain buffer is allocated.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("Grid must have at least one cell in each direction, got {width}x{depth}")]
    EmptyGrid { width: u32, depth: u32 },
    #[error("Height bounds are inverted: min {min} > max {max}")]
    InvertedBounds { min: f32, max: f32 },
    #[error("Tick period must be a positive number of seconds, got {0}")]
    InvalidTickPeriod(f32),
    #[error("Parameter '{name}' must be finite, got {value}")]
    NonFinite { name: &'static str, value: f32 },
}

/// How vertex heights are produced.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Strategy {
    /// Random perturbation averaged against already-placed neighbors.
    NeighborAveraged {
        min_y: f32,
        max_y: f32,
        /// Multiplier applied before clamping to `[min_y, max_y]`
        scale_factor: f32,
    },
    /// Coherent 2D noise, scaled by `height_factor` when buffers are emitted.
    NoiseField { noise_scale: f32, height_factor: f32 },
}

impl Default for Strategy {
    fn default() -> Self {
        Strategy::NeighborAveraged {
            min_y: 0.0,
            max_y: 2.0,
            scale_factor: 0.5,
        }
    }
}

impl Strategy {
    /// Default parameters for the noise field strategy.
    pub fn noise_field() -> Self {
        Strategy::NoiseField {
            noise_scale: 4.0,
            height_factor: 8.0,
        }
    }

    /// Range the color bands are spread over.
    pub fn band_range(&self) -> (f32, f32) {
        match *self {
            Strategy::NeighborAveraged { min_y, max_y, .. } => (min_y, max_y),
            Strategy::NoiseField { .. } => (0.0, 1.0),
        }
    }
}

/// Settings for one terrain grid and its streaming cadence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// Cells along X (vertices = width + 1)
    pub width: u32,
    /// Cells along Z (rows = depth + 1)
    pub depth: u32,
    pub strategy: Strategy,
    /// Seed for the random source and the noise permutation table.
    /// A fresh seed is drawn when absent.
    pub seed: Option<u64>,
    /// Keep scrolling rows after the first build
    pub continuous: bool,
    /// Seconds between scroll steps
    pub tick_period: f32,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            width: 20,
            depth: 20,
            strategy: Strategy::default(),
            seed: None,
            continuous: false,
            tick_period: 0.01,
        }
    }
}

impl TerrainConfig {
    /// Load settings from a RON file. Missing fields keep their defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&content)
    }

    /// Parse RON content (useful for testing)
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(content)?)
    }

    /// Reject settings that would produce an empty or inconsistent grid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.depth == 0 {
            return Err(ConfigError::EmptyGrid {
                width: self.width,
                depth: self.depth,
            });
        }
        self.tick_duration()?;

        match self.strategy {
            Strategy::NeighborAveraged {
                min_y,
                max_y,
                scale_factor,
            } => {
                finite("min_y", min_y)?;
                finite("max_y", max_y)?;
                finite("scale_factor", scale_factor)?;
                if min_y > max_y {
                    return Err(ConfigError::InvertedBounds {
                        min: min_y,
                        max: max_y,
                    });
                }
            }
            Strategy::NoiseField {
                noise_scale,
                height_factor,
            } => {
                finite("noise_scale", noise_scale)?;
                finite("height_factor", height_factor)?;
            }
        }

        Ok(())
    }

    /// Tick period as a `Duration`. Rejects zero, negative, non-finite and
    /// out-of-range values.
    pub fn tick_duration(&self) -> Result<Duration, ConfigError> {
        match Duration::try_from_secs_f32(self.tick_period) {
            Ok(period) if !period.is_zero() => Ok(period),
            _ => Err(ConfigError::InvalidTickPeriod(self.tick_period)),
        }
    }

    /// Apply command-line overrides on top of loaded settings.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(width) = args.width {
            self.width = width;
        }
        if let Some(depth) = args.depth {
            self.depth = depth;
        }
        if let Some(seed) = args.seed {
            self.seed = Some(seed);
        }
        if args.continuous {
            self.continuous = true;
        }
        if let Some(period) = args.tick_period {
            self.tick_period = period;
        }
        match args.strategy {
            Some(StrategyArg::Averaged)
                if !matches!(self.strategy, Strategy::NeighborAveraged { .. }) =>
            {
                self.strategy = Strategy::default();
            }
            Some(StrategyArg::Noise) if !matches!(self.strategy, Strategy::NoiseField { .. }) => {
                self.strategy = Strategy::noise_field();
            }
            _ => {}
        }
    }
}

fn finite(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonFinite { name, value })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StrategyArg {
    /// Random neighbor-averaged heights
    Averaged,
    /// Coherent noise field
    Noise,
}

#[derive(Parser, Debug, Default)]
#[command(name = "terrastream")]
#[command(about = "Procedural streaming terrain mesh generator")]
pub struct CliArgs {
    /// Path to a .ron settings file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Grid width in cells
    #[arg(long)]
    pub width: Option<u32>,

    /// Grid depth in cells
    #[arg(long)]
    pub depth: Option<u32>,

    /// Random seed for reproducible terrain
    #[arg(long)]
    pub seed: Option<u64>,

    /// Height synthesis strategy
    #[arg(long, value_enum)]
    pub strategy: Option<StrategyArg>,

    /// Stream new rows after the first build
    #[arg(long)]
    pub continuous: bool,

    /// Seconds between streamed rows
    #[arg(long)]
    pub tick_period: Option<f32>,

    /// Number of rows to stream before exiting
    #[arg(long, default_value = "100")]
    pub ticks: u32,

    /// Write the final mesh as an .fdf snapshot
    #[arg(long)]
    pub output: Option<PathBuf>,
}
