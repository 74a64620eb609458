//! Terrain grid synthesis and streaming.
//!
//! This module provides:
//! - [`TerrainGrid`] - Sliding window of synthesized vertex rows
//! - [`HeightSynthesizer`] - Neighbor-averaged and noise-field height strategies
//! - [`ColorBander`] - Elevation band coloring
//! - [`TerrainMesh`] - Flat buffers for the renderer

pub mod colors;
pub mod fdf;
pub mod mesh;
pub mod synth;

pub use colors::ColorBander;
pub use mesh::{triangulate, TerrainMesh, Vertex};
pub use synth::{HeightSynthesizer, PlacedHeights};

use glam::Vec3;
use log::{debug, info, trace};
use thiserror::Error;

use crate::config::{ConfigError, Strategy, TerrainConfig};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum GridError {
    #[error("Terrain must be fully built before it can scroll")]
    NotBuilt,
}

/// Row-major heightfield with its color and index buffers.
///
/// The coordinate system uses:
/// - X axis: columns, `0..=width`
/// - Z axis: storage row, `0` is the oldest row
/// - Y axis: synthesized height
///
/// Rows hold raw synthesized heights. For the noise field strategy the
/// height factor is applied when [`flatten`](Self::flatten) emits positions.
#[derive(Clone)]
pub struct TerrainGrid {
    width: usize,
    depth: usize,
    strategy: Strategy,
    synth: HeightSynthesizer,
    bander: ColorBander,
    /// Indexed as `rows[z][x]`
    rows: Vec<Vec<Vec3>>,
    colors: Vec<[f32; 3]>,
    indices: Vec<u32>,
    /// Logical z of the next row to synthesize
    row_cursor: u64,
    built: bool,
}

impl TerrainGrid {
    /// Validate `config` and prepare an empty grid.
    ///
    /// No buffer is allocated until [`build_full`](Self::build_full).
    pub fn new(config: &TerrainConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let seed = config.seed.unwrap_or_else(|| {
            let seed = rand::random();
            info!("No seed configured, using {}", seed);
            seed
        });
        let (band_min, band_max) = config.strategy.band_range();

        Ok(Self {
            width: config.width as usize,
            depth: config.depth as usize,
            strategy: config.strategy,
            synth: HeightSynthesizer::new(config.strategy, config.width, config.depth, seed),
            bander: ColorBander::new(band_min, band_max),
            rows: Vec::new(),
            colors: Vec::new(),
            indices: Vec::new(),
            row_cursor: 0,
            built: false,
        })
    }

    /// Validate, then build every buffer.
    pub fn generate(config: &TerrainConfig) -> Result<Self, ConfigError> {
        let mut grid = Self::new(config)?;
        grid.build_full();
        Ok(grid)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn is_built(&self) -> bool {
        self.built
    }

    /// Logical z of the next row a scroll will synthesize.
    pub fn row_cursor(&self) -> u64 {
        self.row_cursor
    }

    /// Vertex rows with raw heights, oldest first.
    pub fn rows(&self) -> &[Vec<Vec3>] {
        &self.rows
    }

    pub fn colors(&self) -> &[[f32; 3]] {
        &self.colors
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Synthesize every row from scratch.
    ///
    /// Rows are built in increasing z and each row in increasing x, so every
    /// neighbor a vertex looks back at already exists.
    pub fn build_full(&mut self) {
        self.rows = Vec::with_capacity(self.depth + 1);
        for z in 0..=self.depth {
            let row = self.synthesize_row(z, z as u64);
            self.rows.push(row);
        }
        self.row_cursor = self.depth as u64 + 1;
        self.built = true;

        self.rebuild_buffers();
        info!(
            "Built terrain: {}x{} cells, {} vertices, {} indices",
            self.width,
            self.depth,
            self.vertex_count(),
            self.indices.len()
        );
    }

    /// Drop the oldest row and append a freshly synthesized one at the far
    /// edge.
    pub fn scroll_forward(&mut self) -> Result<(), GridError> {
        if !self.built {
            return Err(GridError::NotBuilt);
        }

        self.rows.remove(0);
        for row in &mut self.rows {
            for vertex in row.iter_mut() {
                vertex.z -= 1.0;
            }
        }

        let row = self.synthesize_row(self.depth, self.row_cursor);
        self.rows.push(row);
        self.row_cursor += 1;

        self.rebuild_buffers();
        trace!("Scrolled terrain, next logical row {}", self.row_cursor);
        Ok(())
    }

    pub fn vertex_count(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }

    /// Row-major positions (with the height factor applied) and colors.
    pub fn flatten(&self) -> (Vec<[f32; 3]>, Vec<[f32; 3]>) {
        let height_factor = match self.strategy {
            Strategy::NoiseField { height_factor, .. } => height_factor,
            Strategy::NeighborAveraged { .. } => 1.0,
        };

        let positions = self
            .rows
            .iter()
            .flatten()
            .map(|v| [v.x, v.y * height_factor, v.z])
            .collect();

        (positions, self.colors.clone())
    }

    /// Current buffers packaged for the renderer.
    pub fn mesh(&self) -> TerrainMesh {
        let (positions, colors) = self.flatten();
        TerrainMesh {
            positions,
            colors,
            indices: self.indices.clone(),
        }
    }

    fn synthesize_row(&mut self, z: usize, z_logical: u64) -> Vec<Vec3> {
        let mut row = Vec::with_capacity(self.width + 1);
        for x in 0..=self.width {
            let placed = PlacedHeights {
                rows: &self.rows,
                current: &row,
            };
            let y = self.synth.height(x, z, z_logical, &placed);
            row.push(Vec3::new(x as f32, y, z as f32));
        }
        row
    }

    fn rebuild_buffers(&mut self) {
        self.colors = self
            .rows
            .iter()
            .flatten()
            .map(|v| self.bander.color(v.y))
            .collect();
        self.indices = triangulate(self.width, self.depth);
        debug!(
            "Rebuilt {} colors and {} indices",
            self.colors.len(),
            self.indices.len()
        );
    }
}
