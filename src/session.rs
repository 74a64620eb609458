//! Start-up sequence tying the grid to its streamer.

use std::time::Duration;

use log::info;

use crate::config::{ConfigError, TerrainConfig};
use crate::streamer::{MeshSink, MeshStreamer, StreamError};
use crate::terrain::TerrainGrid;

/// A terrain grid plus the streamer that drives it.
pub struct TerrainSession {
    grid: TerrainGrid,
    streamer: MeshStreamer,
    continuous: bool,
}

impl TerrainSession {
    pub fn new(config: &TerrainConfig) -> Result<Self, ConfigError> {
        let grid = TerrainGrid::new(config)?;
        Ok(Self {
            grid,
            streamer: MeshStreamer::new(config.tick_duration()?),
            continuous: config.continuous,
        })
    }

    /// Build the terrain and publish it.
    ///
    /// Continuous terrain starts streaming; static terrain is handed to
    /// [`MeshSink::static_mesh_ready`] exactly once.
    pub fn start(&mut self, sink: &mut impl MeshSink) -> Result<(), StreamError> {
        if self.grid.is_built() {
            return Err(StreamError::AlreadyStarted);
        }

        self.grid.build_full();
        let mesh = self.grid.mesh();
        sink.mesh_changed(&mesh);

        if self.continuous {
            self.streamer.start()?;
        } else {
            info!("Static terrain ready");
            sink.static_mesh_ready(&mesh);
        }
        Ok(())
    }

    /// Advance streaming by `elapsed` wall-clock time.
    pub fn update(
        &mut self,
        elapsed: Duration,
        sink: &mut impl MeshSink,
    ) -> Result<u32, StreamError> {
        self.streamer.tick(elapsed, &mut self.grid, sink)
    }

    pub fn stop(&mut self) {
        self.streamer.stop();
    }

    pub fn grid(&self) -> &TerrainGrid {
        &self.grid
    }

    pub fn streamer(&self) -> &MeshStreamer {
        &self.streamer
    }
}
