//! Periodic row streaming.
//!
//! [`MeshStreamer`] is a two-state machine (idle / streaming) advanced by an
//! external scheduler. Each elapsed period scrolls the grid by one row and
//! tells the [`MeshSink`] that the buffers changed.

use std::time::Duration;

use log::{debug, info, warn};
use thiserror::Error;

use crate::terrain::{GridError, TerrainGrid, TerrainMesh};

/// Most scroll steps a single tick may catch up on.
pub const MAX_CATCH_UP_STEPS: u32 = 8;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum StreamError {
    #[error("Streaming is already active")]
    AlreadyStreaming,
    #[error("Terrain session has already been started")]
    AlreadyStarted,
    #[error(transparent)]
    Grid(#[from] GridError),
}

/// Receiver of mesh updates, typically the renderer.
pub trait MeshSink {
    /// Buffers changed. The receiver must re-upload them and recalculate
    /// normals.
    fn mesh_changed(&mut self, mesh: &TerrainMesh);

    /// Called once after the first build of a terrain that will not stream,
    /// e.g. to bake a navigation mesh.
    fn static_mesh_ready(&mut self, _mesh: &TerrainMesh) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    Idle,
    Streaming,
}

#[derive(Debug, Clone)]
pub struct MeshStreamer {
    state: StreamState,
    period: Duration,
    /// Time accumulated since the last scroll
    pending: Duration,
}

impl MeshStreamer {
    pub fn new(period: Duration) -> Self {
        Self {
            state: StreamState::Idle,
            period,
            pending: Duration::ZERO,
        }
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    pub fn is_streaming(&self) -> bool {
        self.state == StreamState::Streaming
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn start(&mut self) -> Result<(), StreamError> {
        if self.is_streaming() {
            return Err(StreamError::AlreadyStreaming);
        }
        self.state = StreamState::Streaming;
        self.pending = Duration::ZERO;
        info!("Streaming started, period {:?}", self.period);
        Ok(())
    }

    /// Stop streaming. Safe at any point between ticks.
    pub fn stop(&mut self) {
        if self.is_streaming() {
            info!("Streaming stopped");
        }
        self.state = StreamState::Idle;
        self.pending = Duration::ZERO;
    }

    /// Advance by `elapsed` wall-clock time, scrolling once per whole period.
    ///
    /// Returns the number of rows streamed. An idle streamer does nothing.
    pub fn tick(
        &mut self,
        elapsed: Duration,
        grid: &mut TerrainGrid,
        sink: &mut impl MeshSink,
    ) -> Result<u32, StreamError> {
        if !self.is_streaming() {
            return Ok(0);
        }
        if !grid.is_built() {
            return Err(GridError::NotBuilt.into());
        }

        self.pending += elapsed;
        let mut steps = 0;
        while self.pending >= self.period && steps < MAX_CATCH_UP_STEPS {
            grid.scroll_forward()?;
            sink.mesh_changed(&grid.mesh());
            self.pending -= self.period;
            steps += 1;
        }

        if self.pending >= self.period {
            warn!(
                "Streaming fell behind, dropping {:?} of pending time",
                self.pending
            );
            self.pending = Duration::ZERO;
        }

        if steps > 0 {
            debug!("Streamed {} row(s)", steps);
        }
        Ok(steps)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::{Strategy, TerrainConfig};

    /// Sink that records what it was sent.
    #[derive(Default)]
    pub(crate) struct RecordingSink {
        pub changes: usize,
        pub static_ready: usize,
        pub last_vertex_count: usize,
    }

    impl MeshSink for RecordingSink {
        fn mesh_changed(&mut self, mesh: &TerrainMesh) {
            self.changes += 1;
            self.last_vertex_count = mesh.positions.len();
        }

        fn static_mesh_ready(&mut self, _mesh: &TerrainMesh) {
            self.static_ready += 1;
        }
    }

    fn grid() -> TerrainGrid {
        TerrainGrid::generate(&TerrainConfig {
            width: 3,
            depth: 3,
            strategy: Strategy::noise_field(),
            seed: Some(8),
            ..TerrainConfig::default()
        })
        .unwrap()
    }

    const PERIOD: Duration = Duration::from_millis(10);

    #[test]
    fn test_starts_idle() {
        let streamer = MeshStreamer::new(PERIOD);
        assert_eq!(streamer.state(), StreamState::Idle);
    }

    #[test]
    fn test_idle_tick_does_nothing() {
        let mut streamer = MeshStreamer::new(PERIOD);
        let mut grid = grid();
        let mut sink = RecordingSink::default();

        let steps = streamer
            .tick(Duration::from_secs(1), &mut grid, &mut sink)
            .unwrap();
        assert_eq!(steps, 0);
        assert_eq!(sink.changes, 0);
        assert_eq!(grid.row_cursor(), 4);
    }

    #[test]
    fn test_start_twice_is_rejected() {
        let mut streamer = MeshStreamer::new(PERIOD);
        streamer.start().unwrap();
        assert_eq!(streamer.start(), Err(StreamError::AlreadyStreaming));
        assert!(streamer.is_streaming());
    }

    #[test]
    fn test_one_scroll_per_period() {
        let mut streamer = MeshStreamer::new(PERIOD);
        let mut grid = grid();
        let mut sink = RecordingSink::default();
        streamer.start().unwrap();

        assert_eq!(
            streamer
                .tick(Duration::from_millis(4), &mut grid, &mut sink)
                .unwrap(),
            0
        );
        assert_eq!(
            streamer
                .tick(Duration::from_millis(7), &mut grid, &mut sink)
                .unwrap(),
            1
        );
        assert_eq!(
            streamer
                .tick(Duration::from_millis(25), &mut grid, &mut sink)
                .unwrap(),
            2
        );

        assert_eq!(sink.changes, 3);
        assert_eq!(sink.last_vertex_count, 16);
        assert_eq!(grid.row_cursor(), 4 + 3);
        assert_eq!(grid.rows().len(), 4);
    }

    #[test]
    fn test_catch_up_is_bounded() {
        let mut streamer = MeshStreamer::new(PERIOD);
        let mut grid = grid();
        let mut sink = RecordingSink::default();
        streamer.start().unwrap();

        let steps = streamer
            .tick(Duration::from_secs(10), &mut grid, &mut sink)
            .unwrap();
        assert_eq!(steps, MAX_CATCH_UP_STEPS);

        // Surplus time was dropped
        let steps = streamer
            .tick(Duration::from_millis(1), &mut grid, &mut sink)
            .unwrap();
        assert_eq!(steps, 0);
    }

    #[test]
    fn test_stop_between_ticks() {
        let mut streamer = MeshStreamer::new(PERIOD);
        let mut grid = grid();
        let mut sink = RecordingSink::default();
        streamer.start().unwrap();
        streamer
            .tick(Duration::from_millis(15), &mut grid, &mut sink)
            .unwrap();

        streamer.stop();
        let cursor = grid.row_cursor();
        let steps = streamer
            .tick(Duration::from_secs(1), &mut grid, &mut sink)
            .unwrap();

        assert_eq!(steps, 0);
        assert_eq!(grid.row_cursor(), cursor);
        assert_eq!(grid.rows().len(), 4);
        assert_eq!(grid.indices().len(), 3 * 3 * 6);

        // Restarting keeps the cursor monotonic and discards stale time
        streamer.start().unwrap();
        streamer
            .tick(Duration::from_millis(5), &mut grid, &mut sink)
            .unwrap();
        assert_eq!(grid.row_cursor(), cursor);
    }

    #[test]
    fn test_unbuilt_grid_is_rejected() {
        let mut streamer = MeshStreamer::new(PERIOD);
        let mut grid = TerrainGrid::new(&TerrainConfig {
            seed: Some(1),
            ..TerrainConfig::default()
        })
        .unwrap();
        let mut sink = RecordingSink::default();
        streamer.start().unwrap();

        let result = streamer.tick(PERIOD, &mut grid, &mut sink);
        assert_eq!(result, Err(StreamError::Grid(GridError::NotBuilt)));
        assert_eq!(sink.changes, 0);
    }
}
