//! Procedural streaming terrain meshes.
//!
//! A [`TerrainGrid`](terrain::TerrainGrid) synthesizes a heightfield, colors
//! it by elevation band and triangulates it. In continuous mode a
//! [`MeshStreamer`](streamer::MeshStreamer) keeps discarding the oldest row
//! and appending a new one at the far edge.
//!
//! ```
//! use terrastream::config::TerrainConfig;
//! use terrastream::terrain::TerrainGrid;
//!
//! let config = TerrainConfig {
//!     width: 4,
//!     depth: 3,
//!     seed: Some(1),
//!     ..TerrainConfig::default()
//! };
//! let mut grid = TerrainGrid::generate(&config).unwrap();
//! grid.scroll_forward().unwrap();
//!
//! let mesh = grid.mesh();
//! assert_eq!(mesh.positions.len(), 5 * 4);
//! assert_eq!(mesh.indices.len(), 4 * 3 * 6);
//! ```

pub mod config;
pub mod session;
pub mod streamer;
pub mod terrain;
