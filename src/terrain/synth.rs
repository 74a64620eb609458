//! Height synthesis strategies.

use glam::Vec3;
use noise::{NoiseFn, Perlin};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::config::Strategy;

/// Offsets of the neighbors that are already placed when scanning row-major:
/// left, back-left, back, back-right, right.
const NEIGHBOR_OFFSETS: [(isize, isize); 5] = [(-1, 0), (-1, -1), (0, -1), (1, -1), (1, 0)];

/// Heights synthesized so far: completed rows plus the row under construction.
pub struct PlacedHeights<'a> {
    pub rows: &'a [Vec<Vec3>],
    pub current: &'a [Vec3],
}

impl PlacedHeights<'_> {
    /// Height at storage coordinate `(x, z)`, or `None` when it is outside
    /// the grid or not synthesized yet.
    pub fn get(&self, x: isize, z: isize) -> Option<f32> {
        if x < 0 || z < 0 {
            return None;
        }
        let (x, z) = (x as usize, z as usize);
        let row = match z.cmp(&self.rows.len()) {
            std::cmp::Ordering::Less => self.rows[z].as_slice(),
            std::cmp::Ordering::Equal => self.current,
            std::cmp::Ordering::Greater => return None,
        };
        row.get(x).map(|v| v.y)
    }
}

/// Random perturbation averaged against already-placed neighbors.
#[derive(Debug, Clone)]
pub struct NeighborAveraged {
    min_y: f32,
    max_y: f32,
    scale_factor: f32,
    rng: ChaCha8Rng,
}

impl NeighborAveraged {
    pub fn new(min_y: f32, max_y: f32, scale_factor: f32, seed: u64) -> Self {
        Self {
            min_y,
            max_y,
            scale_factor,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Mean of the available neighbors of `(x, z)`; 0 when none are placed.
    ///
    /// A neighbor that is present with height 0 counts towards the mean.
    pub fn local_average(x: usize, z: usize, placed: &PlacedHeights) -> f32 {
        let (x, z) = (x as isize, z as isize);
        let (sum, count) = NEIGHBOR_OFFSETS
            .iter()
            .filter_map(|&(dx, dz)| placed.get(x + dx, z + dz))
            .fold((0.0, 0u32), |(sum, count), h| (sum + h, count + 1));

        if count == 0 {
            0.0
        } else {
            sum / count as f32
        }
    }

    pub fn height(&mut self, x: usize, z: usize, placed: &PlacedHeights) -> f32 {
        let average = Self::local_average(x, z, placed);
        let span = (self.max_y - self.min_y).abs();
        let jitter = self.rng.random::<f32>() * span;

        let y = (average + jitter + self.min_y) * self.scale_factor;
        y.clamp(self.min_y, self.max_y)
    }
}

/// Coherent noise sampled at the logical row coordinate.
#[derive(Clone)]
pub struct NoiseField {
    width: f32,
    depth: f32,
    noise_scale: f64,
    noise: Perlin,
}

impl NoiseField {
    pub fn new(width: u32, depth: u32, noise_scale: f32, seed: u64) -> Self {
        Self {
            width: width as f32,
            depth: depth as f32,
            noise_scale: noise_scale as f64,
            // Perlin only takes a 32-bit seed; fold the high half in.
            noise: Perlin::new((seed ^ (seed >> 32)) as u32),
        }
    }

    /// Raw noise value in `[0, 1]` at column `x` of logical row `z_logical`.
    pub fn height(&self, x: usize, z_logical: u64) -> f32 {
        let x_coord = (x as f32 / self.width) as f64 * self.noise_scale;
        let z_coord = (z_logical as f64 / self.depth as f64) * self.noise_scale;

        // Perlin output is in [-1, 1]
        let raw = self.noise.get([x_coord, z_coord]);
        ((raw * 0.5 + 0.5) as f32).clamp(0.0, 1.0)
    }
}

/// Height synthesis strategy chosen at construction time.
#[derive(Clone)]
pub enum HeightSynthesizer {
    NeighborAveraged(NeighborAveraged),
    NoiseField(NoiseField),
}

impl HeightSynthesizer {
    pub fn new(strategy: Strategy, width: u32, depth: u32, seed: u64) -> Self {
        match strategy {
            Strategy::NeighborAveraged {
                min_y,
                max_y,
                scale_factor,
            } => Self::NeighborAveraged(NeighborAveraged::new(min_y, max_y, scale_factor, seed)),
            Strategy::NoiseField { noise_scale, .. } => {
                Self::NoiseField(NoiseField::new(width, depth, noise_scale, seed))
            }
        }
    }

    /// Synthesize the height of storage coordinate `(x, z)` whose logical
    /// row is `z_logical`.
    pub fn height(&mut self, x: usize, z: usize, z_logical: u64, placed: &PlacedHeights) -> f32 {
        match self {
            Self::NeighborAveraged(s) => s.height(x, z, placed),
            Self::NoiseField(s) => s.height(x, z_logical),
        }
    }
}
