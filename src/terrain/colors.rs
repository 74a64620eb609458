//! Elevation color bands.
//!
//! Heights are classified into five contiguous bands (water, sand, grass,
//! rock, snow) spread over the configured height range. Each band carries a
//! low and a high color; a vertex blends between the two.

use glam::Vec3;

pub const BLACK: [f32; 3] = [0.0, 0.0, 0.0];
pub const WHITE: [f32; 3] = [1.0, 1.0, 1.0];
pub const BLUE: [f32; 3] = [0.0, 0.0, 1.0];
pub const YELLOW: [f32; 3] = [1.0, 0.92, 0.016];
pub const GREEN: [f32; 3] = [0.0, 1.0, 0.0];
pub const GREY: [f32; 3] = [0.5, 0.5, 0.5];

/// Band edges as fractions of the height range.
const BAND_EDGES: [f32; 6] = [0.0, 0.25, 0.5, 0.75, 0.9, 1.0];

/// Low/high colors per band, lowest band first.
const BAND_COLORS: [([f32; 3], [f32; 3]); 5] = [
    (BLUE, YELLOW),
    (YELLOW, GREEN),
    (GREEN, GREY),
    (GREY, WHITE),
    (WHITE, WHITE),
];

/// A contiguous height interval mapped to a pair of colors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorBand {
    pub lower: f32,
    pub upper: f32,
    pub low_color: [f32; 3],
    pub high_color: [f32; 3],
}

/// Classifies heights into color bands.
#[derive(Debug, Clone)]
pub struct ColorBander {
    bands: [ColorBand; 5],
}

impl ColorBander {
    /// Spread the bands over `[min, max]`.
    pub fn new(min: f32, max: f32) -> Self {
        let span = (max - min).abs();
        let bands = std::array::from_fn(|i| ColorBand {
            lower: min + span * BAND_EDGES[i],
            upper: min + span * BAND_EDGES[i + 1],
            low_color: BAND_COLORS[i].0,
            high_color: BAND_COLORS[i].1,
        });
        Self { bands }
    }

    pub fn bands(&self) -> &[ColorBand] {
        &self.bands
    }

    /// Band containing `value`. Bands are left-closed; the last band also
    /// includes its upper edge.
    pub fn classify(&self, value: f32) -> Option<&ColorBand> {
        let last = self.bands.len() - 1;
        self.bands.iter().enumerate().find_map(|(i, band)| {
            let below_upper = value < band.upper || (i == last && value <= band.upper);
            (value >= band.lower && below_upper).then_some(band)
        })
    }

    /// Low or high color of the band containing `value`.
    /// Black below the first band, white above the last.
    pub fn band_color(&self, value: f32, upper: bool) -> [f32; 3] {
        match self.classify(value) {
            Some(band) if upper => band.high_color,
            Some(band) => band.low_color,
            None if value > self.bands[self.bands.len() - 1].upper => WHITE,
            None => BLACK,
        }
    }

    /// Final vertex color: the band's low and high colors blended by the raw
    /// height, clamped to `[0, 1]`.
    pub fn color(&self, y: f32) -> [f32; 3] {
        let low = Vec3::from_array(self.band_color(y, false));
        let high = Vec3::from_array(self.band_color(y, true));
        let t = if y.is_nan() { 0.0 } else { y.clamp(0.0, 1.0) };
        low.lerp(high, t).to_array()
    }
}
