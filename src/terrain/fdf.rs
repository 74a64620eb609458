//! `.fdf` snapshot export.
//!
//! One line per row, whitespace separated `height,0xRRGGBB` values.

use std::fs;
use std::path::Path;

use log::info;
use thiserror::Error;

use super::TerrainGrid;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Cannot write file {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Terrain has not been built yet")]
    EmptyTerrain,
}

/// Pack an RGB color with components in `[0, 1]` as `0xRRGGBB`
pub fn pack_rgb(color: [f32; 3]) -> u32 {
    color
        .iter()
        .fold(0, |acc, c| (acc << 8) | (c.clamp(0.0, 1.0) * 255.0).round() as u32)
}

/// Render the grid's current window, heights as emitted to the renderer.
pub fn format_fdf(grid: &TerrainGrid) -> Result<String, ExportError> {
    if !grid.is_built() {
        return Err(ExportError::EmptyTerrain);
    }

    let (positions, colors) = grid.flatten();
    let mut out = String::new();

    for (row_positions, row_colors) in positions
        .chunks(grid.width() + 1)
        .zip(colors.chunks(grid.width() + 1))
    {
        let line: Vec<String> = row_positions
            .iter()
            .zip(row_colors)
            .map(|(p, &c)| format!("{},0x{:06X}", p[1], pack_rgb(c)))
            .collect();
        out.push_str(&line.join(" "));
        out.push('\n');
    }

    Ok(out)
}

/// Write the grid's current window to an .fdf file
pub fn write_fdf<P: AsRef<Path>>(path: P, grid: &TerrainGrid) -> Result<(), ExportError> {
    let path = path.as_ref();
    let content = format_fdf(grid)?;
    fs::write(path, content).map_err(|source| ExportError::Write {
        path: path.display().to_string(),
        source,
    })?;

    info!("Wrote terrain snapshot to {}", path.display());
    Ok(())
}
