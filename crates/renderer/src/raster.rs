//! Grid-to-pixel rendering.
//!
//! Pixels are emitted in the grid's row-major order. No vertical flip is
//! applied; orientation is the display layer's concern.

use grib2_parser::DecodedGrid;
use rayon::prelude::*;

use crate::reflectivity::ColorTable;

/// Minimum cells to benefit from parallel rendering
const PARALLEL_THRESHOLD: usize = 4096; // 64x64 or larger

/// Render a grid to an RGBA buffer of `width * height * 4` bytes.
pub fn render_rgba(grid: &DecodedGrid, table: &ColorTable) -> Vec<u8> {
    let values = grid.values();
    let mut pixels = vec![0u8; values.len() * 4];

    if values.len() >= PARALLEL_THRESHOLD {
        pixels
            .par_chunks_exact_mut(4)
            .zip(values.par_iter())
            .for_each(|(pixel, value)| {
                pixel.copy_from_slice(&table.color_of_cell(*value).to_array());
            });
    } else {
        for (pixel, value) in pixels.chunks_exact_mut(4).zip(values) {
            pixel.copy_from_slice(&table.color_of_cell(*value).to_array());
        }
    }

    pixels
}

/// Render a grid to palette indices (1 byte per cell) for
/// [`ColorTable::palette`].
pub fn render_indexed(grid: &DecodedGrid, table: &ColorTable) -> Vec<u8> {
    let values = grid.values();
    if values.len() >= PARALLEL_THRESHOLD {
        values.par_iter().map(|v| table.palette_index(*v)).collect()
    } else {
        values.iter().map(|v| table.palette_index(*v)).collect()
    }
}
