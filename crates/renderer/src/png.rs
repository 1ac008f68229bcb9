//! PNG encoding for rendered radar images.
//!
//! Supports two encoding modes:
//! - **Indexed PNG (color type 3)**: used with a color table's palette; the
//!   reflectivity table has far fewer than 256 colors so this is the normal
//!   path.
//! - **RGBA PNG (color type 6)**: for arbitrary RGBA buffers.

use std::io::Write;

use grib2_parser::DecodedGrid;

use crate::error::RenderError;
use crate::raster::render_indexed;
use crate::reflectivity::{ColorTable, Rgba};

const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

/// Maximum colors for indexed PNG (PNG8)
const MAX_PALETTE_SIZE: usize = 256;

const COLOR_TYPE_INDEXED: u8 = 3;
const COLOR_TYPE_RGBA: u8 = 6;

fn check_len(
    actual: usize,
    width: usize,
    height: usize,
    bytes_per_pixel: usize,
) -> Result<(), RenderError> {
    let expected = width * height * bytes_per_pixel;
    if actual != expected {
        return Err(RenderError::DimensionMismatch {
            width,
            height,
            expected,
            actual,
        });
    }
    Ok(())
}

/// Render `grid` through `table` and encode it as an indexed PNG.
pub fn encode_grid_png(grid: &DecodedGrid, table: &ColorTable) -> Result<Vec<u8>, RenderError> {
    let palette = table.palette();
    if !table.fits_palette() {
        return Err(RenderError::PaletteTooLarge(palette.len()));
    }
    let indices = render_indexed(grid, table);
    create_png_indexed(grid.width(), grid.height(), &palette, &indices)
}

/// Create an indexed PNG (color type 3) from palette and indices.
pub fn create_png_indexed(
    width: usize,
    height: usize,
    palette: &[Rgba],
    indices: &[u8],
) -> Result<Vec<u8>, RenderError> {
    if palette.len() > MAX_PALETTE_SIZE {
        return Err(RenderError::PaletteTooLarge(palette.len()));
    }
    check_len(indices.len(), width, height, 1)?;

    let mut png = Vec::new();
    png.extend_from_slice(&PNG_SIGNATURE);
    write_chunk(&mut png, b"IHDR", &ihdr(width, height, COLOR_TYPE_INDEXED));

    let plte: Vec<u8> = palette.iter().flat_map(|c| [c.r, c.g, c.b]).collect();
    write_chunk(&mut png, b"PLTE", &plte);

    // tRNS only when some entry is not opaque
    if palette.iter().any(|c| c.a < 255) {
        let trns: Vec<u8> = palette.iter().map(|c| c.a).collect();
        write_chunk(&mut png, b"tRNS", &trns);
    }

    write_chunk(&mut png, b"IDAT", &deflate_scanlines(indices, width, height)?);
    write_chunk(&mut png, b"IEND", &[]);
    Ok(png)
}

/// Create a PNG image from RGBA pixel data (color type 6).
pub fn create_png(pixels: &[u8], width: usize, height: usize) -> Result<Vec<u8>, RenderError> {
    check_len(pixels.len(), width, height, 4)?;

    let mut png = Vec::new();
    png.extend_from_slice(&PNG_SIGNATURE);
    write_chunk(&mut png, b"IHDR", &ihdr(width, height, COLOR_TYPE_RGBA));
    write_chunk(&mut png, b"IDAT", &deflate_scanlines(pixels, width * 4, height)?);
    write_chunk(&mut png, b"IEND", &[]);
    Ok(png)
}

fn ihdr(width: usize, height: usize, color_type: u8) -> [u8; 13] {
    let mut data = [0u8; 13];
    data[0..4].copy_from_slice(&(width as u32).to_be_bytes());
    data[4..8].copy_from_slice(&(height as u32).to_be_bytes());
    data[8] = 8; // bit depth
    data[9] = color_type;
    // compression, filter and interlace methods stay 0
    data
}

/// Write a PNG chunk
fn write_chunk(png: &mut Vec<u8>, chunk_type: &[u8; 4], data: &[u8]) {
    png.extend_from_slice(&(data.len() as u32).to_be_bytes());
    png.extend_from_slice(chunk_type);
    png.extend_from_slice(data);

    let mut hasher = crc32fast::Hasher::new();
    hasher.update(chunk_type);
    hasher.update(data);
    png.extend_from_slice(&hasher.finalize().to_be_bytes());
}

/// Prefix each scanline with filter type 0 and zlib-compress the result.
fn deflate_scanlines(data: &[u8], row_bytes: usize, height: usize) -> Result<Vec<u8>, RenderError> {
    let mut uncompressed = Vec::with_capacity(height * (1 + row_bytes));
    for row in data.chunks_exact(row_bytes.max(1)).take(height) {
        uncompressed.push(0);
        uncompressed.extend_from_slice(row);
    }

    let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::fast());
    encoder.write_all(&uncompressed)?;
    Ok(encoder.finish()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflectivity::ColorBand;

    #[test]
    fn test_ihdr_layout() {
        let data = ihdr(300, 2, COLOR_TYPE_INDEXED);
        assert_eq!(&data[0..4], &300u32.to_be_bytes());
        assert_eq!(&data[4..8], &2u32.to_be_bytes());
        assert_eq!(data[8], 8);
        assert_eq!(data[9], 3);
    }

    #[test]
    fn test_chunk_crc() {
        let mut png = Vec::new();
        write_chunk(&mut png, b"IEND", &[]);
        // Well-known CRC of an empty IEND chunk
        assert_eq!(&png[8..12], &[0xAE, 0x42, 0x60, 0x82]);
    }

    #[test]
    fn test_rgba_length_checked() {
        assert!(matches!(
            create_png(&[0; 12], 2, 2),
            Err(RenderError::DimensionMismatch { expected: 16, actual: 12, .. })
        ));
    }

    #[test]
    fn test_palette_limit() {
        let palette = vec![Rgba::new(0, 0, 0, 255); 257];
        assert!(matches!(
            create_png_indexed(1, 1, &palette, &[0]),
            Err(RenderError::PaletteTooLarge(257))
        ));
    }

    #[test]
    fn test_oversized_table_rejected() {
        let bands: Vec<ColorBand> = (0..255)
            .map(|i| ColorBand {
                upper_bound: i as f32,
                color: Rgba::new(0, 0, 0, 255),
            })
            .collect();
        let table = ColorTable::new(Box::leak(bands.into_boxed_slice()), Rgba::new(0, 0, 0, 0));
        let grid = DecodedGrid::new(1, 1, vec![Some(254.5)]).unwrap();
        assert!(matches!(
            encode_grid_png(&grid, &table),
            Err(RenderError::PaletteTooLarge(257))
        ));
    }
}
