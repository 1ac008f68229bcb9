//! Image rendering for decoded radar grids.
//!
//! - Reflectivity color calibration table
//! - Grid to RGBA / palette-index rasters
//! - PNG encoding (indexed and RGBA)

pub mod error;
pub mod png;
pub mod raster;
pub mod reflectivity;

pub use error::RenderError;
pub use raster::{render_indexed, render_rgba};
pub use reflectivity::{
    ColorBand, ColorTable, Rgba, MAX_PALETTE_BANDS, REFLECTIVITY, TRANSPARENT,
};
