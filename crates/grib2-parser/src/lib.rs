//! GRIB2 decoder for MRMS radar products (WMO FM 92 GRIB Edition 2).
//!
//! Supports the subset MRMS composite products use: a single field per
//! message on a regular latitude/longitude grid (template 3.0), simple
//! packing (template 5.0) and an optional bitmap.
//!
//! ```ignore
//! let message = grib2_parser::decode(&bytes, "MergedReflectivityQCComposite")?;
//! println!("{}x{}", message.geometry.points_x, message.geometry.points_y);
//! ```

pub mod error;
pub mod grid;
pub mod message;
pub mod reader;
pub mod sections;
pub mod templates;
pub mod unpacking;

pub use error::{Grib2Error, Grib2Result};
pub use grid::{DecodedGrid, GridStats};
pub use message::{decode, DecodedMessage};
pub use templates::grid::normalize_longitude;
pub use templates::{GridGeometry, PackingParameters};
