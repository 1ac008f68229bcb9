//! Grid Definition Section, template 3.0 (latitude/longitude).

use crate::error::{Grib2Error, Grib2Result};
use crate::reader::ByteCursor;
use tracing::debug;

/// Template number of the regular latitude/longitude grid.
pub const LATLON_GRID_TEMPLATE: u16 = 0;

/// Coordinates are stored in units of 10^-6 degrees.
const MICRODEGREES: f64 = 1e-6;

/// Dimensions and corners of a regular lat/lon grid.
///
/// Longitudes are kept as encoded, which for MRMS means the 0-360 degree
/// convention. Use [`normalize_longitude`] before using them as display
/// bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct GridGeometry {
    /// Number of points along a parallel (Ni).
    pub points_x: u32,
    /// Number of points along a meridian (Nj).
    pub points_y: u32,
    pub lat_first: f64,
    pub lon_first: f64,
    pub lat_last: f64,
    pub lon_last: f64,
    /// i direction increment in degrees.
    pub dx: f64,
    /// j direction increment in degrees.
    pub dy: f64,
    pub scanning_mode: u8,
    /// Number of data points declared by section 3 itself.
    pub declared_points: u32,
}

impl GridGeometry {
    pub fn num_points(&self) -> u64 {
        u64::from(self.points_x) * u64::from(self.points_y)
    }
}

/// Map a longitude in the 0-360 convention onto -180..180.
pub fn normalize_longitude(lon: f64) -> f64 {
    if lon > 180.0 {
        lon - 360.0
    } else {
        lon
    }
}

/// Parse the payload of Section 3.
pub fn parse_grid_definition(payload: &[u8]) -> Grib2Result<GridGeometry> {
    let mut cursor = ByteCursor::new(payload, "grid definition section");

    // Source of grid definition
    cursor.skip(1)?;
    let declared_points = cursor.read_u32()?;
    // Optional list octets and interpretation
    cursor.skip(2)?;
    let template = cursor.read_u16()?;
    if template != LATLON_GRID_TEMPLATE {
        return Err(Grib2Error::UnsupportedGridTemplate(template));
    }

    // Shape of the earth and its radius/axes (1 + 3 * (1 + 4) bytes)
    cursor.skip(16)?;
    let points_x = cursor.read_u32()?;
    let points_y = cursor.read_u32()?;
    // Basic angle and its subdivisions; MRMS leaves both at their defaults
    cursor.skip(8)?;
    let lat_first = cursor.read_i32()?;
    let lon_first = cursor.read_i32()?;
    // Resolution and component flags
    cursor.skip(1)?;
    let lat_last = cursor.read_i32()?;
    let lon_last = cursor.read_i32()?;
    let dx = cursor.read_u32()?;
    let dy = cursor.read_u32()?;
    let scanning_mode = cursor.read_u8()?;

    let geometry = GridGeometry {
        points_x,
        points_y,
        lat_first: f64::from(lat_first) * MICRODEGREES,
        lon_first: f64::from(lon_first) * MICRODEGREES,
        lat_last: f64::from(lat_last) * MICRODEGREES,
        lon_last: f64::from(lon_last) * MICRODEGREES,
        dx: f64::from(dx) * MICRODEGREES,
        dy: f64::from(dy) * MICRODEGREES,
        scanning_mode,
        declared_points,
    };

    debug!(
        points_x,
        points_y,
        lat_first = geometry.lat_first,
        lon_first = geometry.lon_first,
        "Parsed grid definition"
    );

    Ok(geometry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_longitude() {
        assert_eq!(normalize_longitude(230.005), 230.005 - 360.0);
        assert_eq!(normalize_longitude(180.0), 180.0);
        assert_eq!(normalize_longitude(-75.5), -75.5);
        assert_eq!(normalize_longitude(0.0), 0.0);
    }

    #[test]
    fn test_rejects_other_templates() {
        // Lambert conformal (3.30)
        let mut payload = vec![0u8; 80];
        payload[7..9].copy_from_slice(&30u16.to_be_bytes());
        assert_eq!(
            parse_grid_definition(&payload),
            Err(Grib2Error::UnsupportedGridTemplate(30))
        );
    }

    #[test]
    fn test_truncated_template() {
        let mut payload = vec![0u8; 40];
        payload[7..9].copy_from_slice(&0u16.to_be_bytes());
        assert!(matches!(
            parse_grid_definition(&payload),
            Err(Grib2Error::TruncatedInput { .. })
        ));
    }
}
