//! Data Representation Section, template 5.0 (simple packing).

use crate::error::{Grib2Error, Grib2Result};
use crate::reader::ByteCursor;
use tracing::debug;

pub const SIMPLE_PACKING_TEMPLATE: u16 = 0;

/// Widest packed value the unpacker accepts.
pub const MAX_BIT_WIDTH: u8 = 32;

/// Simple packing parameters.
///
/// Unpacked value: `Y = (R + X * 2^E) * 10^(-D)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PackingParameters {
    /// R
    pub reference_value: f32,
    /// E
    pub binary_scale_factor: i16,
    /// D
    pub decimal_scale_factor: i16,
    pub bit_width: u8,
}

impl PackingParameters {
    /// Physical value of packed integer `x`.
    pub fn unpack(&self, x: u32) -> f32 {
        let binary = 2.0_f64.powi(i32::from(self.binary_scale_factor));
        let decimal = 10.0_f64.powi(-i32::from(self.decimal_scale_factor));
        ((f64::from(self.reference_value) + f64::from(x) * binary) * decimal) as f32
    }
}

/// Contents of Section 5.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DataRepresentation {
    pub num_data_points: u32,
    pub packing: PackingParameters,
    pub original_data_type: u8,
}

/// Parse the payload of Section 5.
pub fn parse_data_representation(payload: &[u8]) -> Grib2Result<DataRepresentation> {
    let mut cursor = ByteCursor::new(payload, "data representation section");

    let num_data_points = cursor.read_u32()?;
    let template = cursor.read_u16()?;
    if template != SIMPLE_PACKING_TEMPLATE {
        return Err(Grib2Error::UnsupportedPackingTemplate(template));
    }

    let reference_value = cursor.read_f32()?;
    let binary_scale_factor = cursor.read_i16()?;
    let decimal_scale_factor = cursor.read_i16()?;
    let bit_width = cursor.read_u8()?;
    let original_data_type = cursor.read_u8()?;

    if bit_width > MAX_BIT_WIDTH {
        return Err(Grib2Error::InvalidBitWidth(bit_width));
    }

    debug!(
        num_data_points,
        reference_value,
        binary_scale_factor,
        decimal_scale_factor,
        bit_width,
        "Parsed data representation"
    );

    Ok(DataRepresentation {
        num_data_points,
        packing: PackingParameters {
            reference_value,
            binary_scale_factor,
            decimal_scale_factor,
            bit_width,
        },
        original_data_type,
    })
}
