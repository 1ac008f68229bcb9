//! End-to-end decode of a single GRIB2 message.

use std::time::Instant;

use tracing::{debug, info, info_span};

use crate::error::{Grib2Error, Grib2Result};
use crate::grid::DecodedGrid;
use crate::sections::{
    locate_sections, parse_bitmap, parse_identification, parse_product_definition,
    Identification, Indicator, ProductDefinition,
};
use crate::templates::{
    parse_data_representation, parse_grid_definition, GridGeometry, PackingParameters,
};
use crate::unpacking::unpack_simple;

/// Everything decoded from one message.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedMessage {
    pub indicator: Indicator,
    pub identification: Identification,
    pub product: ProductDefinition,
    pub geometry: GridGeometry,
    pub packing: PackingParameters,
    pub grid: DecodedGrid,
}

/// Decode a decompressed GRIB2 buffer.
///
/// `product_key` is only used to label log output. Decoding is pure and
/// deterministic: the same bytes always yield the same message.
pub fn decode(buffer: &[u8], product_key: &str) -> Grib2Result<DecodedMessage> {
    let span = info_span!("decode", product = %product_key, bytes = buffer.len());
    let _guard = span.enter();
    let start = Instant::now();

    let layout = locate_sections(buffer)?;

    let identification = parse_identification(layout.identification.payload(buffer))?;
    let geometry = parse_grid_definition(layout.grid_definition.payload(buffer))?;
    let product = parse_product_definition(layout.product_definition.payload(buffer))?;
    let representation = parse_data_representation(layout.data_representation.payload(buffer))?;

    let num_points = geometry.num_points();
    for declared in [geometry.declared_points, representation.num_data_points] {
        if u64::from(declared) != num_points {
            return Err(Grib2Error::DimensionMismatch {
                points_x: geometry.points_x,
                points_y: geometry.points_y,
                declared,
            });
        }
    }

    let bitmap = parse_bitmap(layout.bitmap.payload(buffer))?;
    debug!(bitmap = bitmap.is_some(), "Unpacking data section");

    let values = unpack_simple(
        layout.data.payload(buffer),
        bitmap,
        representation.num_data_points as usize,
        &representation.packing,
    )?;

    let grid = DecodedGrid::new(geometry.points_x as usize, geometry.points_y as usize, values)
        .ok_or(Grib2Error::DimensionMismatch {
            points_x: geometry.points_x,
            points_y: geometry.points_y,
            declared: representation.num_data_points,
        })?;

    let stats = grid.stats();
    info!(
        points_x = geometry.points_x,
        points_y = geometry.points_y,
        valid = stats.valid,
        missing = stats.missing,
        min = ?stats.min,
        max = ?stats.max,
        reference_time = %identification.reference_time,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Decoded GRIB2 message"
    );

    Ok(DecodedMessage {
        indicator: layout.indicator,
        identification,
        product,
        geometry,
        packing: representation.packing,
        grid,
    })
}
