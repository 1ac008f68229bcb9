//! Canned messages for common decode and render scenarios.

use crate::generators::Grib2Builder;

/// Reflectivity values (dBZ) of a 4x3 scene covering the main color bands,
/// with two missing cells.
pub const SCENE_4X3: [Option<f32>; 12] = [
    Some(-10.0),
    Some(4.9),
    Some(5.0),
    None,
    Some(19.9),
    Some(20.0),
    Some(35.5),
    Some(47.0),
    Some(65.0),
    None,
    Some(72.0),
    Some(80.0),
];

/// Encoded message carrying [`SCENE_4X3`].
pub fn reflectivity_scene() -> Vec<u8> {
    Grib2Builder::mrms(4, 3).with_values(&SCENE_4X3).build()
}

/// A message whose every cell decodes to `value`.
pub fn constant_message(ni: u32, nj: u32, value: f32) -> Vec<u8> {
    Grib2Builder::mrms(ni, nj).with_packing(value, 0, 0).build()
}
