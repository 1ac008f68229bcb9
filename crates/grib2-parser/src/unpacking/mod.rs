//! Bitmap-aware simple unpacking.
//!
//! Simple packing formula:
//! value = (reference_value + packed_value * 2^binary_scale) * 10^(-decimal_scale)
//!
//! When a bitmap is present only cells it marks as valid occupy a slot in the
//! packed stream, so the bit cursor advances for valid cells only.

use crate::error::{Grib2Error, Grib2Result};
use crate::reader::BitReader;
use crate::templates::packing::{PackingParameters, MAX_BIT_WIDTH};

/// Whether cell `index` is marked valid in an MSB-first bitmap.
#[inline]
pub fn bitmap_is_set(bitmap: &[u8], index: usize) -> bool {
    (bitmap[index / 8] >> (7 - index % 8)) & 1 == 1
}

/// Unpack `num_points` simple-packed values.
///
/// Cells the bitmap marks missing are `None`. A zero bit width yields the
/// reference value for every valid cell without reading the data payload.
pub fn unpack_simple(
    packed_data: &[u8],
    bitmap: Option<&[u8]>,
    num_points: usize,
    packing: &PackingParameters,
) -> Grib2Result<Vec<Option<f32>>> {
    if packing.bit_width > MAX_BIT_WIDTH {
        return Err(Grib2Error::InvalidBitWidth(packing.bit_width));
    }

    if let Some(bm) = bitmap {
        let needed = num_points.div_ceil(8);
        if bm.len() < needed {
            return Err(Grib2Error::TruncatedInput {
                context: "bitmap",
                needed,
                available: bm.len(),
            });
        }
    }

    let is_valid = |i: usize| bitmap.map_or(true, |bm| bitmap_is_set(bm, i));

    if packing.bit_width == 0 {
        let mut values = allocate(num_points)?;
        values.extend(
            (0..num_points).map(|i| is_valid(i).then_some(packing.reference_value)),
        );
        return Ok(values);
    }

    let reference = f64::from(packing.reference_value);
    let binary_scale = 2.0_f64.powi(i32::from(packing.binary_scale_factor));
    let decimal_scale = 10.0_f64.powi(-i32::from(packing.decimal_scale_factor));
    let width = usize::from(packing.bit_width);

    let mut reader = BitReader::new(packed_data);

    // The payload must hold every valid cell before the output is sized
    // from the declared point count.
    let valid_cells = match bitmap {
        Some(bm) => count_valid(bm, num_points),
        None => num_points,
    };
    let fits = valid_cells
        .checked_mul(width)
        .is_some_and(|bits| bits <= reader.total_bits());
    if !fits {
        let ordinal = reader.total_bits() / width;
        let cell = nth_valid_cell(bitmap, num_points, ordinal).unwrap_or(num_points);
        return Err(Grib2Error::TruncatedData {
            cell,
            needed_bits: (ordinal + 1) * width,
            available_bits: reader.total_bits(),
        });
    }

    let mut values = allocate(num_points)?;

    for i in 0..num_points {
        if !is_valid(i) {
            values.push(None);
            continue;
        }

        let packed_value = reader
            .read_bits(width)
            .ok_or_else(|| Grib2Error::TruncatedData {
                cell: i,
                needed_bits: reader.position() + width,
                available_bits: reader.total_bits(),
            })?;

        let value = (reference + f64::from(packed_value) * binary_scale) * decimal_scale;
        values.push(Some(value as f32));
    }

    Ok(values)
}

fn allocate(num_points: usize) -> Grib2Result<Vec<Option<f32>>> {
    let mut values = Vec::new();
    values
        .try_reserve_exact(num_points)
        .map_err(|_| Grib2Error::GridTooLarge(num_points))?;
    Ok(values)
}

/// Number of bits set among the first `num_points` bits of `bitmap`.
fn count_valid(bitmap: &[u8], num_points: usize) -> usize {
    let full = num_points / 8;
    let whole: usize = bitmap[..full].iter().map(|b| b.count_ones() as usize).sum();
    let rest = num_points % 8;
    if rest == 0 {
        return whole;
    }
    let mask = !(0xFFu8 >> rest);
    whole + (bitmap[full] & mask).count_ones() as usize
}

/// Index of the valid cell at position `ordinal` in the packed stream.
fn nth_valid_cell(bitmap: Option<&[u8]>, num_points: usize, ordinal: usize) -> Option<usize> {
    match bitmap {
        None => Some(ordinal),
        Some(bm) => (0..num_points)
            .filter(|&i| bitmap_is_set(bm, i))
            .nth(ordinal),
    }
}
