//! Bounds-checked cursors over GRIB2 byte and bit streams.
//!
//! All multi-byte fields in GRIB2 are big-endian. Signed fields use
//! sign-magnitude encoding (the most significant bit is the sign, the rest
//! the magnitude), not two's complement.

use crate::error::{Grib2Error, Grib2Result};

/// Decode a sign-magnitude 32-bit integer.
pub fn sign_magnitude_i32(raw: u32) -> i32 {
    let magnitude = (raw & 0x7FFF_FFFF) as i32;
    if raw & 0x8000_0000 != 0 {
        -magnitude
    } else {
        magnitude
    }
}

/// Decode a sign-magnitude 16-bit integer.
pub fn sign_magnitude_i16(raw: u16) -> i16 {
    let magnitude = (raw & 0x7FFF) as i16;
    if raw & 0x8000 != 0 {
        -magnitude
    } else {
        magnitude
    }
}

/// Forward-only reader over a byte slice.
///
/// `context` names the structure being read so a truncation error says
/// where the message ran out.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
    context: &'static str,
}

impl<'a> ByteCursor<'a> {
    pub fn new(data: &'a [u8], context: &'static str) -> Self {
        Self {
            data,
            pos: 0,
            context,
        }
    }

    /// Current position relative to the start of the slice.
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn take(&mut self, n: usize) -> Grib2Result<&'a [u8]> {
        if self.remaining() < n {
            return Err(Grib2Error::TruncatedInput {
                context: self.context,
                needed: n,
                available: self.remaining(),
            });
        }
        let bytes = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    fn take_array<const N: usize>(&mut self) -> Grib2Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub fn skip(&mut self, n: usize) -> Grib2Result<()> {
        self.take(n).map(|_| ())
    }

    pub fn read_bytes(&mut self, n: usize) -> Grib2Result<&'a [u8]> {
        self.take(n)
    }

    pub fn read_u8(&mut self) -> Grib2Result<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn read_u16(&mut self) -> Grib2Result<u16> {
        self.take_array().map(u16::from_be_bytes)
    }

    pub fn read_u32(&mut self) -> Grib2Result<u32> {
        self.take_array().map(u32::from_be_bytes)
    }

    pub fn read_u64(&mut self) -> Grib2Result<u64> {
        self.take_array().map(u64::from_be_bytes)
    }

    /// Sign-magnitude 16-bit integer.
    pub fn read_i16(&mut self) -> Grib2Result<i16> {
        self.read_u16().map(sign_magnitude_i16)
    }

    /// Sign-magnitude 32-bit integer.
    pub fn read_i32(&mut self) -> Grib2Result<i32> {
        self.read_u32().map(sign_magnitude_i32)
    }

    /// IEEE 754 single precision float.
    pub fn read_f32(&mut self) -> Grib2Result<f32> {
        self.take_array().map(f32::from_be_bytes)
    }
}

/// MSB-first bit reader used for packed data values.
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    data: &'a [u8],
    bit_pos: usize,
}

impl<'a> BitReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, bit_pos: 0 }
    }

    /// Bits consumed so far.
    pub fn position(&self) -> usize {
        self.bit_pos
    }

    pub fn total_bits(&self) -> usize {
        self.data.len() * 8
    }

    /// Read `width` bits (at most 32) as a big-endian unsigned integer.
    ///
    /// Returns `None` without moving the cursor if fewer than `width` bits
    /// remain. A width of zero always succeeds and consumes nothing.
    pub fn read_bits(&mut self, width: usize) -> Option<u32> {
        if width > 32 {
            return None;
        }
        let end = self.bit_pos.checked_add(width)?;
        if end > self.total_bits() {
            return None;
        }

        let mut acc: u64 = 0;
        let mut pos = self.bit_pos;
        let mut remaining = width;
        while remaining > 0 {
            let byte = self.data[pos / 8];
            let available = 8 - pos % 8;
            let take = available.min(remaining);
            let shift = available - take;
            let mask = (1u16 << take) - 1;
            acc = (acc << take) | u64::from((u16::from(byte) >> shift) & mask);
            pos += take;
            remaining -= take;
        }

        self.bit_pos = end;
        Some(acc as u32)
    }
}
