//! GRIB2 section walking.
//!
//! A message is a 16-byte indicator followed by length-prefixed sections,
//! each starting with a 4-byte big-endian length and a 1-byte section
//! number. This module locates every section of a single-field message and
//! decodes the small fixed-layout sections (0, 1, 4, 6, 7). Sections 3 and 5
//! are template-driven and live in [`crate::templates`].

mod identification;

pub use identification::{parse_identification, Identification};

use crate::error::{Grib2Error, Grib2Result};
use crate::reader::ByteCursor;
use tracing::debug;

/// ASCII magic at the start of every message.
pub const GRIB_MAGIC: &[u8; 4] = b"GRIB";
/// The only edition this decoder understands.
pub const SUPPORTED_EDITION: u8 = 2;
/// Size of section 0.
pub const INDICATOR_LENGTH: usize = 16;
/// Section 8 end marker.
pub const END_MARKER: &[u8; 4] = b"7777";
/// Length field plus section number.
const SECTION_HEADER_LENGTH: usize = 5;

/// Bitmap indicator value meaning "a bitmap follows in this section".
pub const BITMAP_PRESENT: u8 = 0;
/// Bitmap indicator value meaning "no bitmap applies".
pub const BITMAP_ABSENT: u8 = 255;

/// Section 0: Indicator Section (16 bytes)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Indicator {
    pub discipline: u8,
    pub edition: u8,
    pub message_length: u64,
}

/// A located section: where its header starts and where its payload lies.
///
/// Offsets are absolute within the message buffer. The payload excludes the
/// 5-byte header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawSection {
    pub number: u8,
    pub offset: usize,
    pub payload_start: usize,
    pub payload_end: usize,
}

impl RawSection {
    /// Offset of the byte following this section.
    pub fn next_offset(&self) -> usize {
        self.payload_end
    }

    pub fn payload<'a>(&self, data: &'a [u8]) -> &'a [u8] {
        &data[self.payload_start..self.payload_end]
    }

    pub fn payload_len(&self) -> usize {
        self.payload_end - self.payload_start
    }
}

/// Offsets of every section of one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionLayout {
    pub indicator: Indicator,
    pub identification: RawSection,
    pub local_use: Option<RawSection>,
    pub grid_definition: RawSection,
    pub product_definition: RawSection,
    pub data_representation: RawSection,
    pub bitmap: RawSection,
    pub data: RawSection,
}

/// Section 4: Product Definition Section (template-independent prefix)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDefinition {
    pub template: u16,
    pub parameter_category: u8,
    pub parameter_number: u8,
}

/// Parse Section 0 (Indicator) from start of message
pub fn parse_indicator(data: &[u8]) -> Grib2Result<Indicator> {
    let mut cursor = ByteCursor::new(data, "indicator section");
    let magic = cursor.read_bytes(4)?;
    if magic != GRIB_MAGIC {
        return Err(Grib2Error::MalformedHeader(format!(
            "invalid magic bytes {:02x?}",
            magic
        )));
    }
    // Octets 5-6 are reserved
    cursor.skip(2)?;
    let discipline = cursor.read_u8()?;
    let edition = cursor.read_u8()?;
    let message_length = cursor.read_u64()?;

    if edition != SUPPORTED_EDITION {
        return Err(Grib2Error::UnsupportedEdition(edition));
    }

    Ok(Indicator {
        discipline,
        edition,
        message_length,
    })
}

/// Read the section header at `offset`.
///
/// Fails with `TruncatedInput` when fewer than five bytes remain and with
/// `InvalidSectionLength` when the declared length cannot describe a section
/// that fits in the rest of the buffer.
pub fn read_section(data: &[u8], offset: usize) -> Grib2Result<RawSection> {
    let remaining = data.len().saturating_sub(offset);
    let mut cursor = ByteCursor::new(&data[offset.min(data.len())..], "section header");
    let length = cursor.read_u32()?;
    let number = cursor.read_u8()?;

    if (length as usize) < SECTION_HEADER_LENGTH || length as usize > remaining {
        return Err(Grib2Error::InvalidSectionLength {
            offset,
            length,
            remaining,
        });
    }

    Ok(RawSection {
        number,
        offset,
        payload_start: offset + SECTION_HEADER_LENGTH,
        payload_end: offset + length as usize,
    })
}

fn expect_section(data: &[u8], offset: usize, expected: u8) -> Grib2Result<RawSection> {
    let section = read_section(data, offset)?;
    if section.number != expected {
        return Err(Grib2Error::UnexpectedSection {
            expected,
            found: section.number,
        });
    }
    debug!(
        section = section.number,
        offset = section.offset,
        length = section.payload_len() + SECTION_HEADER_LENGTH,
        "Located section"
    );
    Ok(section)
}

/// Walk sections 1 through 7 of the message at the start of `data`.
///
/// Section 2 (local use) is optional and skipped when present. The end
/// marker is checked when bytes remain after section 7.
pub fn locate_sections(data: &[u8]) -> Grib2Result<SectionLayout> {
    let indicator = parse_indicator(data)?;

    if indicator.message_length > data.len() as u64 {
        return Err(Grib2Error::TruncatedInput {
            context: "message",
            needed: usize::try_from(indicator.message_length).unwrap_or(usize::MAX),
            available: data.len(),
        });
    }
    let data = &data[..indicator.message_length as usize];

    let identification = expect_section(data, INDICATOR_LENGTH, 1)?;

    let next = read_section(data, identification.next_offset())?;
    let (local_use, grid_definition) = match next.number {
        2 => (Some(next), expect_section(data, next.next_offset(), 3)?),
        3 => (None, next),
        found => return Err(Grib2Error::UnexpectedSection { expected: 3, found }),
    };

    let product_definition = expect_section(data, grid_definition.next_offset(), 4)?;
    let data_representation = expect_section(data, product_definition.next_offset(), 5)?;
    let bitmap = expect_section(data, data_representation.next_offset(), 6)?;
    let data_section = expect_section(data, bitmap.next_offset(), 7)?;

    let tail = &data[data_section.next_offset()..];
    if !tail.is_empty() && !tail.starts_with(END_MARKER) {
        return Err(Grib2Error::MalformedHeader(format!(
            "expected end marker after section 7, found {:02x?}",
            &tail[..tail.len().min(4)]
        )));
    }

    Ok(SectionLayout {
        indicator,
        identification,
        local_use,
        grid_definition,
        product_definition,
        data_representation,
        bitmap,
        data: data_section,
    })
}

/// Parse the template-independent prefix of Section 4.
pub fn parse_product_definition(payload: &[u8]) -> Grib2Result<ProductDefinition> {
    let mut cursor = ByteCursor::new(payload, "product definition section");
    // Number of coordinate values after the template
    cursor.skip(2)?;
    let template = cursor.read_u16()?;
    let parameter_category = cursor.read_u8()?;
    let parameter_number = cursor.read_u8()?;

    Ok(ProductDefinition {
        template,
        parameter_category,
        parameter_number,
    })
}

/// Parse Section 6 and return the bitmap bits, or `None` when no bitmap
/// applies to this field.
pub fn parse_bitmap(payload: &[u8]) -> Grib2Result<Option<&[u8]>> {
    let mut cursor = ByteCursor::new(payload, "bitmap section");
    match cursor.read_u8()? {
        BITMAP_PRESENT => Ok(Some(&payload[1..])),
        BITMAP_ABSENT => Ok(None),
        other => Err(Grib2Error::UnsupportedBitmapIndicator(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indicator(edition: u8, length: u64) -> Vec<u8> {
        let mut data = b"GRIB".to_vec();
        data.extend_from_slice(&[0, 0, 209, edition]);
        data.extend_from_slice(&length.to_be_bytes());
        data
    }

    #[test]
    fn test_parse_indicator() {
        let data = indicator(2, 1234);
        let parsed = parse_indicator(&data).unwrap();
        assert_eq!(parsed.discipline, 209);
        assert_eq!(parsed.edition, 2);
        assert_eq!(parsed.message_length, 1234);
    }

    #[test]
    fn test_parse_indicator_bad_magic() {
        let mut data = indicator(2, 16);
        data[0] = b'X';
        assert!(matches!(
            parse_indicator(&data),
            Err(Grib2Error::MalformedHeader(_))
        ));
    }

    #[test]
    fn test_parse_indicator_edition_one() {
        let data = indicator(1, 16);
        assert_eq!(
            parse_indicator(&data),
            Err(Grib2Error::UnsupportedEdition(1))
        );
    }

    #[test]
    fn test_parse_indicator_short_buffer() {
        let data = indicator(2, 16);
        assert!(matches!(
            parse_indicator(&data[..10]),
            Err(Grib2Error::TruncatedInput { .. })
        ));
    }

    #[test]
    fn test_read_section() {
        let data = [0, 0, 0, 7, 6, 0xAA, 0xBB, 0xFF];
        let section = read_section(&data, 0).unwrap();
        assert_eq!(section.number, 6);
        assert_eq!(section.payload(&data), &[0xAA, 0xBB]);
        assert_eq!(section.next_offset(), 7);
    }

    #[test]
    fn test_read_section_truncated_header() {
        let data = [0, 0, 0, 7];
        assert!(matches!(
            read_section(&data, 0),
            Err(Grib2Error::TruncatedInput { .. })
        ));
        assert!(matches!(
            read_section(&data, 10),
            Err(Grib2Error::TruncatedInput { .. })
        ));
    }

    #[test]
    fn test_read_section_zero_length() {
        let data = [0, 0, 0, 0, 3, 0, 0];
        assert!(matches!(
            read_section(&data, 0),
            Err(Grib2Error::InvalidSectionLength { length: 0, .. })
        ));
    }

    #[test]
    fn test_read_section_length_exceeds_buffer() {
        let data = [0, 0, 0, 9, 3, 0, 0];
        assert_eq!(
            read_section(&data, 0),
            Err(Grib2Error::InvalidSectionLength {
                offset: 0,
                length: 9,
                remaining: 7
            })
        );
    }

    #[test]
    fn test_parse_bitmap_indicators() {
        assert_eq!(parse_bitmap(&[255]).unwrap(), None);
        assert_eq!(parse_bitmap(&[0, 0xF0]).unwrap(), Some(&[0xF0][..]));
        assert_eq!(
            parse_bitmap(&[254]),
            Err(Grib2Error::UnsupportedBitmapIndicator(254))
        );
    }

    #[test]
    fn test_parse_product_definition() {
        let payload = [0, 0, 0, 0, 209, 16, 2];
        let product = parse_product_definition(&payload).unwrap();
        assert_eq!(product.template, 0);
        assert_eq!(product.parameter_category, 209);
        assert_eq!(product.parameter_number, 16);
    }
}
