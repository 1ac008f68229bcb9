//! Section 1: Identification Section.

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::{Grib2Error, Grib2Result};
use crate::reader::ByteCursor;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identification {
    pub center: u16,
    pub sub_center: u16,
    pub master_table_version: u8,
    pub local_table_version: u8,
    pub significance_of_reference_time: u8,
    pub reference_time: DateTime<Utc>,
    pub production_status: u8,
    pub data_type: u8,
}

/// Parse the payload of Section 1.
pub fn parse_identification(payload: &[u8]) -> Grib2Result<Identification> {
    let mut cursor = ByteCursor::new(payload, "identification section");

    let center = cursor.read_u16()?;
    let sub_center = cursor.read_u16()?;
    let master_table_version = cursor.read_u8()?;
    let local_table_version = cursor.read_u8()?;
    let significance_of_reference_time = cursor.read_u8()?;

    let year = cursor.read_u16()?;
    let month = cursor.read_u8()?;
    let day = cursor.read_u8()?;
    let hour = cursor.read_u8()?;
    let minute = cursor.read_u8()?;
    let second = cursor.read_u8()?;

    let production_status = cursor.read_u8()?;
    let data_type = cursor.read_u8()?;

    let reference_time = NaiveDate::from_ymd_opt(year as i32, month as u32, day as u32)
        .and_then(|date| date.and_hms_opt(hour as u32, minute as u32, second as u32))
        .ok_or_else(|| {
            Grib2Error::InvalidReferenceTime(format!(
                "{}-{:02}-{:02} {:02}:{:02}:{:02}",
                year, month, day, hour, minute, second
            ))
        })?;

    Ok(Identification {
        center,
        sub_center,
        master_table_version,
        local_table_version,
        significance_of_reference_time,
        reference_time: DateTime::<Utc>::from_naive_utc_and_offset(reference_time, Utc),
        production_status,
        data_type,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    fn payload(year: u16, month: u8, day: u8) -> Vec<u8> {
        let mut p = Vec::new();
        p.extend_from_slice(&161u16.to_be_bytes());
        p.extend_from_slice(&0u16.to_be_bytes());
        p.extend_from_slice(&[2, 1, 0]);
        p.extend_from_slice(&year.to_be_bytes());
        p.extend_from_slice(&[month, day, 18, 42, 36]);
        p.extend_from_slice(&[0, 1]);
        p
    }

    #[test]
    fn test_parse_identification() {
        let id = parse_identification(&payload(2025, 6, 14)).unwrap();
        assert_eq!(id.center, 161);
        assert_eq!(id.reference_time.year(), 2025);
        assert_eq!(id.reference_time.month(), 6);
        assert_eq!(id.reference_time.day(), 14);
        assert_eq!(id.reference_time.hour(), 18);
        assert_eq!(id.reference_time.minute(), 42);
        assert_eq!(id.reference_time.second(), 36);
        assert_eq!(id.data_type, 1);
    }

    #[test]
    fn test_invalid_date() {
        assert!(matches!(
            parse_identification(&payload(2025, 2, 30)),
            Err(Grib2Error::InvalidReferenceTime(_))
        ));
    }

    #[test]
    fn test_short_payload() {
        assert!(matches!(
            parse_identification(&payload(2025, 6, 14)[..8]),
            Err(Grib2Error::TruncatedInput { .. })
        ));
    }
}
