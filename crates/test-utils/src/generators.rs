//! Synthetic GRIB2 message generation.
//!
//! Builds structurally valid single-field messages (sections 0-8) on a
//! lat/lon grid with simple packing. Packing parameters and packed bits can
//! be set explicitly so tests can check the unpacking formula and bitmap
//! handling against known inputs.

/// Encode a signed value in GRIB2 sign-magnitude form.
pub fn sign_magnitude_i32(value: i32) -> u32 {
    if value < 0 {
        value.unsigned_abs() | 0x8000_0000
    } else {
        value as u32
    }
}

/// Encode a signed 16-bit value in GRIB2 sign-magnitude form.
pub fn sign_magnitude_i16(value: i16) -> u16 {
    if value < 0 {
        value.unsigned_abs() | 0x8000
    } else {
        value as u16
    }
}

/// Pack unsigned integers MSB-first using `width` bits each, padding the
/// final byte with zeros.
pub fn pack_bits(values: &[u32], width: u8) -> Vec<u8> {
    let width = width as usize;
    let total_bits = values.len() * width;
    let mut out = vec![0u8; total_bits.div_ceil(8)];
    let mut bit = 0;
    for &value in values {
        for i in (0..width).rev() {
            if (value >> i) & 1 == 1 {
                out[bit / 8] |= 0x80 >> (bit % 8);
            }
            bit += 1;
        }
    }
    out
}

/// Build an MSB-first bitmap where `true` marks a valid cell.
pub fn bitmap_from_mask(mask: &[bool]) -> Vec<u8> {
    let mut out = vec![0u8; mask.len().div_ceil(8)];
    for (i, valid) in mask.iter().enumerate() {
        if *valid {
            out[i / 8] |= 0x80 >> (i % 8);
        }
    }
    out
}

/// Build a minimal GRIB2 message with the specified parameters
#[derive(Debug, Clone)]
pub struct Grib2Builder {
    discipline: u8,
    edition: u8,
    center: u16,
    year: u16,
    month: u8,
    day: u8,
    hour: u8,
    minute: u8,
    second: u8,
    local_use: Option<Vec<u8>>,
    // Grid definition
    grid_template: u16,
    ni: u32,
    nj: u32,
    la1: i32, // microdegrees
    lo1: i32,
    la2: i32,
    lo2: i32,
    di: u32,
    dj: u32,
    scanning_mode: u8,
    // Product definition
    param_category: u8,
    param_number: u8,
    // Data representation
    packing_template: u16,
    declared_points: Option<u32>,
    reference_value: f32,
    binary_scale: i16,
    decimal_scale: i16,
    bit_width: u8,
    // Bitmap and data
    bitmap_indicator: u8,
    bitmap: Vec<u8>,
    data: Vec<u8>,
    end_marker: bool,
}

impl Grib2Builder {
    /// A grid laid out like the MRMS CONUS domain (0.01 degree spacing,
    /// 0-360 longitudes) but with the requested dimensions. Every cell
    /// decodes to the reference value until data is supplied.
    pub fn mrms(ni: u32, nj: u32) -> Self {
        Self {
            discipline: 209,
            edition: 2,
            center: 161,
            year: 2025,
            month: 6,
            day: 14,
            hour: 18,
            minute: 42,
            second: 36,
            local_use: None,
            grid_template: 0,
            ni,
            nj,
            la1: 54_995_000,
            lo1: 230_005_000,
            la2: 54_995_000 - (nj.saturating_sub(1) as i32) * 10_000,
            lo2: 230_005_000 + (ni.saturating_sub(1) as i32) * 10_000,
            di: 10_000,
            dj: 10_000,
            scanning_mode: 0,
            param_category: 0,
            param_number: 16,
            packing_template: 0,
            declared_points: None,
            reference_value: 0.0,
            binary_scale: 0,
            decimal_scale: 0,
            bit_width: 0,
            bitmap_indicator: 255,
            bitmap: Vec::new(),
            data: Vec::new(),
            end_marker: true,
        }
    }

    pub fn with_reference_time(
        mut self,
        year: u16,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
    ) -> Self {
        self.year = year;
        self.month = month;
        self.day = day;
        self.hour = hour;
        self.minute = minute;
        self.second = 0;
        self
    }

    pub fn with_edition(mut self, edition: u8) -> Self {
        self.edition = edition;
        self
    }

    pub fn with_local_use(mut self, payload: Vec<u8>) -> Self {
        self.local_use = Some(payload);
        self
    }

    /// Corners in microdegrees.
    pub fn with_corners(mut self, la1: i32, lo1: i32, la2: i32, lo2: i32) -> Self {
        self.la1 = la1;
        self.lo1 = lo1;
        self.la2 = la2;
        self.lo2 = lo2;
        self
    }

    pub fn with_grid_template(mut self, template: u16) -> Self {
        self.grid_template = template;
        self
    }

    pub fn with_packing_template(mut self, template: u16) -> Self {
        self.packing_template = template;
        self
    }

    /// Override the data point count written to section 5.
    pub fn with_declared_points(mut self, points: u32) -> Self {
        self.declared_points = Some(points);
        self
    }

    /// Set R, E and D.
    pub fn with_packing(
        mut self,
        reference_value: f32,
        binary_scale: i16,
        decimal_scale: i16,
    ) -> Self {
        self.reference_value = reference_value;
        self.binary_scale = binary_scale;
        self.decimal_scale = decimal_scale;
        self
    }

    /// Pack raw integers at the given width into section 7.
    pub fn with_packed_values(mut self, values: &[u32], bit_width: u8) -> Self {
        self.bit_width = bit_width;
        self.data = pack_bits(values, bit_width);
        self
    }

    /// Set section 7 payload and bit width verbatim.
    pub fn with_raw_data(mut self, data: Vec<u8>, bit_width: u8) -> Self {
        self.bit_width = bit_width;
        self.data = data;
        self
    }

    pub fn with_bitmap(mut self, mask: &[bool]) -> Self {
        self.bitmap_indicator = 0;
        self.bitmap = bitmap_from_mask(mask);
        self
    }

    /// Set the bitmap indicator and bitmap bytes verbatim.
    pub fn with_raw_bitmap(mut self, indicator: u8, bitmap: Vec<u8>) -> Self {
        self.bitmap_indicator = indicator;
        self.bitmap = bitmap;
        self
    }

    /// Encode physical values at 0.1 precision (D = 1). `None` cells are
    /// masked out with a bitmap when any are present.
    pub fn with_values(self, values: &[Option<f32>]) -> Self {
        let scaled: Vec<Option<i64>> = values
            .iter()
            .map(|v| v.map(|v| (f64::from(v) * 10.0).round() as i64))
            .collect();
        let valid: Vec<i64> = scaled.iter().flatten().copied().collect();
        let min = valid.iter().copied().min().unwrap_or(0);
        let max = valid.iter().copied().max().unwrap_or(0);
        let range = (max - min) as u64;
        let bit_width = if range == 0 {
            0
        } else {
            (64 - range.leading_zeros()) as u8
        };
        let packed: Vec<u32> = valid.iter().map(|v| (v - min) as u32).collect();

        let builder = self
            .with_packing(min as f32, 0, 1)
            .with_packed_values(&packed, bit_width);
        if values.iter().any(|v| v.is_none()) {
            let mask: Vec<bool> = values.iter().map(|v| v.is_some()).collect();
            builder.with_bitmap(&mask)
        } else {
            builder
        }
    }

    pub fn without_end_marker(mut self) -> Self {
        self.end_marker = false;
        self
    }

    /// Build the complete GRIB2 message bytes
    pub fn build(&self) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(&self.build_section1());
        if let Some(local) = &self.local_use {
            body.extend_from_slice(&section(2, local));
        }
        body.extend_from_slice(&self.build_section3());
        body.extend_from_slice(&self.build_section4());
        body.extend_from_slice(&self.build_section5());
        body.extend_from_slice(&self.build_section6());
        body.extend_from_slice(&section(7, &self.data));

        let end = if self.end_marker { 4 } else { 0 };
        let message_length = (16 + body.len() + end) as u64;

        let mut message = Vec::with_capacity(message_length as usize);
        message.extend_from_slice(b"GRIB");
        message.extend_from_slice(&[0, 0]);
        message.push(self.discipline);
        message.push(self.edition);
        message.extend_from_slice(&message_length.to_be_bytes());
        message.extend_from_slice(&body);
        if self.end_marker {
            message.extend_from_slice(b"7777");
        }
        message
    }

    fn build_section1(&self) -> Vec<u8> {
        let mut p = Vec::new();
        p.extend_from_slice(&self.center.to_be_bytes());
        p.extend_from_slice(&0u16.to_be_bytes()); // Sub-center
        p.push(2); // Master table version
        p.push(1); // Local table version
        p.push(0); // Significance of reference time (analysis)
        p.extend_from_slice(&self.year.to_be_bytes());
        p.extend_from_slice(&[self.month, self.day, self.hour, self.minute, self.second]);
        p.push(0); // Production status (operational)
        p.push(0); // Type of data (analysis)
        section(1, &p)
    }

    fn build_section3(&self) -> Vec<u8> {
        let mut p = Vec::new();
        p.push(0); // Source of grid definition
        p.extend_from_slice(&(self.ni * self.nj).to_be_bytes());
        p.push(0); // Octets for optional list
        p.push(0); // Interpretation of optional list
        p.extend_from_slice(&self.grid_template.to_be_bytes());

        p.push(6); // Shape of Earth
        p.push(0);
        p.extend_from_slice(&0u32.to_be_bytes());
        p.push(0);
        p.extend_from_slice(&0u32.to_be_bytes());
        p.push(0);
        p.extend_from_slice(&0u32.to_be_bytes());
        p.extend_from_slice(&self.ni.to_be_bytes());
        p.extend_from_slice(&self.nj.to_be_bytes());
        p.extend_from_slice(&0u32.to_be_bytes()); // Basic angle
        p.extend_from_slice(&0xFFFF_FFFFu32.to_be_bytes()); // Subdivisions
        p.extend_from_slice(&sign_magnitude_i32(self.la1).to_be_bytes());
        p.extend_from_slice(&sign_magnitude_i32(self.lo1).to_be_bytes());
        p.push(48); // Resolution and component flags
        p.extend_from_slice(&sign_magnitude_i32(self.la2).to_be_bytes());
        p.extend_from_slice(&sign_magnitude_i32(self.lo2).to_be_bytes());
        p.extend_from_slice(&self.di.to_be_bytes());
        p.extend_from_slice(&self.dj.to_be_bytes());
        p.push(self.scanning_mode);
        section(3, &p)
    }

    fn build_section4(&self) -> Vec<u8> {
        let mut p = Vec::new();
        p.extend_from_slice(&0u16.to_be_bytes()); // Number of coordinate values
        p.extend_from_slice(&0u16.to_be_bytes()); // Template 4.0
        p.push(self.param_category);
        p.push(self.param_number);
        p.push(0); // Type of generating process
        p.push(0); // Background generating process
        p.push(0); // Analysis or forecast process
        p.extend_from_slice(&0u16.to_be_bytes()); // Hours of cutoff
        p.push(0); // Minutes of cutoff
        p.push(0); // Time range unit (minutes)
        p.extend_from_slice(&0u32.to_be_bytes()); // Forecast time
        p.push(102); // Type of first fixed surface
        p.push(0);
        p.extend_from_slice(&500u32.to_be_bytes());
        p.push(255); // Type of second fixed surface
        p.push(0);
        p.extend_from_slice(&0u32.to_be_bytes());
        section(4, &p)
    }

    fn build_section5(&self) -> Vec<u8> {
        let points = self.declared_points.unwrap_or(self.ni * self.nj);
        let mut p = Vec::new();
        p.extend_from_slice(&points.to_be_bytes());
        p.extend_from_slice(&self.packing_template.to_be_bytes());
        p.extend_from_slice(&self.reference_value.to_be_bytes());
        p.extend_from_slice(&sign_magnitude_i16(self.binary_scale).to_be_bytes());
        p.extend_from_slice(&sign_magnitude_i16(self.decimal_scale).to_be_bytes());
        p.push(self.bit_width);
        p.push(0); // Original field type (floating point)
        section(5, &p)
    }

    fn build_section6(&self) -> Vec<u8> {
        let mut p = vec![self.bitmap_indicator];
        p.extend_from_slice(&self.bitmap);
        section(6, &p)
    }
}

/// Wrap a payload with the 5-byte section header.
pub fn section(number: u8, payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(payload.len() + 5);
    out.extend_from_slice(&((payload.len() + 5) as u32).to_be_bytes());
    out.push(number);
    out.extend_from_slice(payload);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_bits() {
        assert_eq!(pack_bits(&[0b10, 0b11, 0b01, 0b01], 2), vec![0b1011_0101]);
        assert_eq!(pack_bits(&[0xABC, 0xDEF], 12), vec![0xAB, 0xCD, 0xEF]);
        assert_eq!(pack_bits(&[1], 3), vec![0b0010_0000]);
    }

    #[test]
    fn test_bitmap_from_mask() {
        let mask = [true, false, true, true, false, false, false, false, true];
        assert_eq!(bitmap_from_mask(&mask), vec![0b1011_0000, 0b1000_0000]);
    }

    #[test]
    fn test_sign_magnitude() {
        assert_eq!(sign_magnitude_i32(-1), 0x8000_0001);
        assert_eq!(sign_magnitude_i32(5), 5);
        assert_eq!(sign_magnitude_i16(-2), 0x8002);
    }

    #[test]
    fn test_message_framing() {
        let message = Grib2Builder::mrms(4, 3).build();
        assert_eq!(&message[0..4], b"GRIB");
        assert_eq!(message[7], 2);
        let length = u64::from_be_bytes(message[8..16].try_into().unwrap());
        assert_eq!(length as usize, message.len());
        assert_eq!(&message[message.len() - 4..], b"7777");
    }
}
