//! Reflectivity color calibration.
//!
//! A [`ColorTable`] is an ascending list of exclusive upper bounds, each
//! with a color, plus an overflow color for values at or above the last
//! bound. A value takes the color of the first band whose bound it is
//! strictly below.

use serde::Serialize;

/// 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Most bands an indexed palette can address once the missing and overflow
/// entries are reserved.
pub const MAX_PALETTE_BANDS: usize = 254;

/// Fully transparent black, used for missing cells.
pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorBand {
    /// Values strictly below this bound (and at or above the previous one)
    /// take this band's color.
    pub upper_bound: f32,
    pub color: Rgba,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ColorTable {
    bands: &'static [ColorBand],
    overflow: Rgba,
}

impl ColorTable {
    pub const fn new(bands: &'static [ColorBand], overflow: Rgba) -> Self {
        Self { bands, overflow }
    }

    pub fn bands(&self) -> &'static [ColorBand] {
        self.bands
    }

    pub fn overflow(&self) -> Rgba {
        self.overflow
    }

    /// Index of the band `value` falls in; `bands().len()` means overflow.
    #[inline]
    fn band_index(&self, value: f32) -> usize {
        self.bands.partition_point(|band| band.upper_bound <= value)
    }

    /// Color for a physical value. NaN maps to [`TRANSPARENT`].
    #[inline]
    pub fn color_of(&self, value: f32) -> Rgba {
        if value.is_nan() {
            return TRANSPARENT;
        }
        self.bands
            .get(self.band_index(value))
            .map_or(self.overflow, |band| band.color)
    }

    /// Color for a possibly missing cell.
    #[inline]
    pub fn color_of_cell(&self, value: Option<f32>) -> Rgba {
        value.map_or(TRANSPARENT, |v| self.color_of(v))
    }

    /// Palette index for a cell, matching [`ColorTable::palette`].
    ///
    /// Index 0 is reserved for missing cells, bands follow in order and the
    /// overflow color is last. Tables with more than [`MAX_PALETTE_BANDS`]
    /// bands saturate at 255; [`ColorTable::fits_palette`] reports this.
    #[inline]
    pub fn palette_index(&self, value: Option<f32>) -> u8 {
        match value {
            Some(v) if !v.is_nan() => u8::try_from(self.band_index(v) + 1).unwrap_or(u8::MAX),
            _ => 0,
        }
    }

    /// Whether every band gets its own palette entry.
    pub fn fits_palette(&self) -> bool {
        self.bands.len() <= MAX_PALETTE_BANDS
    }

    /// Palette for indexed rendering: missing, each band, overflow.
    pub fn palette(&self) -> Vec<Rgba> {
        std::iter::once(TRANSPARENT)
            .chain(self.bands.iter().map(|band| band.color))
            .chain(std::iter::once(self.overflow))
            .collect()
    }
}

const REFLECTIVITY_BANDS: [ColorBand; 15] = [
    ColorBand {
        upper_bound: 5.0,
        color: TRANSPARENT,
    },
    ColorBand {
        upper_bound: 10.0,
        color: Rgba::new(4, 233, 231, 100),
    },
    ColorBand {
        upper_bound: 15.0,
        color: Rgba::new(1, 159, 244, 120),
    },
    ColorBand {
        upper_bound: 20.0,
        color: Rgba::new(3, 0, 244, 140),
    },
    ColorBand {
        upper_bound: 25.0,
        color: Rgba::new(2, 253, 2, 160),
    },
    ColorBand {
        upper_bound: 30.0,
        color: Rgba::new(1, 197, 1, 175),
    },
    ColorBand {
        upper_bound: 35.0,
        color: Rgba::new(0, 142, 0, 190),
    },
    ColorBand {
        upper_bound: 40.0,
        color: Rgba::new(253, 248, 2, 205),
    },
    ColorBand {
        upper_bound: 45.0,
        color: Rgba::new(229, 188, 0, 215),
    },
    ColorBand {
        upper_bound: 50.0,
        color: Rgba::new(253, 149, 0, 225),
    },
    ColorBand {
        upper_bound: 55.0,
        color: Rgba::new(253, 0, 0, 235),
    },
    ColorBand {
        upper_bound: 60.0,
        color: Rgba::new(212, 0, 0, 245),
    },
    ColorBand {
        upper_bound: 65.0,
        color: Rgba::new(188, 0, 0, 255),
    },
    ColorBand {
        upper_bound: 70.0,
        color: Rgba::new(248, 0, 253, 255),
    },
    ColorBand {
        upper_bound: 75.0,
        color: Rgba::new(152, 84, 198, 255),
    },
];

/// Radar reflectivity (dBZ) calibration in 5 dBZ steps. Echoes below
/// 5 dBZ are not drawn; 75 dBZ and above use the overflow color.
pub const REFLECTIVITY: ColorTable =
    ColorTable::new(&REFLECTIVITY_BANDS, Rgba::new(253, 253, 253, 255));
