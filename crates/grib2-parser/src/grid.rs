//! Decoded grid values.

/// Dense row-major grid of decoded values in section 7 bit order.
///
/// Missing cells (masked out by the bitmap) are `None`. The grid is built
/// once per decode and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedGrid {
    width: usize,
    height: usize,
    values: Vec<Option<f32>>,
}

/// Summary of the valid cells of a grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridStats {
    pub valid: usize,
    pub missing: usize,
    pub min: Option<f32>,
    pub max: Option<f32>,
}

impl DecodedGrid {
    /// Wrap decoded values. Returns `None` if `values` does not hold exactly
    /// `width * height` cells.
    pub fn new(width: usize, height: usize, values: Vec<Option<f32>>) -> Option<Self> {
        (width.checked_mul(height)? == values.len()).then_some(Self {
            width,
            height,
            values,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[Option<f32>] {
        &self.values
    }

    /// Value at column `x`, row `y`; `None` when missing or out of range.
    pub fn get(&self, x: usize, y: usize) -> Option<f32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.values[y * self.width + x]
    }

    pub fn stats(&self) -> GridStats {
        let mut stats = GridStats {
            valid: 0,
            missing: 0,
            min: None,
            max: None,
        };
        for value in &self.values {
            match value {
                Some(v) => {
                    stats.valid += 1;
                    stats.min = Some(stats.min.map_or(*v, |m| m.min(*v)));
                    stats.max = Some(stats.max.map_or(*v, |m| m.max(*v)));
                }
                None => stats.missing += 1,
            }
        }
        stats
    }
}
