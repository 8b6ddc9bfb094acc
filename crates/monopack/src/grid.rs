//! Pixel and bit grids plus the threshold quantizer shared by both pipelines.

use crate::error::{AssetError, Result};

/// Single-channel sample grid (intensity or coverage, 0-255), row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelGrid {
    width: usize,
    height: usize,
    samples: Vec<u8>,
}

impl PixelGrid {
    pub fn filled(width: usize, height: usize, value: u8) -> Self {
        Self {
            width,
            height,
            samples: vec![value; width * height],
        }
    }

    pub fn from_samples(width: usize, height: usize, samples: Vec<u8>) -> Result<Self> {
        if samples.len() != width * height {
            return Err(AssetError::InvalidGrid(format!(
                "{} samples for a {width}x{height} grid",
                samples.len()
            )));
        }
        Ok(Self {
            width,
            height,
            samples,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.samples[y * self.width + x]
    }

    pub fn samples(&self) -> &[u8] {
        &self.samples
    }

    pub(crate) fn set(&mut self, x: usize, y: usize, value: u8) {
        self.samples[y * self.width + x] = value;
    }
}

/// Which side of the threshold counts as foreground.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Polarity {
    /// Samples above the threshold are on (font coverage: drawn strokes).
    #[default]
    Bright,
    /// Samples at or below the threshold are on (dark ink on white paper).
    Dark,
}

pub const DEFAULT_THRESHOLD: u8 = 128;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Quantizer {
    pub threshold: u8,
    pub polarity: Polarity,
}

impl Default for Quantizer {
    fn default() -> Self {
        Self::glyph(DEFAULT_THRESHOLD)
    }
}

impl Quantizer {
    pub const fn glyph(threshold: u8) -> Self {
        Self {
            threshold,
            polarity: Polarity::Bright,
        }
    }

    pub const fn icon(threshold: u8) -> Self {
        Self {
            threshold,
            polarity: Polarity::Dark,
        }
    }

    pub fn is_on(&self, sample: u8) -> bool {
        match self.polarity {
            Polarity::Bright => sample > self.threshold,
            Polarity::Dark => sample <= self.threshold,
        }
    }

    pub fn quantize(&self, pixels: &PixelGrid) -> BitGrid {
        BitGrid::from_fn(pixels.width(), pixels.height(), |x, y| {
            self.is_on(pixels.get(x, y))
        })
    }
}

/// Immutable boolean grid, `true` = foreground.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BitGrid {
    width: usize,
    height: usize,
    bits: Vec<bool>,
}

impl BitGrid {
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> bool) -> Self {
        let mut bits = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                bits.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            bits,
        }
    }

    pub fn filled(width: usize, height: usize, on: bool) -> Self {
        Self {
            width,
            height,
            bits: vec![on; width * height],
        }
    }

    /// Build a grid from text rows where `#` marks an on pixel.
    ///
    /// All rows must have the same length.
    pub fn from_rows(rows: &[&str]) -> Result<Self> {
        let width = rows.first().map(|r| r.chars().count()).unwrap_or(0);
        let mut bits = Vec::with_capacity(width * rows.len());
        for (y, row) in rows.iter().enumerate() {
            if row.chars().count() != width {
                return Err(AssetError::InvalidGrid(format!(
                    "row {y} has {} columns, expected {width}",
                    row.chars().count()
                )));
            }
            bits.extend(row.chars().map(|c| c == '#'));
        }
        Ok(Self {
            width,
            height: rows.len(),
            bits,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, x: usize, y: usize) -> bool {
        self.bits[y * self.width + x]
    }

    pub fn count_on(&self) -> usize {
        self.bits.iter().filter(|b| **b).count()
    }

    pub fn rows(&self) -> impl Iterator<Item = &[bool]> {
        // chunks() rejects a zero chunk size
        self.bits.chunks(self.width.max(1))
    }

    pub fn to_ascii(&self) -> String {
        let mut out = String::with_capacity((self.width + 1) * self.height);
        for row in self.rows() {
            out.extend(row.iter().map(|on| if *on { '#' } else { '.' }));
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn polarities_split_at_threshold() {
        let glyph = Quantizer::glyph(128);
        let icon = Quantizer::icon(128);
        assert!(!glyph.is_on(128));
        assert!(glyph.is_on(129));
        assert!(icon.is_on(128));
        assert!(!icon.is_on(129));
    }

    #[test]
    fn quantize_keeps_dimensions() {
        let pixels = PixelGrid::from_samples(3, 2, vec![0, 255, 0, 255, 0, 200]).unwrap();
        let bits = Quantizer::glyph(128).quantize(&pixels);
        assert_eq!((bits.width(), bits.height()), (3, 2));
        assert_eq!(bits.to_ascii(), ".#.\n#.#\n");
    }

    #[test]
    fn from_samples_rejects_wrong_length() {
        assert!(matches!(
            PixelGrid::from_samples(4, 4, vec![0; 15]),
            Err(AssetError::InvalidGrid(_))
        ));
    }

    #[test]
    fn from_rows_rejects_ragged_input() {
        assert!(BitGrid::from_rows(&["##", "#"]).is_err());
        let grid = BitGrid::from_rows(&["#.", ".#"]).unwrap();
        assert_eq!(grid.count_on(), 2);
    }
}
