//! Bit packing of [`BitGrid`]s into the firmware's scan order.
//!
//! Both modes store rows top to bottom, MSB first, with the left column in
//! the highest-order bit of the first byte of its row. A set bit is a
//! foreground pixel.

use crate::{
    error::{AssetError, Result},
    grid::BitGrid,
};

/// Width and height of a glyph cell in [`PackMode::Fixed16`].
pub const GLYPH_CELL: usize = 16;
/// Packed size of one glyph cell.
pub const GLYPH_MASK_LEN: usize = GLYPH_CELL / 8 * GLYPH_CELL;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PackMode {
    /// 16x16 glyph cell, two bytes per row, 32 bytes total.
    Fixed16,
    /// Any width; each row starts on a fresh byte and unused low bits stay zero.
    #[default]
    RowPadded,
}

impl PackMode {
    pub fn stride(self, width: usize) -> usize {
        width.div_ceil(8)
    }

    pub fn packed_len(self, width: usize, height: usize) -> usize {
        self.stride(width) * height
    }

    fn check_dimensions(self, width: usize, height: usize) -> Result<()> {
        if self == PackMode::Fixed16 && (width != GLYPH_CELL || height != GLYPH_CELL) {
            return Err(AssetError::InvalidGrid(format!(
                "fixed 16x16 packing got a {width}x{height} grid"
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PackedBitmap {
    mode: PackMode,
    width: usize,
    height: usize,
    bytes: Vec<u8>,
}

pub fn pack(grid: &BitGrid, mode: PackMode) -> Result<PackedBitmap> {
    let (width, height) = (grid.width(), grid.height());
    mode.check_dimensions(width, height)?;
    let stride = mode.stride(width);
    let mut bytes = vec![0u8; stride * height];
    for (y, row) in grid.rows().enumerate() {
        let line = &mut bytes[y * stride..(y + 1) * stride];
        for (x, on) in row.iter().enumerate() {
            if *on {
                line[x / 8] |= 0x80 >> (x % 8);
            }
        }
    }
    Ok(PackedBitmap {
        mode,
        width,
        height,
        bytes,
    })
}

impl PackedBitmap {
    /// Wrap raw packed bytes whose dimensions are known out of band.
    pub fn from_bytes(bytes: Vec<u8>, width: usize, height: usize, mode: PackMode) -> Result<Self> {
        mode.check_dimensions(width, height)?;
        let expected = mode.packed_len(width, height);
        if bytes.len() != expected {
            return Err(AssetError::InvalidGrid(format!(
                "{} bytes for a {width}x{height} bitmap, expected {expected}",
                bytes.len()
            )));
        }
        Ok(Self {
            mode,
            width,
            height,
            bytes,
        })
    }

    pub fn mode(&self) -> PackMode {
        self.mode
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn stride(&self) -> usize {
        self.mode.stride(self.width)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn unpack(&self) -> BitGrid {
        let stride = self.stride();
        BitGrid::from_fn(self.width, self.height, |x, y| {
            self.bytes[y * stride + x / 8] & (0x80 >> (x % 8)) != 0
        })
    }

    pub fn to_ascii(&self) -> String {
        self.unpack().to_ascii()
    }
}
