//! TrueType/OpenType glyph rasterization with fontdue.
use std::{fs, path::Path};

use tracing::debug;

use crate::{
    error::{AssetError, Result},
    grid::PixelGrid,
};

pub struct FontRasterizer {
    font: fontdue::Font,
    pixel_size: f32,
}

impl FontRasterizer {
    pub fn load(path: &Path, pixel_size: f32) -> Result<Self> {
        if !path.is_file() {
            return Err(AssetError::MissingAsset(path.to_path_buf()));
        }
        let bytes = fs::read(path)?;
        Self::from_bytes(&bytes, pixel_size).map_err(|err| match err {
            AssetError::UnsupportedFormat { reason, .. } => AssetError::unsupported(path, reason),
            other => other,
        })
    }

    pub fn from_bytes(bytes: &[u8], pixel_size: f32) -> Result<Self> {
        if !pixel_size.is_finite() || pixel_size <= 0.0 {
            return Err(AssetError::InvalidConfig(format!(
                "font pixel size must be positive and finite, got {pixel_size}"
            )));
        }
        let font = fontdue::Font::from_bytes(bytes, fontdue::FontSettings::default())
            .map_err(|e| AssetError::unsupported("<font>", e))?;
        Ok(Self { font, pixel_size })
    }

    pub fn pixel_size(&self) -> f32 {
        self.pixel_size
    }

    pub fn has_glyph(&self, ch: char) -> bool {
        self.font.lookup_glyph_index(ch) != 0
    }

    /// Draw `ch` into a `cell` x `cell` coverage grid.
    ///
    /// The pen sits at the top-left corner: the font's ascent line is row 0 and
    /// the glyph's left bearing is applied as is. Nothing is centred, so glyphs
    /// reaching above the ascent, left of the origin or past the cell edge are
    /// clipped.
    pub fn rasterize(&self, ch: char, cell: usize) -> Result<PixelGrid> {
        if !self.has_glyph(ch) {
            return Err(AssetError::MissingGlyph(ch));
        }
        let ascent = self
            .font
            .horizontal_line_metrics(self.pixel_size)
            .map(|m| m.ascent.round() as i32)
            .unwrap_or(self.pixel_size.round() as i32);
        let (metrics, coverage) = self.font.rasterize(ch, self.pixel_size);
        let left = metrics.xmin;
        let top = ascent - (metrics.ymin + metrics.height as i32);
        debug!(
            ?ch,
            width = metrics.width,
            height = metrics.height,
            left,
            top,
            "rasterized glyph"
        );

        let mut grid = PixelGrid::filled(cell, cell, 0);
        for (gy, row) in coverage.chunks(metrics.width.max(1)).enumerate() {
            let y = top + gy as i32;
            if y < 0 || y >= cell as i32 {
                continue;
            }
            for (gx, sample) in row.iter().enumerate() {
                let x = left + gx as i32;
                if x < 0 || x >= cell as i32 {
                    continue;
                }
                grid.set(x as usize, y as usize, *sample);
            }
        }
        Ok(grid)
    }
}
