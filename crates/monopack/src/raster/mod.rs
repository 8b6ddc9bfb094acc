//! Source rasterizers: fonts and PNG/SVG images to [`PixelGrid`]s.

mod font;
pub mod process;
pub mod svg;

use std::path::Path;

use image::{imageops::FilterType, GrayImage, Luma, RgbaImage};

use crate::{
    error::{AssetError, Result},
    grid::PixelGrid,
};
pub use font::FontRasterizer;
use svg::BackendChain;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SourceKind {
    Png,
    Svg,
}

impl SourceKind {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "png" => Some(SourceKind::Png),
            "svg" => Some(SourceKind::Svg),
            _ => None,
        }
    }
}

/// Decode an image file and reduce it to a `size` x `size` intensity grid.
///
/// Transparency is composited over white before the luma conversion and the
/// result is Lanczos-resampled when the source is not already square at `size`.
pub fn rasterize_image(path: &Path, size: u32, backends: &BackendChain) -> Result<PixelGrid> {
    if !path.is_file() {
        return Err(AssetError::MissingAsset(path.to_path_buf()));
    }
    let kind = SourceKind::from_path(path)
        .ok_or_else(|| AssetError::unsupported(path, "expected a .png or .svg file"))?;
    let rgba = match kind {
        SourceKind::Png => {
            let bytes = std::fs::read(path)?;
            decode_png(&bytes).map_err(|e| match e {
                AssetError::UnsupportedFormat { reason, .. } => AssetError::unsupported(path, reason),
                other => other,
            })?
        }
        SourceKind::Svg => {
            if backends.is_empty() {
                return Err(AssetError::NoRasterizerBackend(path.to_path_buf()));
            }
            backends.render(path, size)?
        }
    };
    let gray = resize_square(flatten_onto_white(&rgba), size);
    gray_to_grid(gray)
}

pub fn decode_png(bytes: &[u8]) -> Result<RgbaImage> {
    image::load_from_memory_with_format(bytes, image::ImageFormat::Png)
        .map(|img| img.to_rgba8())
        .map_err(|e| AssetError::unsupported("<png>", e))
}

/// Composite over opaque white and convert to ITU-R 601-2 luma.
pub fn flatten_onto_white(src: &RgbaImage) -> GrayImage {
    GrayImage::from_fn(src.width(), src.height(), |x, y| {
        let [r, g, b, a] = src.get_pixel(x, y).0;
        let over_white = |c: u8| -> u32 {
            let (c, a) = (c as u32, a as u32);
            (c * a + 255 * (255 - a) + 127) / 255
        };
        let (r, g, b) = (over_white(r), over_white(g), over_white(b));
        Luma([((r * 299 + g * 587 + b * 114) / 1000) as u8])
    })
}

pub fn resize_square(gray: GrayImage, size: u32) -> GrayImage {
    if gray.dimensions() == (size, size) {
        gray
    } else {
        image::imageops::resize(&gray, size, size, FilterType::Lanczos3)
    }
}

fn gray_to_grid(gray: GrayImage) -> Result<PixelGrid> {
    let (width, height) = gray.dimensions();
    PixelGrid::from_samples(width as usize, height as usize, gray.into_raw())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn transparent_becomes_white() {
        let src = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 0]));
        assert!(flatten_onto_white(&src).pixels().all(|p| p.0[0] == 255));
    }

    #[test]
    fn opaque_black_stays_black() {
        let src = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 255]));
        assert!(flatten_onto_white(&src).pixels().all(|p| p.0[0] == 0));
    }

    #[test]
    fn luma_weights() {
        let src = RgbaImage::from_pixel(1, 1, Rgba([255, 0, 0, 255]));
        assert_eq!(flatten_onto_white(&src).get_pixel(0, 0).0[0], 76);
    }

    #[test]
    fn resize_hits_requested_size() {
        let gray = GrayImage::from_pixel(10, 30, Luma([0]));
        assert_eq!(resize_square(gray, 8).dimensions(), (8, 8));
    }

    #[test]
    fn kind_from_extension() {
        assert_eq!(SourceKind::from_path(Path::new("a/Cloud.PNG")), Some(SourceKind::Png));
        assert_eq!(SourceKind::from_path(Path::new("sun.svg")), Some(SourceKind::Svg));
        assert_eq!(SourceKind::from_path(Path::new("notes.txt")), None);
    }
}
