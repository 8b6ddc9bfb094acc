//! Test support utilities for monopack.
//!
//! Helpers for building fixture images and stand-in SVG backends. Not part of
//! the stable API.

use std::{io::Cursor, path::Path};

use image::{ImageFormat, Rgba, RgbaImage};

use crate::{grid::BitGrid, raster::svg::SvgBackend, AssetError, Result};

/// Encode an RGBA image as PNG bytes.
pub fn encode_png(image: &RgbaImage) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    image
        .write_to(&mut out, ImageFormat::Png)
        .expect("in-memory PNG encoding");
    out.into_inner()
}

/// Write a `width` x `height` PNG filled with one colour.
pub fn write_solid_png(path: &Path, width: u32, height: u32, rgba: [u8; 4]) {
    let image = RgbaImage::from_pixel(width, height, Rgba(rgba));
    std::fs::write(path, encode_png(&image)).expect("write fixture png");
}

/// Alternating on/off pixels, on at (0, 0).
pub fn checkerboard(width: usize, height: usize) -> BitGrid {
    BitGrid::from_fn(width, height, |x, y| (x + y) % 2 == 0)
}

/// SVG backend that ignores its input and returns a fixed image, or fails.
pub struct StaticBackend {
    pub name: String,
    pub image: Option<RgbaImage>,
}

impl StaticBackend {
    pub fn solid(name: &str, rgba: [u8; 4]) -> Self {
        Self {
            name: name.to_string(),
            image: Some(RgbaImage::from_pixel(1, 1, Rgba(rgba))),
        }
    }

    pub fn failing(name: &str) -> Self {
        Self {
            name: name.to_string(),
            image: None,
        }
    }
}

impl SvgBackend for StaticBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn render(&self, _svg: &Path, size: u32) -> Result<RgbaImage> {
        match &self.image {
            Some(image) => Ok(image::imageops::resize(
                image,
                size,
                size,
                image::imageops::FilterType::Nearest,
            )),
            None => Err(AssetError::ExternalToolFailure {
                tool: self.name.clone(),
                reason: "static failure".into(),
            }),
        }
    }
}
