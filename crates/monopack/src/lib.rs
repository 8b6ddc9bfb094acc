//! monopack: build-time compiler for monochrome display assets.
//! Pipelines: TrueType glyphs -> 16x16 C table entries, PNG/SVG icons -> raw
//! row-padded `.bin` bitmaps.

pub mod config;
mod error;
pub mod glyph;
pub mod grid;
pub mod icon;
pub mod index;
pub mod pack;
pub mod pool;
pub mod raster;
pub use config::{DuplicatePolicy, GlyphConfig, IconConfig};
pub use error::{AssetError, Result};
pub use glyph::{GlyphCompiler, GlyphEntry};
pub use grid::{BitGrid, PixelGrid, Polarity, Quantizer};
pub use icon::{IconCompiler, IconReport};
pub use index::CharIndex;
pub use pack::{pack, PackMode, PackedBitmap};

// Test utilities
pub mod test_support;
