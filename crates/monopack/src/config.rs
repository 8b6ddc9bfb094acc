//! Pipeline configuration passed explicitly into the compilers.
use std::{path::PathBuf, time::Duration};

use crate::{
    error::{AssetError, Result},
    grid::DEFAULT_THRESHOLD,
    raster::svg::DEFAULT_TOOL_TIMEOUT,
};

pub const DEFAULT_CHARS: &str = "WiFMQTTOKfail";
pub const DEFAULT_ICON_SIZE: u32 = 64;

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GlyphConfig {
    pub font_path: PathBuf,
    /// Em size the font is rendered at; the cell stays 16x16.
    pub pixel_size: f32,
    /// Characters to emit, in output order. Repeats are emitted again.
    pub chars: String,
    pub output: PathBuf,
    pub threshold: u8,
    /// Worker count, `None` = available cores.
    pub jobs: Option<usize>,
}

impl Default for GlyphConfig {
    fn default() -> Self {
        Self {
            font_path: PathBuf::from("FZCHAOZYTJW.TTF"),
            pixel_size: 16.0,
            chars: DEFAULT_CHARS.to_string(),
            output: PathBuf::from("font_supplement.txt"),
            threshold: DEFAULT_THRESHOLD,
            jobs: None,
        }
    }
}

impl GlyphConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.pixel_size.is_finite() || self.pixel_size <= 0.0 {
            return Err(AssetError::InvalidConfig(format!(
                "pixel size must be positive and finite, got {}",
                self.pixel_size
            )));
        }
        if self.chars.is_empty() {
            return Err(AssetError::InvalidConfig("no target characters".into()));
        }
        // The character lands in a `//` comment line of the generated C.
        if let Some(ch) = self.chars.chars().find(|c| c.is_control()) {
            return Err(AssetError::InvalidConfig(format!(
                "control character {ch:?} cannot be emitted"
            )));
        }
        check_jobs(self.jobs)
    }
}

/// What to do when two icon sources share a stem (`foo.png` and `foo.svg`).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DuplicatePolicy {
    /// Keep the first output (PNGs are discovered first) and report the rest.
    #[default]
    KeepFirst,
    /// Let the later source overwrite the output, still reporting it.
    Overwrite,
    /// Treat every later source as a failed asset.
    Fail,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IconConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Side length of the square output bitmap.
    pub size: u32,
    pub threshold: u8,
    pub duplicates: DuplicatePolicy,
    /// Limit for each external converter run.
    pub tool_timeout: Duration,
    pub jobs: Option<usize>,
}

impl Default for IconConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("icon"),
            output_dir: PathBuf::from("icons_bin"),
            size: DEFAULT_ICON_SIZE,
            threshold: DEFAULT_THRESHOLD,
            duplicates: DuplicatePolicy::default(),
            tool_timeout: DEFAULT_TOOL_TIMEOUT,
            jobs: None,
        }
    }
}

impl IconConfig {
    pub fn validate(&self) -> Result<()> {
        if self.size == 0 {
            return Err(AssetError::InvalidConfig("icon size must be non-zero".into()));
        }
        if self.tool_timeout.is_zero() {
            return Err(AssetError::InvalidConfig("tool timeout must be non-zero".into()));
        }
        check_jobs(self.jobs)
    }
}

fn check_jobs(jobs: Option<usize>) -> Result<()> {
    if jobs == Some(0) {
        return Err(AssetError::InvalidConfig("jobs must be at least 1".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        GlyphConfig::default().validate().unwrap();
        IconConfig::default().validate().unwrap();
    }

    #[test]
    fn rejects_degenerate_values() {
        let icons = IconConfig {
            size: 0,
            ..IconConfig::default()
        };
        assert!(icons.validate().is_err());
        let glyphs = GlyphConfig {
            chars: String::new(),
            ..GlyphConfig::default()
        };
        assert!(glyphs.validate().is_err());
        let glyphs = GlyphConfig {
            jobs: Some(0),
            ..GlyphConfig::default()
        };
        assert!(glyphs.validate().is_err());
    }

    #[test]
    fn rejects_non_finite_pixel_size() {
        for pixel_size in [f32::INFINITY, f32::NEG_INFINITY, f32::NAN, -1.0] {
            let glyphs = GlyphConfig {
                pixel_size,
                ..GlyphConfig::default()
            };
            assert!(
                matches!(glyphs.validate(), Err(AssetError::InvalidConfig(_))),
                "{pixel_size}"
            );
        }
    }

    #[test]
    fn rejects_control_characters() {
        for chars in ["W\nX", "\r", "A\u{7f}", "\t"] {
            let glyphs = GlyphConfig {
                chars: chars.to_string(),
                ..GlyphConfig::default()
            };
            assert!(
                matches!(glyphs.validate(), Err(AssetError::InvalidConfig(_))),
                "{chars:?}"
            );
        }
        let glyphs = GlyphConfig {
            chars: "W é€".to_string(),
            ..GlyphConfig::default()
        };
        assert!(glyphs.validate().is_ok());
    }
}
