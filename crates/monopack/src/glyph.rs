//! Glyph compiler: font characters to the firmware's `{Index[3], Msk[32]}`
//! table entries.
use std::{
    fs,
    io::{self, Write},
    path::Path,
};

use tracing::{debug, info};

use crate::{
    config::GlyphConfig,
    error::{AssetError, Result},
    grid::Quantizer,
    index::{hex_list, CharIndex, INDEX_LEN},
    pack::{pack, PackMode, PackedBitmap, GLYPH_CELL, GLYPH_MASK_LEN},
    pool::map_ordered,
    raster::FontRasterizer,
};

const COMMENT_PREFIX: &str = "// Character: ";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlyphEntry {
    pub ch: char,
    pub index: CharIndex,
    pub mask: PackedBitmap,
}

impl GlyphEntry {
    pub fn compile(rasterizer: &FontRasterizer, ch: char, quantizer: &Quantizer) -> Result<Self> {
        let index = CharIndex::encode(ch)?;
        let pixels = rasterizer.rasterize(ch, GLYPH_CELL)?;
        let bits = quantizer.quantize(&pixels);
        let mask = pack(&bits, PackMode::Fixed16)?;
        debug!(?ch, on = bits.count_on(), "compiled glyph");
        Ok(Self { ch, index, mask })
    }

    /// Comment line plus the struct literal block, newline terminated.
    pub fn to_c_literal(&self) -> String {
        format!(
            "{COMMENT_PREFIX}{}\n    {{\n        {},\n        {{{}}},\n    }},\n",
            self.ch,
            self.index,
            hex_list(self.mask.as_bytes())
        )
    }
}

pub fn write_entries<W: Write>(entries: &[GlyphEntry], mut out: W) -> io::Result<()> {
    for entry in entries {
        out.write_all(entry.to_c_literal().as_bytes())?;
    }
    out.flush()
}

/// One `{index}, {mask}` pair read back from a supplement file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlyphRecord {
    pub index: CharIndex,
    pub mask: PackedBitmap,
}

/// Parse text in the layout produced by [`write_entries`].
///
/// Comment lines are ignored; each entry is the pair of brace lists holding 3
/// and 32 hex bytes.
pub fn parse_supplement(text: &str) -> Result<Vec<GlyphRecord>> {
    let bad = |line: usize, reason: String| {
        AssetError::unsupported("<glyph supplement>", format!("line {}: {reason}", line + 1))
    };
    let mut records = Vec::new();
    let mut pending: Option<CharIndex> = None;
    for (n, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.starts_with("//") || !line.contains("0x") {
            continue;
        }
        let body = line
            .strip_prefix('{')
            .and_then(|l| l.strip_suffix(','))
            .and_then(|l| l.strip_suffix('}'))
            .ok_or_else(|| bad(n, format!("expected a {{...}}, list, got {line:?}")))?;
        let bytes = body
            .split(',')
            .map(|tok| {
                let tok = tok.trim();
                tok.strip_prefix("0x")
                    .or_else(|| tok.strip_prefix("0X"))
                    .and_then(|hex| u8::from_str_radix(hex, 16).ok())
                    .ok_or_else(|| bad(n, format!("bad byte {tok:?}")))
            })
            .collect::<Result<Vec<u8>>>()?;
        match pending.take() {
            None => {
                let index: [u8; INDEX_LEN] = bytes
                    .try_into()
                    .map_err(|b: Vec<u8>| bad(n, format!("index has {} bytes", b.len())))?;
                pending = Some(CharIndex::from_bytes(index));
            }
            Some(index) => {
                if bytes.len() != GLYPH_MASK_LEN {
                    return Err(bad(n, format!("mask has {} bytes", bytes.len())));
                }
                let mask = PackedBitmap::from_bytes(bytes, GLYPH_CELL, GLYPH_CELL, PackMode::Fixed16)?;
                records.push(GlyphRecord { index, mask });
            }
        }
    }
    if pending.is_some() {
        return Err(bad(text.lines().count(), "index without mask".into()));
    }
    Ok(records)
}

pub struct GlyphCompiler {
    config: GlyphConfig,
    rasterizer: FontRasterizer,
}

impl GlyphCompiler {
    /// Validates the configuration and loads the font; a missing or
    /// unreadable font aborts here before any character is attempted.
    pub fn new(config: GlyphConfig) -> Result<Self> {
        config.validate()?;
        let rasterizer = FontRasterizer::load(&config.font_path, config.pixel_size)?;
        Ok(Self { config, rasterizer })
    }

    pub fn with_rasterizer(config: GlyphConfig, rasterizer: FontRasterizer) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, rasterizer })
    }

    pub fn config(&self) -> &GlyphConfig {
        &self.config
    }

    /// Compile every configured character in order.
    ///
    /// All characters are attempted; if any fail the whole set is rejected with
    /// [`AssetError::IncompleteGlyphSet`] naming each failure.
    pub fn compile(&self) -> Result<Vec<GlyphEntry>> {
        let chars: Vec<char> = self.config.chars.chars().collect();
        let quantizer = Quantizer::glyph(self.config.threshold);
        let results = map_ordered(&chars, self.config.jobs, |ch| {
            GlyphEntry::compile(&self.rasterizer, *ch, &quantizer)
        });

        let mut entries = Vec::with_capacity(chars.len());
        let mut failures = Vec::new();
        for (ch, result) in chars.into_iter().zip(results) {
            match result {
                Ok(entry) => entries.push(entry),
                Err(err) => failures.push((ch, err)),
            }
        }
        if !failures.is_empty() {
            return Err(AssetError::IncompleteGlyphSet { failures });
        }
        Ok(entries)
    }

    /// Compile and write the supplement file. Nothing is written unless every
    /// character compiled.
    pub fn run(&self) -> Result<Vec<GlyphEntry>> {
        let entries = self.compile()?;
        self.write(&entries, &self.config.output)?;
        info!(
            count = entries.len(),
            output = %self.config.output.display(),
            "glyph supplement written"
        );
        Ok(entries)
    }

    fn write(&self, entries: &[GlyphEntry], path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = fs::File::create(path)?;
        write_entries(entries, io::BufWriter::new(file))?;
        Ok(())
    }
}
