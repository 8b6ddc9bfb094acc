use std::{
    fs,
    path::{Path, PathBuf},
};

use monopack::{
    glyph::{parse_supplement, GlyphEntry},
    raster::FontRasterizer,
    AssetError, GlyphCompiler, GlyphConfig, Quantizer,
};
use pretty_assertions::assert_eq;

const DEJAVU: &[u8] = include_bytes!("fonts/DejaVuSans.ttf");
const GOLDEN_W: &str = include_str!("golden/W.mask");

fn fixture_font() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fonts/DejaVuSans.ttf")
}

fn config(chars: &str, output: PathBuf) -> GlyphConfig {
    GlyphConfig {
        font_path: fixture_font(),
        chars: chars.to_string(),
        output,
        ..GlyphConfig::default()
    }
}

fn mask_to_hex(mask: &[u8]) -> String {
    mask.chunks(2)
        .map(|row| format!("{:02X}{:02X}", row[0], row[1]))
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn w_matches_golden_capture() {
    let rasterizer = FontRasterizer::from_bytes(DEJAVU, 16.0).unwrap();
    let entry = GlyphEntry::compile(&rasterizer, 'W', &Quantizer::glyph(128)).unwrap();
    assert_eq!(entry.index.bytes(), [0x57, 0x00, 0x00]);

    let mask = entry.mask.as_bytes();
    assert_eq!(mask.len(), 32);
    // Capital letters start below the ascent line, so the top rows are empty.
    assert_eq!(&mask[..4], &[0, 0, 0, 0]);
    let on = entry.mask.unpack().count_on();
    assert!((20..200).contains(&on), "{on} pixels on\n{}", entry.mask.to_ascii());

    // Reference capture of DejaVu Sans 'W' at 16 px.
    assert_eq!(GOLDEN_W.trim(), mask_to_hex(mask));
}

#[test]
fn rendering_is_deterministic() {
    let rasterizer = FontRasterizer::from_bytes(DEJAVU, 16.0).unwrap();
    let a = GlyphEntry::compile(&rasterizer, 'Q', &Quantizer::glyph(128)).unwrap();
    let b = GlyphEntry::compile(&rasterizer, 'Q', &Quantizer::glyph(128)).unwrap();
    assert_eq!(a, b);
}

#[test]
fn space_is_blank() {
    let rasterizer = FontRasterizer::from_bytes(DEJAVU, 16.0).unwrap();
    let entry = GlyphEntry::compile(&rasterizer, ' ', &Quantizer::glyph(128)).unwrap();
    assert!(entry.mask.as_bytes().iter().all(|b| *b == 0));
}

#[test]
fn writes_supplement_in_input_order() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("out/font_supplement.txt");
    let compiler = GlyphCompiler::new(config("WiFMQTTOKfail", output.clone())).unwrap();
    let entries = compiler.run().unwrap();
    assert_eq!(entries.len(), 13);

    let text = fs::read_to_string(&output).unwrap();
    let comments: String = text
        .lines()
        .filter_map(|l| l.strip_prefix("// Character: "))
        .collect();
    assert_eq!(comments, "WiFMQTTOKfail");

    let records = parse_supplement(&text).unwrap();
    let decoded: String = records.iter().filter_map(|r| r.index.decode()).collect();
    assert_eq!(decoded, "WiFMQTTOKfail");
    for (record, entry) in records.iter().zip(&entries) {
        assert_eq!(record.mask, entry.mask);
    }
    // Both T entries come from the same glyph.
    assert_eq!(records[5].mask, records[6].mask);
}

#[test]
fn single_worker_matches_parallel_output() {
    let dir = tempfile::tempdir().unwrap();
    let serial = GlyphCompiler::new(GlyphConfig {
        jobs: Some(1),
        ..config("abcdefgh", dir.path().join("a.txt"))
    })
    .unwrap()
    .compile()
    .unwrap();
    let parallel = GlyphCompiler::new(GlyphConfig {
        jobs: Some(4),
        ..config("abcdefgh", dir.path().join("b.txt"))
    })
    .unwrap()
    .compile()
    .unwrap();
    assert_eq!(serial, parallel);
}

#[test]
fn missing_font_aborts_before_work() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = GlyphConfig {
        font_path: dir.path().join("nope.ttf"),
        ..config("W", dir.path().join("out.txt"))
    };
    assert!(matches!(
        GlyphCompiler::new(cfg),
        Err(AssetError::MissingAsset(_))
    ));
}

#[test]
fn garbage_font_is_unsupported() {
    let dir = tempfile::tempdir().unwrap();
    let font = dir.path().join("broken.ttf");
    fs::write(&font, b"definitely not a font").unwrap();
    let cfg = GlyphConfig {
        font_path: font,
        ..config("W", dir.path().join("out.txt"))
    };
    assert!(matches!(
        GlyphCompiler::new(cfg),
        Err(AssetError::UnsupportedFormat { .. })
    ));
}

#[test]
fn non_finite_pixel_size_is_rejected() {
    for pixel_size in [f32::INFINITY, f32::NAN, 0.0] {
        assert!(
            matches!(
                FontRasterizer::from_bytes(DEJAVU, pixel_size),
                Err(AssetError::InvalidConfig(_))
            ),
            "{pixel_size}"
        );
    }
    let dir = tempfile::tempdir().unwrap();
    let cfg = GlyphConfig {
        pixel_size: f32::INFINITY,
        ..config("W", dir.path().join("out.txt"))
    };
    assert!(matches!(
        GlyphCompiler::new(cfg),
        Err(AssetError::InvalidConfig(_))
    ));
    assert!(!dir.path().join("out.txt").exists());
}

#[test]
fn newline_in_target_set_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("out.txt");
    assert!(matches!(
        GlyphCompiler::new(config("W\nX", output.clone())),
        Err(AssetError::InvalidConfig(_))
    ));
    assert!(!output.exists());
}

#[test]
fn any_failure_rejects_the_whole_set() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("out.txt");
    // The emoji overflows the index, the CJK character is not in DejaVu Sans.
    let compiler = GlyphCompiler::new(config("A😀B中", output.clone())).unwrap();
    match compiler.run() {
        Err(AssetError::IncompleteGlyphSet { failures }) => {
            assert_eq!(failures.len(), 2);
            assert_eq!(failures[0].0, '😀');
            assert!(matches!(failures[0].1, AssetError::IndexOverflow { .. }));
            assert_eq!(failures[1].0, '中');
            assert!(matches!(failures[1].1, AssetError::MissingGlyph('中')));
        }
        other => panic!("expected incomplete set, got {other:?}"),
    }
    assert!(!output.exists());
}
