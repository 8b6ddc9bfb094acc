use std::fmt::Write;

use monopack::{glyph::GlyphRecord, icon::IconReport, PackedBitmap};

/// Preview a packed bitmap with `#` for on pixels and `.` for off pixels.
pub fn preview_bitmap(title: &str, bitmap: &PackedBitmap) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{title} ({}x{}, stride {}, {} bytes)",
        bitmap.width(),
        bitmap.height(),
        bitmap.stride(),
        bitmap.as_bytes().len()
    );
    out.push_str(&bitmap.to_ascii());
    out
}

pub fn preview_records(records: &[GlyphRecord]) -> String {
    let mut out = String::new();
    for (i, record) in records.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let title = match record.index.decode() {
            Some(ch) => format!("{ch:?} {}", record.index),
            None => format!("<undecodable> {}", record.index),
        };
        out.push_str(&preview_bitmap(&title, &record.mask));
    }
    out
}

/// One line per written file, collision and failure.
pub fn summarize_icons(report: &IconReport) -> String {
    let mut out = String::new();
    for path in &report.written {
        let _ = writeln!(out, "wrote {}", path.display());
    }
    for c in &report.collisions {
        let _ = writeln!(
            out,
            "collision {}: kept {}, discarded {} ({})",
            c.name,
            c.kept.display(),
            c.discarded.display(),
            c.output.display()
        );
    }
    for f in &report.failures {
        let _ = writeln!(out, "failed {}: {}", f.name, f.error);
    }
    out
}
