use std::{fs, path::PathBuf, time::Duration};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use monopack::{
    config::{DEFAULT_CHARS, DEFAULT_ICON_SIZE},
    glyph::parse_supplement,
    grid::DEFAULT_THRESHOLD,
    DuplicatePolicy, GlyphCompiler, GlyphConfig, IconCompiler, IconConfig, PackMode,
    PackedBitmap,
};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use crate::console::{preview_bitmap, preview_records, summarize_icons};
mod console;

#[derive(Parser)]
#[command(name = "monopack", about = "Monochrome glyph and icon compiler for e-paper firmware")]
struct Cli {
    /// Raise log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Cmd,
}

#[derive(Copy, Clone, ValueEnum)]
enum OnDuplicate {
    KeepFirst,
    Overwrite,
    Fail,
}

impl From<OnDuplicate> for DuplicatePolicy {
    fn from(value: OnDuplicate) -> Self {
        match value {
            OnDuplicate::KeepFirst => DuplicatePolicy::KeepFirst,
            OnDuplicate::Overwrite => DuplicatePolicy::Overwrite,
            OnDuplicate::Fail => DuplicatePolicy::Fail,
        }
    }
}

#[derive(Subcommand)]
enum Cmd {
    /// Render characters from a TrueType font into a 16x16 glyph table supplement
    Glyphs {
        #[arg(short, long)]
        font: PathBuf,
        #[arg(short, long, default_value = DEFAULT_CHARS)]
        chars: String,
        #[arg(long, default_value_t = 16.0)]
        pixel_size: f32,
        #[arg(short, long, default_value = "font_supplement.txt")]
        output: PathBuf,
        #[arg(long, default_value_t = DEFAULT_THRESHOLD)]
        threshold: u8,
        #[arg(short, long)]
        jobs: Option<usize>,
    },
    /// Convert a directory of PNG/SVG icons into raw 1-bit .bin files
    Icons {
        #[arg(short, long, default_value = "icon")]
        input: PathBuf,
        #[arg(short, long, default_value = "icons_bin")]
        output: PathBuf,
        #[arg(short, long, default_value_t = DEFAULT_ICON_SIZE)]
        size: u32,
        #[arg(long, default_value_t = DEFAULT_THRESHOLD)]
        threshold: u8,
        #[arg(long, value_enum, default_value = "keep-first")]
        on_duplicate: OnDuplicate,
        /// Seconds allowed for each external converter run
        #[arg(long, default_value_t = 30)]
        timeout: u64,
        #[arg(short, long)]
        jobs: Option<usize>,
    },
    /// Preview a .bin icon or a glyph supplement file
    Inspect {
        #[arg(short, long)]
        file: PathBuf,
        /// Side length of a .bin icon
        #[arg(short, long, default_value_t = DEFAULT_ICON_SIZE)]
        size: u32,
    },
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match cli.command {
        Cmd::Glyphs {
            font,
            chars,
            pixel_size,
            output,
            threshold,
            jobs,
        } => {
            let compiler = GlyphCompiler::new(GlyphConfig {
                font_path: font,
                pixel_size,
                chars,
                output: output.clone(),
                threshold,
                jobs,
            })
            .context("cannot start glyph compiler")?;
            let entries = compiler.run().context("glyph compilation failed")?;
            info!(count = entries.len(), "glyphs done");
            eprintln!("Wrote {} glyphs to {}", entries.len(), output.display());
        }
        Cmd::Icons {
            input,
            output,
            size,
            threshold,
            on_duplicate,
            timeout,
            jobs,
        } => {
            let compiler = IconCompiler::new(IconConfig {
                input_dir: input,
                output_dir: output,
                size,
                threshold,
                duplicates: on_duplicate.into(),
                tool_timeout: Duration::from_secs(timeout),
                jobs,
            })
            .context("cannot start icon compiler")?;
            let report = compiler.run().context("icon compilation failed")?;
            eprint!("{}", summarize_icons(&report));
            if !report.is_success() {
                bail!("{} icon(s) failed", report.failures.len());
            }
        }
        Cmd::Inspect { file, size } => {
            let bytes = fs::read(&file).with_context(|| format!("reading {}", file.display()))?;
            let is_text = file
                .extension()
                .is_some_and(|e| e.eq_ignore_ascii_case("txt"));
            if is_text {
                let text = String::from_utf8(bytes).context("supplement is not UTF-8")?;
                let records = parse_supplement(&text)?;
                println!("Glyph supplement: {} entries\n", records.len());
                print!("{}", preview_records(&records));
            } else {
                let side = size as usize;
                let bitmap = PackedBitmap::from_bytes(bytes, side, side, PackMode::RowPadded)?;
                print!("{}", preview_bitmap(&file.display().to_string(), &bitmap));
            }
        }
    }
    Ok(())
}
