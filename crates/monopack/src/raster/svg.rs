//! SVG rendering backends.
//!
//! Vector input needs a renderer. Several interchangeable backends exist and
//! are tried in a fixed preference order: the in-process resvg renderer (when
//! compiled with the `resvg` feature), then Inkscape, then ImageMagick.
use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use image::RgbaImage;
use tracing::{debug, warn};

use crate::{
    error::{AssetError, Result},
    raster::process::{find_program, run_with_timeout},
};

pub const DEFAULT_TOOL_TIMEOUT: Duration = Duration::from_secs(30);

pub trait SvgBackend: Send + Sync {
    fn name(&self) -> &str;

    fn is_available(&self) -> bool {
        true
    }

    /// Render `svg` scaled to a `size` x `size` RGBA image.
    fn render(&self, svg: &Path, size: u32) -> Result<RgbaImage>;
}

#[cfg(feature = "resvg")]
pub struct ResvgBackend;

#[cfg(feature = "resvg")]
impl SvgBackend for ResvgBackend {
    fn name(&self) -> &str {
        "resvg"
    }

    fn render(&self, svg: &Path, size: u32) -> Result<RgbaImage> {
        use resvg::{tiny_skia, usvg};

        let data = std::fs::read(svg)?;
        let tree = usvg::Tree::from_data(&data, &usvg::Options::default())
            .map_err(|e| AssetError::unsupported(svg, e))?;
        let mut pixmap = tiny_skia::Pixmap::new(size, size)
            .ok_or_else(|| AssetError::InvalidConfig(format!("cannot allocate {size}x{size}")))?;
        let view = tree.size();
        let transform =
            tiny_skia::Transform::from_scale(size as f32 / view.width(), size as f32 / view.height());
        resvg::render(&tree, transform, &mut pixmap.as_mut());

        let mut image = RgbaImage::new(size, size);
        for (dst, src) in image.pixels_mut().zip(pixmap.pixels()) {
            let c = src.demultiply();
            *dst = image::Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
        }
        Ok(image)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ConverterTool {
    Inkscape,
    Magick,
}

impl ConverterTool {
    pub fn program(self) -> &'static str {
        match self {
            ConverterTool::Inkscape => "inkscape",
            ConverterTool::Magick => "magick",
        }
    }

    fn args(self, svg: &Path, png: &Path, size: u32) -> Vec<String> {
        let svg = svg.display().to_string();
        let png = png.display().to_string();
        match self {
            ConverterTool::Inkscape => vec![
                svg,
                "--export-type=png".into(),
                format!("--export-filename={png}"),
                format!("--export-width={size}"),
                format!("--export-height={size}"),
            ],
            ConverterTool::Magick => vec![
                "convert".into(),
                svg,
                "-resize".into(),
                format!("{size}x{size}"),
                png,
            ],
        }
    }
}

/// Shells out to a converter program that writes a PNG, then decodes it.
pub struct CommandBackend {
    tool: ConverterTool,
    program: Option<PathBuf>,
    timeout: Duration,
}

impl CommandBackend {
    /// Locate the tool on `PATH`.
    pub fn detect(tool: ConverterTool, timeout: Duration) -> Self {
        Self {
            tool,
            program: find_program(tool.program()),
            timeout,
        }
    }

    pub fn with_program(tool: ConverterTool, program: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            tool,
            program: Some(program.into()),
            timeout,
        }
    }
}

impl SvgBackend for CommandBackend {
    fn name(&self) -> &str {
        self.tool.program()
    }

    fn is_available(&self) -> bool {
        self.program.is_some()
    }

    fn render(&self, svg: &Path, size: u32) -> Result<RgbaImage> {
        let Some(program) = &self.program else {
            return Err(AssetError::NoRasterizerBackend(svg.to_path_buf()));
        };
        let scratch = tempfile::tempdir()?;
        let png = scratch.path().join("render.png");
        run_with_timeout(program, &self.tool.args(svg, &png, size), self.timeout)?;
        if !png.is_file() {
            return Err(AssetError::ExternalToolFailure {
                tool: self.name().to_string(),
                reason: "no output image was written".into(),
            });
        }
        let image = image::open(&png).map_err(|e| AssetError::unsupported(svg, e))?;
        Ok(image.to_rgba8())
    }
}

/// Ordered list of backends; the first one that renders successfully wins.
#[derive(Default)]
pub struct BackendChain {
    backends: Vec<Box<dyn SvgBackend>>,
}

impl BackendChain {
    /// Check every known backend once and keep the available ones in
    /// preference order.
    pub fn detect(tool_timeout: Duration) -> Self {
        let mut candidates: Vec<Box<dyn SvgBackend>> = Vec::new();
        #[cfg(feature = "resvg")]
        candidates.push(Box::new(ResvgBackend));
        candidates.push(Box::new(CommandBackend::detect(
            ConverterTool::Inkscape,
            tool_timeout,
        )));
        candidates.push(Box::new(CommandBackend::detect(
            ConverterTool::Magick,
            tool_timeout,
        )));
        Self::from_backends(candidates)
    }

    /// Keeps only the backends that report themselves available.
    pub fn from_backends(backends: Vec<Box<dyn SvgBackend>>) -> Self {
        let backends: Vec<_> = backends.into_iter().filter(|b| b.is_available()).collect();
        debug!(
            backends = ?backends.iter().map(|b| b.name()).collect::<Vec<_>>(),
            "svg backends"
        );
        Self { backends }
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.backends.iter().map(|b| b.name()).collect()
    }

    pub fn render(&self, svg: &Path, size: u32) -> Result<RgbaImage> {
        let mut last_err = None;
        for backend in &self.backends {
            match backend.render(svg, size) {
                Ok(image) => {
                    debug!(backend = backend.name(), path = %svg.display(), "svg rendered");
                    return Ok(image);
                }
                Err(err) => {
                    warn!(backend = backend.name(), path = %svg.display(), %err, "svg backend failed");
                    last_err = Some(err);
                }
            }
        }
        Err(last_err.unwrap_or_else(|| AssetError::NoRasterizerBackend(svg.to_path_buf())))
    }
}
