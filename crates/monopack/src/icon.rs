//! Icon compiler: a directory of PNG/SVG art to headerless `<stem>.bin`
//! bitmaps.
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use tracing::{debug, info, warn};

use crate::{
    config::{DuplicatePolicy, IconConfig},
    error::{AssetError, Result},
    grid::Quantizer,
    pack::{pack, PackMode, PackedBitmap},
    pool::map_ordered,
    raster::{rasterize_image, svg::BackendChain, SourceKind},
};

pub const OUTPUT_EXTENSION: &str = "bin";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IconSource {
    /// File stem, used as the output name.
    pub name: String,
    pub path: PathBuf,
    pub kind: SourceKind,
}

/// List PNG sources first, then SVG sources, each sorted by file name.
pub fn discover_icons(dir: &Path) -> Result<Vec<IconSource>> {
    if !dir.is_dir() {
        return Err(AssetError::MissingAsset(dir.to_path_buf()));
    }
    let mut sources = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let (Some(kind), Some(stem)) = (SourceKind::from_path(&path), path.file_stem()) else {
            continue;
        };
        sources.push(IconSource {
            name: stem.to_string_lossy().into_owned(),
            path,
            kind,
        });
    }
    sources.sort_by(|a, b| {
        let rank = |k: SourceKind| matches!(k, SourceKind::Svg);
        rank(a.kind)
            .cmp(&rank(b.kind))
            .then_with(|| a.path.cmp(&b.path))
    });
    Ok(sources)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IconAsset {
    pub name: String,
    pub kind: SourceKind,
    pub source: PathBuf,
    pub bitmap: PackedBitmap,
}

#[derive(Debug)]
pub struct IconFailure {
    pub name: String,
    pub path: PathBuf,
    pub error: AssetError,
}

/// Two sources mapped to the same output file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Collision {
    pub name: String,
    pub output: PathBuf,
    /// Source whose bitmap is in the output file after the run.
    pub kept: PathBuf,
    /// Source whose bitmap was discarded.
    pub discarded: PathBuf,
}

#[derive(Debug, Default)]
pub struct IconReport {
    pub written: Vec<PathBuf>,
    pub failures: Vec<IconFailure>,
    pub collisions: Vec<Collision>,
}

impl IconReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

pub struct IconCompiler {
    config: IconConfig,
    backends: BackendChain,
}

impl IconCompiler {
    /// Validates the configuration and detects the SVG backends once.
    pub fn new(config: IconConfig) -> Result<Self> {
        let backends = BackendChain::detect(config.tool_timeout);
        Self::with_backends(config, backends)
    }

    pub fn with_backends(config: IconConfig, backends: BackendChain) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, backends })
    }

    pub fn config(&self) -> &IconConfig {
        &self.config
    }

    pub fn backends(&self) -> &BackendChain {
        &self.backends
    }

    pub fn compile_one(&self, source: &IconSource) -> Result<IconAsset> {
        let pixels = rasterize_image(&source.path, self.config.size, &self.backends)?;
        let bits = Quantizer::icon(self.config.threshold).quantize(&pixels);
        let bitmap = pack(&bits, PackMode::RowPadded)?;
        debug!(name = %source.name, on = bits.count_on(), "compiled icon");
        Ok(IconAsset {
            name: source.name.clone(),
            kind: source.kind,
            source: source.path.clone(),
            bitmap,
        })
    }

    pub fn output_path(&self, name: &str) -> PathBuf {
        self.config
            .output_dir
            .join(format!("{name}.{OUTPUT_EXTENSION}"))
    }

    /// Compile every icon in the input directory.
    ///
    /// Per-icon failures are collected in the report and do not stop the batch.
    /// A missing input directory or an uncreatable output directory is fatal.
    pub fn run(&self) -> Result<IconReport> {
        let sources = discover_icons(&self.config.input_dir)?;
        fs::create_dir_all(&self.config.output_dir)?;
        info!(
            count = sources.len(),
            backends = ?self.backends.names(),
            "compiling icons"
        );

        let results = map_ordered(&sources, self.config.jobs, |s| self.compile_one(s));

        let mut report = IconReport::default();
        // output name -> source whose bitmap currently occupies it
        let mut owners: HashMap<String, PathBuf> = HashMap::new();
        for (source, result) in sources.iter().zip(results) {
            let asset = match result {
                Ok(asset) => asset,
                Err(error) => {
                    warn!(name = %source.name, %error, "icon failed");
                    report.failures.push(IconFailure {
                        name: source.name.clone(),
                        path: source.path.clone(),
                        error,
                    });
                    continue;
                }
            };
            let output = self.output_path(&asset.name);
            if let Some(first) = owners.get(&asset.name).cloned() {
                warn!(
                    name = %asset.name,
                    first = %first.display(),
                    later = %asset.source.display(),
                    policy = ?self.config.duplicates,
                    "duplicate icon name"
                );
                match self.config.duplicates {
                    DuplicatePolicy::KeepFirst => {
                        report.collisions.push(Collision {
                            name: asset.name.clone(),
                            output,
                            kept: first,
                            discarded: asset.source,
                        });
                    }
                    DuplicatePolicy::Overwrite => {
                        if let Err(error) = fs::write(&output, asset.bitmap.as_bytes()) {
                            report.failures.push(IconFailure {
                                name: asset.name,
                                path: asset.source,
                                error: error.into(),
                            });
                            continue;
                        }
                        report.collisions.push(Collision {
                            name: asset.name.clone(),
                            output,
                            kept: asset.source.clone(),
                            discarded: first,
                        });
                        owners.insert(asset.name, asset.source);
                    }
                    DuplicatePolicy::Fail => {
                        report.failures.push(IconFailure {
                            name: asset.name.clone(),
                            path: asset.source,
                            error: AssetError::DuplicateName {
                                name: asset.name,
                                first,
                                output,
                            },
                        });
                    }
                }
                continue;
            }
            match fs::write(&output, asset.bitmap.as_bytes()) {
                Ok(()) => {
                    debug!(output = %output.display(), bytes = asset.bitmap.as_bytes().len(), "icon written");
                    owners.insert(asset.name, asset.source);
                    report.written.push(output);
                }
                Err(error) => report.failures.push(IconFailure {
                    name: asset.name,
                    path: asset.source,
                    error: error.into(),
                }),
            }
        }
        info!(
            written = report.written.len(),
            failed = report.failures.len(),
            collisions = report.collisions.len(),
            "icon batch finished"
        );
        Ok(report)
    }
}
