use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("missing asset: {}", .0.display())]
    MissingAsset(PathBuf),
    #[error("unsupported format: {}: {reason}", .path.display())]
    UnsupportedFormat { path: PathBuf, reason: String },
    #[error("no rasterizer backend available for {}", .0.display())]
    NoRasterizerBackend(PathBuf),
    #[error("character {ch:?} encodes to {len} UTF-8 bytes, index holds at most 3")]
    IndexOverflow { ch: char, len: usize },
    #[error("external tool {tool} failed: {reason}")]
    ExternalToolFailure { tool: String, reason: String },
    #[error("font has no glyph for {0:?}")]
    MissingGlyph(char),
    #[error("invalid grid: {0}")]
    InvalidGrid(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("duplicate icon name {name:?}: {} already produced {}", .first.display(), .output.display())]
    DuplicateName {
        name: String,
        first: PathBuf,
        output: PathBuf,
    },
    #[error("{} of the requested characters failed: {}", .failures.len(), describe_failures(.failures))]
    IncompleteGlyphSet { failures: Vec<(char, AssetError)> },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AssetError {
    pub(crate) fn unsupported(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        AssetError::UnsupportedFormat {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

fn describe_failures(failures: &[(char, AssetError)]) -> String {
    failures
        .iter()
        .map(|(ch, err)| format!("{ch:?}: {err}"))
        .collect::<Vec<_>>()
        .join("; ")
}

pub type Result<T> = std::result::Result<T, AssetError>;
