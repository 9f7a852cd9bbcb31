use std::io;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Logo or font bytes that cannot be read or decoded. Always fatal.
    #[error("cannot load {asset}: {reason}")]
    AssetLoad { asset: &'static str, reason: String },

    #[error("invalid manifest: {0}")]
    Manifest(#[from] serde_json::Error),

    #[error("invalid layout configuration: {0}")]
    Config(String),

    #[error("rendering cancelled after {pages} page(s)")]
    Cancelled { pages: usize },

    #[error("PDF serialization failed: {0}")]
    Pdf(String),
}

/// Why a string could not be measured. Never leaves the layout engine: every
/// caller falls back to a zero width.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeasureError {
    #[error("character {0:?} cannot be encoded by this font")]
    Unencodable(char),
}
