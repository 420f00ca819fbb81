//! Error types for the snapshot library.
//!
//! Library code returns [`SnapshotError`]; the binary wraps it in
//! `anyhow` at the application boundary.

use std::path::PathBuf;

use thiserror::Error;

/// Everything that can abort a snapshot run.
#[derive(Error, Debug)]
pub enum SnapshotError {
    /// The unit prefix is not one of `k`, `M`, `G`, `T`, `P` (or empty).
    #[error("unrecognized unit '{0}'")]
    InvalidUnit(String),

    /// The magnitude is not a plain non-negative decimal number.
    #[error("invalid size magnitude '{0}'")]
    InvalidMagnitude(String),

    /// The byte count does not fit in a `u64`.
    #[error("size overflow: {magnitude} {unit}")]
    SizeOverflow { magnitude: String, unit: String },

    /// A chunk references an asset absent from the stats asset list.
    #[error("chunk '{chunk}' references missing asset '{asset}'")]
    MissingAsset { chunk: String, asset: String },

    /// A chunk lists no assets at all.
    #[error("chunk '{0}' lists no assets")]
    EmptyChunk(String),

    /// The build runner failed to produce a stats object.
    #[error("build runner failed: {0}")]
    BuildRunner(String),

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// A scanner or chunk pattern, or a snapshot glob, is malformed.
    #[error("invalid pattern: {0}")]
    InvalidPattern(String),

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to serialize snapshot: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result alias used across the library.
pub type Result<T> = std::result::Result<T, SnapshotError>;
