//! Bundle stats normalization.
//!
//! The bundler reports an ordered list of emitted assets with their sizes, and
//! a mapping from logical chunk name to the asset(s) emitted for it. Every
//! chunk becomes one record keyed by the chunk name: the primary asset gives
//! the parsed size and its compressed counterpart (the asset name plus the
//! compressed extension, `main.js.gz` for `main.js`) gives the gzip size.

use std::collections::{BTreeMap, HashMap};
use std::fs;

use log::{debug, info};
use serde::Deserialize;

use crate::config::{BundleOptions, SnapshotConfig};
use crate::error::{Result, SnapshotError};
use crate::record::{SizeEntry, SizeRecord};
use crate::runner::BuildRunner;

/// The subset of the bundler's stats object this crate reads.
#[derive(Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BundleStats {
    #[serde(default)]
    pub assets: Vec<Asset>,

    #[serde(default)]
    pub assets_by_chunk_name: BTreeMap<String, ChunkAssets>,
}

/// One emitted file.
#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Asset {
    pub name: String,
    pub size: u64,
}

/// Asset(s) emitted for one chunk.
#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(untagged)]
pub enum ChunkAssets {
    Single(String),
    Multiple(Vec<String>),
}

impl ChunkAssets {
    /// The asset measured for the chunk.
    ///
    /// For a chunk with several assets the first one listed is the chunk's
    /// own output; later entries are auxiliary files such as source maps.
    #[must_use]
    pub fn primary(&self) -> Option<&str> {
        match self {
            Self::Single(name) => Some(name),
            Self::Multiple(names) => names.first().map(String::as_str),
        }
    }
}

/// Map a stats object onto one record per chunk.
///
/// # Errors
///
/// Returns [`SnapshotError::EmptyChunk`] if a chunk lists no asset, and
/// [`SnapshotError::MissingAsset`] if its asset or the compressed counterpart
/// is absent from the asset list.
pub fn normalize_stats(stats: &BundleStats, compressed_extension: &str) -> Result<Vec<SizeEntry>> {
    let sizes: HashMap<&str, u64> = stats
        .assets
        .iter()
        .map(|asset| (asset.name.as_str(), asset.size))
        .collect();

    let lookup = |chunk: &str, asset: &str| {
        sizes
            .get(asset)
            .copied()
            .ok_or_else(|| SnapshotError::MissingAsset {
                chunk: chunk.to_string(),
                asset: asset.to_string(),
            })
    };

    stats
        .assets_by_chunk_name
        .iter()
        .map(|(chunk, assets)| {
            if let ChunkAssets::Multiple(names) = assets
                && names.len() > 1
            {
                debug!("Chunk {chunk} has {} assets, measuring {}", names.len(), names[0]);
            }

            let asset = assets
                .primary()
                .ok_or_else(|| SnapshotError::EmptyChunk(chunk.clone()))?;

            let parsed = lookup(chunk, asset)?;
            let gzip = lookup(chunk, &format!("{asset}{compressed_extension}"))?;

            Ok((chunk.clone(), SizeRecord::new(parsed, gzip)))
        })
        .collect()
}

/// Run the bundler and normalize its stats.
///
/// The scratch directory is created first; this is idempotent.
///
/// # Errors
///
/// Fails if the scratch directory cannot be created, if the runner fails, or
/// with the errors of [`normalize_stats`].
pub fn collect_bundle_sizes(
    runner: &dyn BuildRunner,
    options: &BundleOptions,
    config: &SnapshotConfig,
) -> Result<Vec<SizeEntry>> {
    let scratch_dir = config.resolve(&options.scratch_dir);
    fs::create_dir_all(&scratch_dir).map_err(|source| SnapshotError::Write {
        path: scratch_dir.clone(),
        source,
    })?;

    info!("Running bundler for stats");
    let stats = runner.run()?;
    let entries = normalize_stats(&stats, &options.compressed_extension)?;
    info!("Bundle stats: {} chunks", entries.len());

    Ok(entries)
}
