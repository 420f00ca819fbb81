//! Snapshot artifact serialization.
//!
//! The artifact is a single JSON object mapping artifact identifiers to size
//! records, pretty-printed with two-space indentation and a trailing newline.
//! [`SnapshotSummary`] condenses a table for the closing console message.

use std::fs;
use std::path::Path;

use humansize::{DECIMAL, format_size};
use log::{debug, info};
use serde::Serialize;

use crate::error::{Result, SnapshotError};
use crate::record::SizeTable;

/// Render a table the way it is stored on disk.
///
/// # Errors
///
/// Returns [`SnapshotError::Serialize`] if serialization fails.
pub fn to_pretty_json(table: &SizeTable) -> Result<String> {
    let mut json = serde_json::to_string_pretty(table)?;
    json.push('\n');
    Ok(json)
}

/// Write the artifact, creating parent directories as needed.
///
/// # Errors
///
/// Returns [`SnapshotError::Write`] on any filesystem failure.
pub fn write_snapshot(path: &Path, table: &SizeTable) -> Result<()> {
    info!("Writing snapshot to: {}", path.display());

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        debug!("Creating parent directories: {}", parent.display());
        fs::create_dir_all(parent).map_err(|source| SnapshotError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let json = to_pretty_json(table)?;
    fs::write(path, &json).map_err(|source| SnapshotError::Write {
        path: path.to_path_buf(),
        source,
    })?;

    info!("Snapshot written ({} bytes)", json.len());
    Ok(())
}

/// Read an artifact back into a table.
///
/// # Errors
///
/// Returns [`SnapshotError::Read`] or [`SnapshotError::Parse`].
pub fn read_snapshot(path: &Path) -> Result<SizeTable> {
    debug!("Reading snapshot from: {}", path.display());

    let content = fs::read_to_string(path).map_err(|source| SnapshotError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&content).map_err(|source| SnapshotError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Totals over a snapshot table.
#[derive(Serialize, Debug, PartialEq, Eq)]
pub struct SnapshotSummary {
    /// Number of identifiers in the table.
    pub entries: usize,

    /// Sum of parsed sizes in bytes.
    pub total_parsed: u64,

    /// Human-readable formatted parsed total.
    pub total_parsed_formatted: String,

    /// Sum of known gzip sizes in bytes.
    pub total_gzip: u64,

    /// Number of entries with an unknown gzip size.
    pub unknown_gzip: usize,
}

impl SnapshotSummary {
    #[must_use]
    pub fn from_table(table: &SizeTable) -> Self {
        let total_parsed = table
            .values()
            .fold(0u64, |total, record| total.saturating_add(record.parsed));

        Self {
            entries: table.len(),
            total_parsed,
            total_parsed_formatted: format_size(total_parsed, DECIMAL),
            total_gzip: table
                .values()
                .filter_map(|record| record.gzip)
                .fold(0u64, u64::saturating_add),
            unknown_gzip: table.values().filter(|record| record.gzip.is_none()).count(),
        }
    }
}
