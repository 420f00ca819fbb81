//! Bundler plugin snapshot normalization.
//!
//! The bundler plugin writes a JSON file next to the package it built, keyed by
//! bundle paths relative to that file:
//!
//! ```json
//! { "./dist/x.js": { "bundled": 400, "minified": 100, "gzipped": 40 } }
//! ```
//!
//! Keys are re-expressed relative to the workspace root, so the entry above in
//! `packages/x/size-snapshot.json` becomes `packages/x/dist/x.js`.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};
use rayon::prelude::*;
use serde::Deserialize;

use crate::config::SnapshotConfig;
use crate::error::{Result, SnapshotError};
use crate::record::{SizeEntry, SizeRecord};
use crate::utils::relative_to;

#[derive(Deserialize, Debug)]
struct SnapshotEntry {
    minified: u64,
    gzipped: u64,
}

/// Read one snapshot file and re-key its entries relative to `root`.
///
/// `root` and `snapshot_path` must both be absolute or both relative to the
/// same directory.
///
/// # Errors
///
/// Returns [`SnapshotError::Read`] if the file cannot be read and
/// [`SnapshotError::Parse`] if it is not a snapshot object.
pub fn normalize_snapshot(root: &Path, snapshot_path: &Path) -> Result<Vec<SizeEntry>> {
    let content = fs::read_to_string(snapshot_path).map_err(|source| SnapshotError::Read {
        path: snapshot_path.to_path_buf(),
        source,
    })?;

    let snapshot: BTreeMap<String, SnapshotEntry> =
        serde_json::from_str(&content).map_err(|source| SnapshotError::Parse {
            path: snapshot_path.to_path_buf(),
            source,
        })?;

    let snapshot_dir = snapshot_path.parent().unwrap_or_else(|| Path::new(""));

    let entries: Vec<SizeEntry> = snapshot
        .into_iter()
        .map(|(bundle, entry)| {
            let key = relative_to(&snapshot_dir.join(&bundle), root);
            debug!("{bundle} -> {key}");
            (key, SizeRecord::new(entry.minified, entry.gzipped))
        })
        .collect();

    info!(
        "Snapshot {}: {} bundles",
        snapshot_path.display(),
        entries.len()
    );

    Ok(entries)
}

/// Expand configured locations into snapshot file paths.
///
/// Plain paths are kept even when missing so reading them reports the error.
/// Glob patterns expand to their sorted matches, possibly none. Only the
/// configured location is glob syntax; the root is matched literally.
///
/// # Errors
///
/// Returns [`SnapshotError::InvalidPattern`] for a malformed glob and
/// [`SnapshotError::Read`] if a directory cannot be read while expanding.
pub fn expand_locations(config: &SnapshotConfig) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();

    for location in &config.snapshots {
        if !is_glob(location) {
            paths.push(config.resolve(Path::new(location)));
            continue;
        }

        let pattern = glob_pattern(config, location);
        let matches = glob::glob(&pattern)
            .map_err(|e| SnapshotError::InvalidPattern(format!("{location}: {e}")))?;

        let mut expanded = Vec::new();
        for entry in matches {
            let path = entry.map_err(|e| SnapshotError::Read {
                path: e.path().to_path_buf(),
                source: e.into_error(),
            })?;
            expanded.push(path);
        }
        expanded.sort();

        if expanded.is_empty() {
            debug!("Snapshot pattern {location} matched nothing");
        }
        paths.extend(expanded);
    }

    Ok(paths)
}

fn glob_pattern(config: &SnapshotConfig, location: &str) -> String {
    if Path::new(location).is_absolute() {
        return location.to_string();
    }

    let root = glob::Pattern::escape(&config.root.to_string_lossy());
    Path::new(&root).join(location).to_string_lossy().into_owned()
}

fn is_glob(location: &str) -> bool {
    location.contains(['*', '?', '['])
}

/// Normalize every configured snapshot in parallel, flattened in location order.
///
/// # Errors
///
/// Returns the first error of [`expand_locations`] or [`normalize_snapshot`].
pub fn collect_snapshot_sizes(config: &SnapshotConfig) -> Result<Vec<SizeEntry>> {
    let locations = expand_locations(config)?;

    let per_file: Vec<Vec<SizeEntry>> = locations
        .par_iter()
        .map(|path| normalize_snapshot(&config.root, path))
        .collect::<Result<_>>()?;

    Ok(per_file.into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_key_is_resolved_against_root() {
        let dir = tempfile::TempDir::new().unwrap();
        let snapshot = dir.path().join("packages/x/size-snapshot.json");
        write(
            &snapshot,
            r#"{"./dist/x.js": {"minified": 100, "gzipped": 40}}"#,
        );

        let entries = normalize_snapshot(dir.path(), &snapshot).unwrap();

        assert_eq!(
            entries,
            vec![("packages/x/dist/x.js".to_string(), SizeRecord::new(100, 40))]
        );
    }

    #[test]
    fn test_relative_root_and_snapshot() {
        let dir = tempfile::TempDir::new().unwrap();
        write(
            &dir.path().join("pkg/size-snapshot.json"),
            r#"{"../shared/a.js": {"minified": 1, "gzipped": 1}}"#,
        );
        let config = SnapshotConfig::new(dir.path());
        let snapshot = config.resolve(Path::new("pkg/size-snapshot.json"));

        let entries = normalize_snapshot(&config.root, &snapshot).unwrap();
        assert_eq!(entries[0].0, "shared/a.js");
    }

    #[test]
    fn test_extra_fields_are_ignored() {
        let dir = tempfile::TempDir::new().unwrap();
        let snapshot = dir.path().join("size-snapshot.json");
        write(
            &snapshot,
            r#"{"dist/a.js": {"bundled": 900, "minified": 300, "gzipped": 90}}"#,
        );

        let entries = normalize_snapshot(dir.path(), &snapshot).unwrap();
        assert_eq!(entries, vec![("dist/a.js".to_string(), SizeRecord::new(300, 90))]);
    }

    #[test]
    fn test_malformed_snapshot_is_parse_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let snapshot = dir.path().join("size-snapshot.json");
        write(&snapshot, r#"{"dist/a.js": {"minified": "big"}}"#);

        let err = normalize_snapshot(dir.path(), &snapshot).unwrap_err();
        assert!(matches!(err, SnapshotError::Parse { .. }));
    }

    #[test]
    fn test_missing_snapshot_is_read_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = normalize_snapshot(dir.path(), &dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, SnapshotError::Read { .. }));
    }

    #[test]
    fn test_expand_locations_with_glob() {
        let dir = tempfile::TempDir::new().unwrap();
        write(&dir.path().join("packages/b/size-snapshot.json"), "{}");
        write(&dir.path().join("packages/a/size-snapshot.json"), "{}");
        write(&dir.path().join("packages/c/other.json"), "{}");

        let mut config = SnapshotConfig::new(dir.path());
        config.snapshots = vec!["packages/*/size-snapshot.json".to_string()];

        let paths = expand_locations(&config).unwrap();
        assert_eq!(
            paths,
            vec![
                dir.path().join("packages/a/size-snapshot.json"),
                dir.path().join("packages/b/size-snapshot.json"),
            ]
        );
    }

    #[test]
    fn test_glob_under_root_with_pattern_characters() {
        let dir = tempfile::TempDir::new().unwrap();
        let root = dir.path().join("ws[1]");
        write(
            &root.join("packages/x/size-snapshot.json"),
            r#"{"./dist/x.js": {"minified": 100, "gzipped": 40}}"#,
        );

        let mut config = SnapshotConfig::new(&root);
        config.snapshots = vec!["packages/*/size-snapshot.json".to_string()];

        assert_eq!(
            expand_locations(&config).unwrap(),
            vec![root.join("packages/x/size-snapshot.json")]
        );
        assert_eq!(
            collect_snapshot_sizes(&config).unwrap(),
            vec![("packages/x/dist/x.js".to_string(), SizeRecord::new(100, 40))]
        );
    }

    #[test]
    fn test_expand_locations_glob_without_match() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut config = SnapshotConfig::new(dir.path());
        config.snapshots = vec!["packages/*/size-snapshot.json".to_string()];

        assert!(expand_locations(&config).unwrap().is_empty());
    }

    #[test]
    fn test_expand_locations_keeps_missing_literal() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut config = SnapshotConfig::new(dir.path());
        config.snapshots = vec!["missing/size-snapshot.json".to_string()];

        assert_eq!(expand_locations(&config).unwrap().len(), 1);
        assert!(collect_snapshot_sizes(&config).is_err());
    }

    #[test]
    fn test_invalid_glob_is_rejected() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut config = SnapshotConfig::new(dir.path());
        config.snapshots = vec!["packages/[/size-snapshot.json".to_string()];

        assert!(matches!(
            expand_locations(&config),
            Err(SnapshotError::InvalidPattern(_))
        ));
    }

    #[test]
    fn test_collect_flattens_in_location_order() {
        let dir = tempfile::TempDir::new().unwrap();
        write(
            &dir.path().join("one/size-snapshot.json"),
            r#"{"a.js": {"minified": 1, "gzipped": 1}}"#,
        );
        write(
            &dir.path().join("two/size-snapshot.json"),
            r#"{"b.js": {"minified": 2, "gzipped": 2}, "c.js": {"minified": 3, "gzipped": 3}}"#,
        );

        let mut config = SnapshotConfig::new(dir.path());
        config.snapshots = vec![
            "two/size-snapshot.json".to_string(),
            "one/size-snapshot.json".to_string(),
        ];

        let keys: Vec<_> = collect_snapshot_sizes(&config)
            .unwrap()
            .into_iter()
            .map(|(key, _)| key)
            .collect();
        assert_eq!(keys, vec!["two/b.js", "two/c.js", "one/a.js"]);
    }
}
