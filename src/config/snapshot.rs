//! Resolved configuration of one snapshot run.

use std::path::{Path, PathBuf};

use super::sources::{BundleOptions, PageReportOptions};

/// Default location of the snapshot artifact, relative to the root.
pub const DEFAULT_OUTPUT: &str = "size-snapshot.json";

/// Everything the aggregator needs, with no ambient defaults left to look up.
///
/// Each source is optional: an absent bundle command, an empty snapshot list
/// or an absent page report simply contributes no records.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SnapshotConfig {
    /// Workspace root. Relative paths below resolve against it and snapshot
    /// keys are expressed relative to it.
    pub root: PathBuf,

    /// Where the artifact is written.
    pub output: PathBuf,

    pub bundle: Option<BundleOptions>,

    /// Snapshot file locations; glob patterns are allowed.
    pub snapshots: Vec<String>,

    pub pages: Option<PageReportOptions>,
}

impl SnapshotConfig {
    /// Configuration with no sources and the default output path.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            output: PathBuf::from(DEFAULT_OUTPUT),
            bundle: None,
            snapshots: Vec::new(),
            pages: None,
        }
    }

    /// Resolve a configured path against the workspace root.
    #[must_use]
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    #[must_use]
    pub fn output_path(&self) -> PathBuf {
        self.resolve(&self.output)
    }
}
