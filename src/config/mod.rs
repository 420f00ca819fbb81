//! Configuration for a snapshot run.
//!
//! - [`file`] loads the optional `size-snapshot.toml`
//! - [`sources`] holds the options of each size report source
//! - [`snapshot`] holds the fully resolved [`SnapshotConfig`]

pub mod file;
pub mod snapshot;
pub mod sources;

pub use file::FileConfig;
pub use snapshot::{DEFAULT_OUTPUT, SnapshotConfig};
pub use sources::{BundleOptions, PageReportOptions, PageRules};
