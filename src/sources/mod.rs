//! Size report sources.
//!
//! Each submodule normalizes one report format into canonical
//! [`SizeEntry`](crate::record::SizeEntry) values:
//!
//! - [`bundle_stats`] - the bundler's stats object (per-chunk assets)
//! - [`snapshot_file`] - the bundler plugin's JSON snapshot files
//! - [`page_report`] - the page build's console output

pub mod bundle_stats;
pub mod page_report;
pub mod snapshot_file;

pub use bundle_stats::{BundleStats, collect_bundle_sizes, normalize_stats};
pub use page_report::{PageClassifier, PageKind, PageReportNormalizer, collect_page_sizes};
pub use snapshot_file::{collect_snapshot_sizes, normalize_snapshot};
