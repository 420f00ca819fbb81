//! # size-snapshot
//!
//! Library behind the `size-snapshot` binary. It normalizes the size reports
//! of several build tools into one table of [`SizeRecord`]s keyed by artifact
//! identifier, and writes that table as a JSON snapshot.
//!
//! ## Modules
//!
//! - [`sources`] - normalizers for bundle stats, snapshot files and page reports
//! - [`scanner`] - the page report line scanner
//! - [`aggregator`] - concurrent collection, merge and write
//! - [`config`] - resolved options and the TOML config file
//! - [`runner`] - the build runner seam around the bundler
//! - [`output`] - artifact serialization and summaries
//! - [`utils`] - unit inversion and path helpers

pub mod aggregator;
pub mod config;
pub mod error;
pub mod output;
pub mod record;
pub mod runner;
pub mod scanner;
pub mod sources;
pub mod utils;

pub use aggregator::{Aggregator, merge};
pub use config::SnapshotConfig;
pub use error::{Result, SnapshotError};
pub use record::{SizeEntry, SizeRecord, SizeTable};
pub use runner::{BuildRunner, CommandRunner};
