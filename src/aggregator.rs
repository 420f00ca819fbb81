//! Snapshot aggregation.
//!
//! The [`Aggregator`] runs the three source families concurrently, merges
//! their records into one [`SizeTable`] and writes the artifact. Sources have no
//! data dependency on each other; the merge only starts once all of them have
//! finished, and nothing is written if any of them failed.

use std::fmt;

use log::{debug, info};

use crate::config::SnapshotConfig;
use crate::error::{Result, SnapshotError};
use crate::output::write_snapshot;
use crate::record::{SizeEntry, SizeTable};
use crate::runner::{BuildRunner, CommandRunner};
use crate::sources::{collect_bundle_sizes, collect_page_sizes, collect_snapshot_sizes};

/// Fold entries into a table. On a duplicate identifier the later entry wins.
pub fn merge(entries: impl IntoIterator<Item = SizeEntry>) -> SizeTable {
    let mut table = SizeTable::new();

    for (id, record) in entries {
        if let Some(previous) = table.insert(id.clone(), record) {
            debug!("Identifier {id} collided, {previous:?} overwritten by {record:?}");
        }
    }

    table
}

/// Runs every configured source and produces the snapshot.
pub struct Aggregator {
    config: SnapshotConfig,
    runner: Option<Box<dyn BuildRunner>>,
}

impl fmt::Debug for Aggregator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Aggregator")
            .field("config", &self.config)
            .field("runner", &self.runner.is_some())
            .finish()
    }
}

impl Aggregator {
    /// Aggregator without a build runner.
    #[must_use]
    pub fn new(config: SnapshotConfig) -> Self {
        Self {
            config,
            runner: None,
        }
    }

    /// Aggregator that spawns the configured bundle command, if any.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::BuildRunner`] if the configured command is empty.
    pub fn from_config(config: SnapshotConfig) -> Result<Self> {
        let runner = match &config.bundle {
            Some(bundle) => Some(Box::new(CommandRunner::new(&bundle.command, &config.root)?)
                as Box<dyn BuildRunner>),
            None => None,
        };

        Ok(Self { config, runner })
    }

    /// Use `runner` to produce bundle stats.
    #[must_use]
    pub fn with_runner(mut self, runner: impl BuildRunner + 'static) -> Self {
        self.runner = Some(Box::new(runner));
        self
    }

    #[must_use]
    pub const fn config(&self) -> &SnapshotConfig {
        &self.config
    }

    /// Run all sources concurrently and concatenate their records.
    ///
    /// Order: bundle stats, snapshot files, page report.
    ///
    /// # Errors
    ///
    /// Returns the first error of any source, checked in that same order.
    pub fn collect(&self) -> Result<Vec<SizeEntry>> {
        let (bundle, (snapshots, pages)) = rayon::join(
            || self.collect_bundle(),
            || rayon::join(|| collect_snapshot_sizes(&self.config), || self.collect_pages()),
        );

        let mut entries = bundle?;
        entries.extend(snapshots?);
        entries.extend(pages?);
        Ok(entries)
    }

    /// Collect and merge without writing anything.
    ///
    /// # Errors
    ///
    /// See [`Aggregator::collect`].
    pub fn snapshot(&self) -> Result<SizeTable> {
        let entries = self.collect()?;
        let collected = entries.len();
        let table = merge(entries);
        info!("Merged {collected} records into {} entries", table.len());
        Ok(table)
    }

    /// Collect, merge and write the artifact to the configured output.
    ///
    /// # Errors
    ///
    /// Any source error aborts before the artifact is touched; write errors
    /// are reported as [`SnapshotError::Write`].
    pub fn run(&self) -> Result<SizeTable> {
        let table = self.snapshot()?;
        write_snapshot(&self.config.output_path(), &table)?;
        Ok(table)
    }

    fn collect_bundle(&self) -> Result<Vec<SizeEntry>> {
        match (&self.config.bundle, &self.runner) {
            (Some(options), Some(runner)) => {
                collect_bundle_sizes(runner.as_ref(), options, &self.config)
            }
            (Some(_), None) => Err(SnapshotError::BuildRunner(
                "bundle stats configured without a build runner".to_string(),
            )),
            (None, _) => Ok(Vec::new()),
        }
    }

    fn collect_pages(&self) -> Result<Vec<SizeEntry>> {
        self.config
            .pages
            .as_ref()
            .map_or_else(|| Ok(Vec::new()), |options| collect_page_sizes(options, &self.config))
    }
}
