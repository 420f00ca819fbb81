//! Console page report normalization.
//!
//! The page build prints one line per page and per shared chunk. Each line the
//! [`ReportScanner`] extracts is classified into a [`PageKind`]:
//!
//! 1. the landing page (`/`)
//! 2. the application shell chunk
//! 3. the runtime main chunk (any content hash)
//! 4. the runtime webpack chunk
//! 5. the commons chunk
//! 6. the framework chunk
//! 7. any other chunk, which only has a content hash
//! 8. everything else is a regular page
//!
//! Rules are checked in that order and the first match wins, since rule 7 and
//! rule 8 would also accept the earlier special cases. Hashed chunks (rule 7)
//! get no record of their own; they are summed into a single
//! `<namespace>:chunk:shared` record with a tally. The console output does not
//! report compressed sizes, so every record has an unknown gzip size.

use std::fs;

use log::{debug, info};
use regex::Regex;

use crate::config::{PageReportOptions, PageRules, SnapshotConfig};
use crate::error::{Result, SnapshotError};
use crate::record::{SizeEntry, SizeRecord};
use crate::scanner::ReportScanner;

/// What a report line stands for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageKind<'t> {
    Landing,
    AppShell,
    RuntimeMain,
    RuntimeWebpack,
    CommonsChunk,
    FrameworkChunk,
    /// Hashed chunk without a stable name; pooled, never recorded alone.
    SharedChunk,
    Page(&'t str),
}

impl PageKind<'_> {
    /// Snapshot identifier, or `None` for pooled chunks.
    #[must_use]
    pub fn identifier(&self, namespace: &str) -> Option<String> {
        let id = match self {
            Self::Landing => format!("{namespace}.landing"),
            Self::AppShell => format!("{namespace}.main"),
            Self::RuntimeMain => format!("{namespace}:shared:runtime/main"),
            Self::RuntimeWebpack => format!("{namespace}:shared:runtime/webpack"),
            Self::CommonsChunk => format!("{namespace}:shared:chunk/commons"),
            Self::FrameworkChunk => format!("{namespace}:shared:chunk/framework"),
            Self::SharedChunk => return None,
            Self::Page(url) => format!("{namespace}:{url}"),
        };
        Some(id)
    }
}

/// Identifier of the synthetic record summing all pooled chunks.
#[must_use]
pub fn shared_chunks_identifier(namespace: &str) -> String {
    format!("{namespace}:chunk:shared")
}

/// Compiled [`PageRules`].
#[derive(Debug, Clone)]
pub struct PageClassifier {
    namespace: String,
    landing_url: String,
    app_shell_url: String,
    runtime_main: Regex,
    runtime_webpack: Regex,
    commons_chunk: Regex,
    framework_chunk: Regex,
    shared_chunk: Regex,
}

impl PageClassifier {
    /// Compile the chunk patterns of `rules`.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::InvalidPattern`] if a pattern does not compile.
    pub fn new(rules: &PageRules) -> Result<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|e| SnapshotError::InvalidPattern(e.to_string()))
        };

        Ok(Self {
            namespace: rules.namespace.clone(),
            landing_url: rules.landing_url.clone(),
            app_shell_url: rules.app_shell_url.clone(),
            runtime_main: compile(&rules.runtime_main)?,
            runtime_webpack: compile(&rules.runtime_webpack)?,
            commons_chunk: compile(&rules.commons_chunk)?,
            framework_chunk: compile(&rules.framework_chunk)?,
            shared_chunk: compile(&rules.shared_chunk)?,
        })
    }

    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Classify a page url, first matching rule wins.
    #[must_use]
    pub fn classify<'t>(&self, url: &'t str) -> PageKind<'t> {
        if url == self.landing_url {
            PageKind::Landing
        } else if url == self.app_shell_url {
            PageKind::AppShell
        } else if self.runtime_main.is_match(url) {
            PageKind::RuntimeMain
        } else if self.runtime_webpack.is_match(url) {
            PageKind::RuntimeWebpack
        } else if self.commons_chunk.is_match(url) {
            PageKind::CommonsChunk
        } else if self.framework_chunk.is_match(url) {
            PageKind::FrameworkChunk
        } else if self.shared_chunk.is_match(url) {
            PageKind::SharedChunk
        } else {
            PageKind::Page(url)
        }
    }
}

/// Byte counts of pooled chunks seen during one pass.
#[derive(Debug, Default)]
struct SharedPool(Vec<u64>);

impl SharedPool {
    fn push(&mut self, bytes: u64) {
        self.0.push(bytes);
    }

    fn into_record(self) -> Result<SizeRecord> {
        let tally = u64::try_from(self.0.len()).unwrap_or(u64::MAX);
        let parsed = self.0.iter().try_fold(0u64, |total, &bytes| {
            total
                .checked_add(bytes)
                .ok_or_else(|| SnapshotError::SizeOverflow {
                    magnitude: format!("{total} + {bytes}"),
                    unit: "B".to_string(),
                })
        })?;

        Ok(SizeRecord::aggregate(parsed, tally))
    }
}

/// Scanner plus classifier for one report format.
#[derive(Debug, Clone)]
pub struct PageReportNormalizer {
    scanner: ReportScanner,
    classifier: PageClassifier,
}

impl PageReportNormalizer {
    /// Normalizer using the default report pattern.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::InvalidPattern`] for an invalid rule pattern.
    pub fn new(rules: &PageRules) -> Result<Self> {
        Ok(Self {
            scanner: ReportScanner::page_report()?,
            classifier: PageClassifier::new(rules)?,
        })
    }

    /// Swap the line scanner, keeping the classification rules.
    #[must_use]
    pub fn with_scanner(mut self, scanner: ReportScanner) -> Self {
        self.scanner = scanner;
        self
    }

    /// Turn console text into records, plus the shared chunk aggregate.
    ///
    /// The aggregate is always emitted, with zero size and tally when no
    /// hashed chunk was seen.
    ///
    /// # Errors
    ///
    /// Propagates unit inversion errors for a line with an unknown unit, and
    /// returns [`SnapshotError::SizeOverflow`] if the pooled chunks sum past
    /// `u64::MAX`.
    pub fn normalize(&self, text: &str) -> Result<Vec<SizeEntry>> {
        let namespace = self.classifier.namespace();
        let mut pool = SharedPool::default();
        let mut entries = Vec::new();

        for line in self.scanner.scan(text) {
            let bytes = line.size_bytes()?;
            let kind = self.classifier.classify(line.page_url);
            debug!("{} ({bytes} B) -> {kind:?}", line.page_url);

            match kind.identifier(namespace) {
                Some(id) => entries.push((id, SizeRecord::parsed_only(bytes))),
                None => pool.push(bytes),
            }
        }

        entries.push((shared_chunks_identifier(namespace), pool.into_record()?));
        Ok(entries)
    }
}

/// Read the configured console output and normalize it.
///
/// # Errors
///
/// Returns [`SnapshotError::Read`] if the report cannot be read, plus the
/// errors of [`PageReportNormalizer::new`] and [`PageReportNormalizer::normalize`].
pub fn collect_page_sizes(
    options: &PageReportOptions,
    config: &SnapshotConfig,
) -> Result<Vec<SizeEntry>> {
    let normalizer = PageReportNormalizer::new(&options.rules)?;
    let path = config.resolve(&options.report);

    let text = fs::read_to_string(&path).map_err(|source| SnapshotError::Read {
        path: path.clone(),
        source,
    })?;

    let entries = normalizer.normalize(&text)?;
    info!("Page report {}: {} entries", path.display(), entries.len());

    Ok(entries)
}
