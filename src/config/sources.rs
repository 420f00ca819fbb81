//! Per-source configuration for the three size report formats.
//!
//! These structs are the explicit inputs of each normalizer. Paths are
//! relative to the workspace root unless they are absolute.

use std::path::PathBuf;

/// Default extension of the compressed counterpart of a bundle asset.
pub const DEFAULT_COMPRESSED_EXTENSION: &str = ".gz";

/// Default scratch directory the bundler writes into.
pub const DEFAULT_SCRATCH_DIR: &str = "build/size-snapshot";

/// Default identifier namespace for page report records.
pub const DEFAULT_NAMESPACE: &str = "docs";

/// Default path of the application shell chunk in the page report.
pub const DEFAULT_APP_SHELL_URL: &str = "static/pages/_app.js";

/// Options for the bundle stats source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BundleOptions {
    /// Command that prints the stats object as JSON on stdout.
    pub command: Vec<String>,

    /// Directory that must exist before the bundler runs.
    pub scratch_dir: PathBuf,

    /// Suffix appended to an asset name to find its compressed counterpart.
    pub compressed_extension: String,
}

impl BundleOptions {
    #[must_use]
    pub fn new(command: Vec<String>) -> Self {
        Self {
            command,
            scratch_dir: PathBuf::from(DEFAULT_SCRATCH_DIR),
            compressed_extension: DEFAULT_COMPRESSED_EXTENSION.to_string(),
        }
    }
}

/// Url classification rules for the page report.
///
/// Checked top to bottom; the first matching rule wins. The chunk patterns
/// are regular expressions matched against the whole url.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageRules {
    /// Prefix of every identifier emitted from the page report.
    pub namespace: String,

    /// Url of the landing page.
    pub landing_url: String,

    /// Url of the application shell chunk.
    pub app_shell_url: String,

    pub runtime_main: String,
    pub runtime_webpack: String,
    pub commons_chunk: String,
    pub framework_chunk: String,

    /// Any other chunk; these only have a content hash and are pooled.
    pub shared_chunk: String,
}

impl Default for PageRules {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            landing_url: "/".to_string(),
            app_shell_url: DEFAULT_APP_SHELL_URL.to_string(),
            runtime_main: r"^runtime/main(?:[.-][^/]+)?\.js$".to_string(),
            runtime_webpack: r"^runtime/webpack(?:[.-][^/]+)?\.js$".to_string(),
            commons_chunk: r"^chunks/commons(?:[.-][^/]+)?\.js$".to_string(),
            framework_chunk: r"^chunks/framework(?:[.-][^/]+)?\.js$".to_string(),
            shared_chunk: r"^chunks/.+\.js$".to_string(),
        }
    }
}

/// Options for the console page report source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageReportOptions {
    /// Text file holding the build tool's console output.
    pub report: PathBuf,

    pub rules: PageRules,
}

impl PageReportOptions {
    #[must_use]
    pub fn new(report: PathBuf) -> Self {
        Self {
            report,
            rules: PageRules::default(),
        }
    }
}
