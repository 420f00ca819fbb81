//! Configuration file support.
//!
//! The configuration lives in `size-snapshot.toml` at the workspace root (or at
//! the path given with `--config`). File values serve as defaults that can be
//! overridden by CLI arguments.
//!
//! # Layering
//!
//! The precedence order is: **CLI argument > config file > hardcoded default**.
//!
//! # Example config
//!
//! ```toml
//! output = "size-snapshot.json"
//! threads = 0
//!
//! [bundle]
//! command = ["yarn", "webpack", "--json"]
//! scratch_dir = "build/size-snapshot"
//! compressed_extension = ".gz"
//!
//! [snapshots]
//! paths = ["packages/*/size-snapshot.json"]
//!
//! [pages]
//! report = "build/size-snapshot/docs.next"
//! namespace = "docs"
//! app_shell = "static/pages/_app.js"
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::sources::PageRules;

/// File name of the configuration inside the workspace root.
pub const CONFIG_FILE_NAME: &str = "size-snapshot.toml";

/// Top-level configuration file structure.
///
/// All fields are `Option<T>` so we can detect which values are present in the
/// config file and apply layered configuration (CLI > config file > defaults).
#[derive(Deserialize, Default, Debug)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// Output artifact path
    pub output: Option<PathBuf>,

    /// Number of worker threads (0 = all cores)
    pub threads: Option<usize>,

    #[serde(default)]
    pub bundle: FileBundleConfig,

    #[serde(default)]
    pub snapshots: FileSnapshotsConfig,

    #[serde(default)]
    pub pages: FilePagesConfig,
}

/// Bundle stats options from the configuration file.
#[derive(Deserialize, Default, Debug)]
#[serde(deny_unknown_fields)]
pub struct FileBundleConfig {
    /// Program and arguments printing the stats JSON
    pub command: Option<Vec<String>>,

    pub scratch_dir: Option<PathBuf>,

    pub compressed_extension: Option<String>,
}

/// Snapshot file locations from the configuration file.
#[derive(Deserialize, Default, Debug)]
#[serde(deny_unknown_fields)]
pub struct FileSnapshotsConfig {
    /// Paths or glob patterns relative to the root
    pub paths: Option<Vec<String>>,
}

/// Page report options from the configuration file.
#[derive(Deserialize, Default, Debug)]
#[serde(deny_unknown_fields)]
pub struct FilePagesConfig {
    /// Console output file of the page build
    pub report: Option<PathBuf>,

    pub namespace: Option<String>,

    pub landing: Option<String>,

    pub app_shell: Option<String>,

    /// Overrides of the chunk classification patterns
    #[serde(default)]
    pub patterns: FilePatternsConfig,
}

/// Chunk pattern overrides from the configuration file.
#[derive(Deserialize, Default, Debug)]
#[serde(deny_unknown_fields)]
pub struct FilePatternsConfig {
    pub runtime_main: Option<String>,
    pub runtime_webpack: Option<String>,
    pub commons: Option<String>,
    pub framework: Option<String>,
    pub shared: Option<String>,
}

impl FilePagesConfig {
    /// Classification rules with file overrides applied over the defaults.
    #[must_use]
    pub fn rules(&self) -> PageRules {
        let defaults = PageRules::default();
        let patterns = &self.patterns;

        PageRules {
            namespace: self.namespace.clone().unwrap_or(defaults.namespace),
            landing_url: self.landing.clone().unwrap_or(defaults.landing_url),
            app_shell_url: self.app_shell.clone().unwrap_or(defaults.app_shell_url),
            runtime_main: patterns
                .runtime_main
                .clone()
                .unwrap_or(defaults.runtime_main),
            runtime_webpack: patterns
                .runtime_webpack
                .clone()
                .unwrap_or(defaults.runtime_webpack),
            commons_chunk: patterns.commons.clone().unwrap_or(defaults.commons_chunk),
            framework_chunk: patterns
                .framework
                .clone()
                .unwrap_or(defaults.framework_chunk),
            shared_chunk: patterns.shared.clone().unwrap_or(defaults.shared_chunk),
        }
    }
}

/// Expand a leading `~` in a path to the user's home directory.
///
/// Paths that don't start with `~` are returned unchanged.
#[must_use]
pub fn expand_tilde(path: &Path) -> PathBuf {
    if let Ok(rest) = path.strip_prefix("~")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    path.to_path_buf()
}

impl FileConfig {
    /// Returns the path where the configuration file is expected for `root`.
    #[must_use]
    pub fn config_path(root: &Path) -> PathBuf {
        root.join(CONFIG_FILE_NAME)
    }

    /// Load the configuration for a workspace.
    ///
    /// With `explicit` set, that file must exist. Otherwise the default
    /// location under `root` is used, and a missing file means defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - An explicitly given config file does not exist
    /// - The config file exists but cannot be read
    /// - The config file contains invalid TOML or unexpected fields
    pub fn load(root: &Path, explicit: Option<&Path>) -> anyhow::Result<Self> {
        let path = match explicit {
            Some(path) => {
                if !path.exists() {
                    anyhow::bail!("Config file not found: {}", path.display());
                }
                path.to_path_buf()
            }
            None => {
                let path = Self::config_path(root);
                if !path.exists() {
                    return Ok(Self::default());
                }
                path
            }
        };

        log::debug!("Loading config from {}", path.display());

        let content = std::fs::read_to_string(&path).map_err(|e| {
            anyhow::anyhow!("Failed to read config file at {}: {e}", path.display())
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| {
            anyhow::anyhow!("Failed to parse config file at {}: {e}", path.display())
        })?;

        Ok(config)
    }
}
