//! Command-line interface definition and argument parsing.
//!
//! This module defines all command-line arguments and options using the
//! [clap](https://docs.rs/clap/) library.
//!
//! Helper methods on [`Cli`] accept a [`FileConfig`] reference so that config-file
//! values act as defaults that CLI arguments can override (layered config).

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use size_snapshot::config::file::{FileConfig, expand_tilde};
use size_snapshot::config::sources::{DEFAULT_COMPRESSED_EXTENSION, DEFAULT_SCRATCH_DIR};
use size_snapshot::config::{BundleOptions, DEFAULT_OUTPUT, PageReportOptions, SnapshotConfig};

/// Command-line arguments selecting the size report sources.
///
/// Each source overrides or extends the matching section of the config file.
#[derive(Parser)]
struct SourceArgs {
    /// Command printing the bundler stats JSON, e.g. "yarn webpack --json"
    ///
    /// Split on whitespace with no quoting, so no argument can contain a space.
    /// For such arguments use the `bundle.command` array in size-snapshot.toml,
    /// which this option overrides.
    #[arg(long, conflicts_with = "skip_bundle")]
    bundle_command: Option<String>,

    /// Do not run the bundler, even if a command is configured
    #[arg(long)]
    skip_bundle: bool,

    /// Bundler plugin snapshot file (path or glob, relative to the root)
    ///
    /// Can be specified multiple times. Added to `snapshots.paths` from the
    /// config file.
    #[arg(long = "snapshot", action = clap::ArgAction::Append)]
    snapshots: Vec<String>,

    /// Console output of the page build
    ///
    /// Overrides `pages.report` from the config file.
    #[arg(long)]
    report: Option<PathBuf>,
}

/// Command-line arguments controlling how the run behaves.
#[derive(Parser)]
struct ExecutionArgs {
    /// The number of worker threads
    ///
    /// A value of 0 uses the default number of threads (typically the number of CPU cores).
    #[arg(short = 't', long)]
    threads: Option<usize>,

    /// Print the merged snapshot to stdout instead of writing it
    #[arg(long)]
    dry_run: bool,

    /// Only print errors
    #[arg(short = 'q', long, conflicts_with = "verbose")]
    quiet: bool,

    /// Log every classified line and file access
    ///
    /// `RUST_LOG` takes precedence when set.
    #[arg(short = 'v', long)]
    verbose: bool,
}

/// Top-level subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Inspect or initialise the configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Subcommands for `config`.
#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Print the effective configuration (file values + defaults for unset keys)
    Show,
    /// Write a default size-snapshot.toml if none exists yet
    Init,
    /// Print the path to the config file
    Path,
}

/// Main command-line interface structure.
///
/// Helper methods accept a [`FileConfig`] reference so that config-file values act as
/// defaults when the corresponding CLI argument is not provided.
#[derive(Parser)]
#[command(name = "size-snapshot")]
#[command(about = "Aggregate bundle size reports into a single size snapshot")]
#[command(version)]
#[command(author)]
pub struct Cli {
    /// Subcommand (e.g. `config`)
    #[command(subcommand)]
    pub subcommand: Option<Commands>,

    /// Workspace root; relative paths and snapshot keys resolve against it
    #[arg(short = 'r', long, default_value = ".")]
    root: PathBuf,

    /// Config file (defaults to <root>/size-snapshot.toml)
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Where to write the snapshot, relative to the root
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Source options
    #[command(flatten)]
    sources: SourceArgs,

    /// Execution options
    #[command(flatten)]
    execution: ExecutionArgs,
}

impl Cli {
    /// The workspace root, with `~` expanded.
    #[must_use]
    pub fn root(&self) -> PathBuf {
        expand_tilde(&self.root)
    }

    /// The explicitly requested config file, if any.
    #[must_use]
    pub fn config_file(&self) -> Option<PathBuf> {
        self.config.as_deref().map(expand_tilde)
    }

    /// The config file in effect: explicit, or the default under the root.
    #[must_use]
    pub fn config_path(&self) -> PathBuf {
        self.config_file()
            .unwrap_or_else(|| FileConfig::config_path(&self.root()))
    }

    #[must_use]
    pub const fn dry_run(&self) -> bool {
        self.execution.dry_run
    }

    #[must_use]
    pub const fn quiet(&self) -> bool {
        self.execution.quiet
    }

    #[must_use]
    pub const fn verbose(&self) -> bool {
        self.execution.verbose
    }

    /// Worker threads: CLI > config > `0` (all cores).
    #[must_use]
    pub fn threads(&self, config: &FileConfig) -> usize {
        self.execution.threads.or(config.threads).unwrap_or(0)
    }

    /// Build the resolved snapshot configuration.
    ///
    /// - **output**: CLI > config > `size-snapshot.json`
    /// - **bundle**: `--skip-bundle` disables it, otherwise CLI command > config command
    /// - **snapshots**: merged from both sources (config values first, then CLI)
    /// - **pages**: CLI report > config report; rules come from the config
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use clap::Parser;
    /// # use size_snapshot::config::FileConfig;
    /// # mod cli { include!("cli.rs"); }
    /// # use cli::Cli;
    /// let args = Cli::parse_from(&["size-snapshot", "--report", "build/docs.next"]);
    /// let config = args.snapshot_config(&FileConfig::default());
    /// assert!(config.pages.is_some());
    /// ```
    #[must_use]
    pub fn snapshot_config(&self, config: &FileConfig) -> SnapshotConfig {
        let mut snapshot = SnapshotConfig::new(self.root());

        snapshot.output = self
            .output
            .clone()
            .or_else(|| config.output.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));

        snapshot.bundle = self.bundle_options(config);

        let mut snapshots = config.snapshots.paths.clone().unwrap_or_default();
        snapshots.extend(self.sources.snapshots.clone());
        snapshot.snapshots = snapshots;

        snapshot.pages = self
            .sources
            .report
            .clone()
            .or_else(|| config.pages.report.clone())
            .map(|report| PageReportOptions {
                report,
                rules: config.pages.rules(),
            });

        snapshot
    }

    fn bundle_options(&self, config: &FileConfig) -> Option<BundleOptions> {
        if self.sources.skip_bundle {
            return None;
        }

        let command = self
            .sources
            .bundle_command
            .as_deref()
            .map(|command| command.split_whitespace().map(str::to_string).collect())
            .or_else(|| config.bundle.command.clone())?;

        Some(BundleOptions {
            command,
            scratch_dir: config
                .bundle
                .scratch_dir
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SCRATCH_DIR)),
            compressed_extension: config
                .bundle
                .compressed_extension
                .clone()
                .unwrap_or_else(|| DEFAULT_COMPRESSED_EXTENSION.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use size_snapshot::config::PageRules;
    use size_snapshot::config::file::{FileBundleConfig, FilePagesConfig, FileSnapshotsConfig};

    #[test]
    fn test_default_values() {
        let args = Cli::parse_from(["size-snapshot"]);
        let config = FileConfig::default();

        assert_eq!(args.root(), PathBuf::from("."));
        assert!(args.config_file().is_none());
        assert_eq!(args.config_path(), PathBuf::from("./size-snapshot.toml"));
        assert_eq!(args.threads(&config), 0);
        assert!(!args.dry_run());
        assert!(!args.quiet());
        assert!(!args.verbose());

        let snapshot = args.snapshot_config(&config);
        assert_eq!(snapshot.output, PathBuf::from("size-snapshot.json"));
        assert!(snapshot.bundle.is_none());
        assert!(snapshot.snapshots.is_empty());
        assert!(snapshot.pages.is_none());
    }

    #[test]
    fn test_cli_sources() {
        let args = Cli::parse_from([
            "size-snapshot",
            "--root",
            "/ws",
            "--bundle-command",
            "yarn webpack --json",
            "--snapshot",
            "packages/a/size-snapshot.json",
            "--snapshot",
            "packages/b/size-snapshot.json",
            "--report",
            "build/docs.next",
        ]);
        let snapshot = args.snapshot_config(&FileConfig::default());

        assert_eq!(snapshot.root, PathBuf::from("/ws"));
        let bundle = snapshot.bundle.unwrap();
        assert_eq!(bundle.command, vec!["yarn", "webpack", "--json"]);
        assert_eq!(bundle.compressed_extension, ".gz");
        assert_eq!(snapshot.snapshots.len(), 2);
        let pages = snapshot.pages.unwrap();
        assert_eq!(pages.report, PathBuf::from("build/docs.next"));
        assert_eq!(pages.rules, PageRules::default());
    }

    #[test]
    fn test_config_file_values_are_used() {
        let args = Cli::parse_from(["size-snapshot"]);
        let config = FileConfig {
            output: Some(PathBuf::from("out.json")),
            threads: Some(2),
            bundle: FileBundleConfig {
                command: Some(vec!["webpack".to_string(), "--json".to_string()]),
                scratch_dir: Some(PathBuf::from("tmp")),
                compressed_extension: None,
            },
            snapshots: FileSnapshotsConfig {
                paths: Some(vec!["a/size-snapshot.json".to_string()]),
            },
            pages: FilePagesConfig {
                report: Some(PathBuf::from("docs.next")),
                namespace: Some("site".to_string()),
                ..FilePagesConfig::default()
            },
        };

        assert_eq!(args.threads(&config), 2);

        let snapshot = args.snapshot_config(&config);
        assert_eq!(snapshot.output, PathBuf::from("out.json"));
        assert_eq!(snapshot.bundle.unwrap().scratch_dir, PathBuf::from("tmp"));
        assert_eq!(snapshot.snapshots, vec!["a/size-snapshot.json"]);
        assert_eq!(snapshot.pages.unwrap().rules.namespace, "site");
    }

    #[test]
    fn test_cli_overrides_config() {
        let args = Cli::parse_from([
            "size-snapshot",
            "-o",
            "cli.json",
            "-t",
            "8",
            "--report",
            "cli.next",
            "--snapshot",
            "cli/size-snapshot.json",
        ]);
        let config = FileConfig {
            output: Some(PathBuf::from("file.json")),
            threads: Some(2),
            snapshots: FileSnapshotsConfig {
                paths: Some(vec!["file/size-snapshot.json".to_string()]),
            },
            pages: FilePagesConfig {
                report: Some(PathBuf::from("file.next")),
                ..FilePagesConfig::default()
            },
            ..FileConfig::default()
        };

        assert_eq!(args.threads(&config), 8);

        let snapshot = args.snapshot_config(&config);
        assert_eq!(snapshot.output, PathBuf::from("cli.json"));
        assert_eq!(
            snapshot.snapshots,
            vec!["file/size-snapshot.json", "cli/size-snapshot.json"]
        );
        assert_eq!(snapshot.pages.unwrap().report, PathBuf::from("cli.next"));
    }

    #[test]
    fn test_skip_bundle_disables_configured_command() {
        let args = Cli::parse_from(["size-snapshot", "--skip-bundle"]);
        let config = FileConfig {
            bundle: FileBundleConfig {
                command: Some(vec!["webpack".to_string()]),
                ..FileBundleConfig::default()
            },
            ..FileConfig::default()
        };

        assert!(args.snapshot_config(&config).bundle.is_none());
    }

    #[test]
    fn test_skip_bundle_conflicts_with_command() {
        let result = Cli::try_parse_from([
            "size-snapshot",
            "--skip-bundle",
            "--bundle-command",
            "webpack",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_bundle_command_is_split_without_quoting() {
        let args = Cli::parse_from([
            "size-snapshot",
            "--bundle-command",
            "node \"build stats.js\"",
        ]);
        let bundle = args.snapshot_config(&FileConfig::default()).bundle.unwrap();

        assert_eq!(bundle.command, vec!["node", "\"build", "stats.js\""]);

        let help = Cli::command()
            .get_arguments()
            .find(|arg| arg.get_id() == "bundle_command")
            .and_then(|arg| arg.get_long_help().map(ToString::to_string))
            .unwrap();
        assert!(help.contains("bundle.command"));
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["size-snapshot", "-q", "-v"]).is_err());
    }

    #[test]
    fn test_explicit_config_path() {
        let args = Cli::parse_from(["size-snapshot", "--config", "ci/size.toml"]);

        assert_eq!(args.config_file(), Some(PathBuf::from("ci/size.toml")));
        assert_eq!(args.config_path(), PathBuf::from("ci/size.toml"));
    }

    #[test]
    fn test_config_subcommands_parse() {
        let args = Cli::parse_from(["size-snapshot", "config", "show"]);
        assert!(matches!(
            args.subcommand,
            Some(Commands::Config {
                command: ConfigCommand::Show
            })
        ));

        let args = Cli::parse_from(["size-snapshot", "config", "init"]);
        assert!(matches!(
            args.subcommand,
            Some(Commands::Config {
                command: ConfigCommand::Init
            })
        ));
    }

    #[test]
    fn test_dry_run_flag() {
        let args = Cli::parse_from(["size-snapshot", "--dry-run"]);
        assert!(args.dry_run());
    }
}
