//! # size-snapshot
//!
//! A CLI tool that aggregates the size reports of several build tools into a
//! single JSON snapshot, used to track bundle size regressions over time.
//!
//! It reads three report formats:
//!
//! - the bundler's stats object, produced by running a configured command
//! - bundler plugin snapshot files (`size-snapshot.json` next to each package)
//! - the console output of the page build
//!
//! ## Usage
//!
//! ```bash
//! # Use size-snapshot.toml from the current directory
//! size-snapshot
//!
//! # Everything from the command line
//! size-snapshot --bundle-command "yarn webpack --json" \
//!     --snapshot "packages/*/size-snapshot.json" \
//!     --report build/docs.next
//!
//! # Preview without writing
//! size-snapshot --dry-run
//! ```

mod cli;

use std::path::Path;
use std::process::exit;
use std::time::Duration;

use anyhow::{Result, bail};
use clap::Parser;
use cli::{Cli, Commands, ConfigCommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use size_snapshot::{
    aggregator::Aggregator,
    config::{FileConfig, SnapshotConfig},
    output::{SnapshotSummary, to_pretty_json},
};

/// Entry point for the size-snapshot application.
///
/// This function handles all errors gracefully by calling [`inner_main`] and printing
/// any errors to stderr before exiting with a non-zero status code.
fn main() {
    if let Err(err) = inner_main() {
        eprintln!("Error: {err}");

        exit(1);
    }
}

/// Main application logic that can return errors.
///
/// Parses arguments, loads the layered configuration, runs the aggregator and
/// either prints the merged snapshot (dry run) or writes it.
///
/// # Errors
///
/// Returns errors from configuration loading, thread-pool configuration, any
/// size report source, or writing the artifact.
fn inner_main() -> Result<()> {
    let args = Cli::parse();
    init_logging(&args);

    let root = args.root();

    if let Some(Commands::Config { command }) = &args.subcommand {
        return handle_config_command(command, &args);
    }

    let file_config = FileConfig::load(&root, args.config_file().as_deref())?;

    let threads = args.threads(&file_config);
    if threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()?;
    }

    let config = args.snapshot_config(&file_config);
    if config.bundle.is_none() && config.snapshots.is_empty() && config.pages.is_none() {
        log::warn!("No size report source configured; the snapshot will be empty");
    }

    let aggregator = Aggregator::from_config(config)?;
    let progress = spinner(args.quiet() || args.dry_run())?;

    if args.dry_run() {
        let table = aggregator.snapshot()?;
        progress.finish_and_clear();
        print!("{}", to_pretty_json(&table)?);
        return Ok(());
    }

    let table = aggregator.run()?;
    progress.finish_and_clear();

    if !args.quiet() {
        print_summary(&SnapshotSummary::from_table(&table), aggregator.config());
    }

    Ok(())
}

// ── Helper functions ────────────────────────────────────────────────────

/// Initialize `env_logger`; `RUST_LOG` wins over the verbosity flags.
fn init_logging(args: &Cli) {
    let default_level = if args.verbose() {
        "debug"
    } else if args.quiet() {
        "error"
    } else {
        "warn"
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}

/// Spinner shown while the sources run.
fn spinner(hidden: bool) -> Result<ProgressBar> {
    if hidden {
        return Ok(ProgressBar::hidden());
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message("Collecting size reports...");
    pb.enable_steady_tick(Duration::from_millis(100));
    Ok(pb)
}

/// Print the closing summary of a written snapshot.
fn print_summary(summary: &SnapshotSummary, config: &SnapshotConfig) {
    println!(
        "{} {}",
        "📦 Size snapshot written to".green(),
        config.output_path().display().to_string().bold()
    );
    println!(
        "   {} entries, {} parsed in total",
        summary.entries.to_string().bright_white(),
        summary.total_parsed_formatted.bright_white()
    );
    if summary.unknown_gzip > 0 {
        println!(
            "   {}",
            format!("{} entries without a gzip size", summary.unknown_gzip).dimmed()
        );
    }
}

// ── Config subcommand ────────────────────────────────────────────────

/// Default config file template written by `config init`.
const CONFIG_TEMPLATE: &str = r#"# size-snapshot configuration
# Paths are relative to the workspace root. Uncomment and change as needed.

# Where the snapshot is written
# output = "size-snapshot.json"

# Number of worker threads (0 = all CPU cores)
# threads = 0

[bundle]
# Command printing the bundler stats object as JSON on stdout
# command = ["yarn", "webpack", "--json"]

# Directory created before the bundler runs
# scratch_dir = "build/size-snapshot"

# Suffix of the compressed counterpart of each asset
# compressed_extension = ".gz"

[snapshots]
# Bundler plugin snapshot files (paths or glob patterns)
# paths = ["packages/*/size-snapshot.json"]

[pages]
# Console output of the page build
# report = "build/size-snapshot/docs.next"

# Prefix of every page identifier
# namespace = "docs"

# Url of the landing page and of the application shell chunk
# landing = "/"
# app_shell = "static/pages/_app.js"

[pages.patterns]
# Regular expressions classifying shared chunks
# runtime_main = '^runtime/main(?:[.-][^/]+)?\.js$'
# runtime_webpack = '^runtime/webpack(?:[.-][^/]+)?\.js$'
# commons = '^chunks/commons(?:[.-][^/]+)?\.js$'
# framework = '^chunks/framework(?:[.-][^/]+)?\.js$'
# shared = '^chunks/.+\.js$'
"#;

/// Dispatch a `config` subcommand.
fn handle_config_command(cmd: &ConfigCommand, args: &Cli) -> Result<()> {
    match cmd {
        ConfigCommand::Path => println!("{}", args.config_path().display()),
        ConfigCommand::Show => show_config(args)?,
        ConfigCommand::Init => init_config(&args.config_path())?,
    }
    Ok(())
}

/// Print the effective configuration (file values merged with CLI and defaults).
fn show_config(args: &Cli) -> Result<()> {
    let path = args.config_path();
    let file_config = FileConfig::load(&args.root(), args.config_file().as_deref())?;

    if path.exists() {
        println!("Config file: {} (found)", path.display());
    } else {
        println!("Config file: {} (not found - showing defaults)", path.display());
    }

    println!();
    println!(
        "{}",
        format_config(&args.snapshot_config(&file_config), args.threads(&file_config))
    );
    Ok(())
}

/// Format a resolved configuration as a human-readable table.
fn format_config(config: &SnapshotConfig, threads: usize) -> String {
    fn show_path(path: &Path) -> String {
        format!("\"{}\"", path.display())
    }

    let none = || "(none)".to_string();

    let (command, scratch_dir, extension) = config.bundle.as_ref().map_or_else(
        || (none(), none(), none()),
        |b| {
            (
                format!("{:?}", b.command),
                show_path(&b.scratch_dir),
                format!("\"{}\"", b.compressed_extension),
            )
        },
    );

    let (report, namespace, app_shell) = config.pages.as_ref().map_or_else(
        || (none(), none(), none()),
        |p| {
            (
                show_path(&p.report),
                format!("\"{}\"", p.rules.namespace),
                format!("\"{}\"", p.rules.app_shell_url),
            )
        },
    );

    format!(
        "\
root          = {root}
output        = {output}
threads       = {threads}

[bundle]
command              = {command}
scratch_dir          = {scratch_dir}
compressed_extension = {extension}

[snapshots]
paths         = {paths:?}

[pages]
report        = {report}
namespace     = {namespace}
app_shell     = {app_shell}",
        root = show_path(&config.root),
        output = show_path(&config.output),
        paths = config.snapshots,
    )
}

/// Write a default config template to the config file path if it does not exist yet.
fn init_config(path: &Path) -> Result<()> {
    if path.exists() {
        println!("Config file already exists at: {}", path.display());
        println!("Remove it first if you want to regenerate it.");
        return Ok(());
    }

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| {
            anyhow::anyhow!(
                "Failed to create config directory {}: {e}",
                parent.display()
            )
        })?;
    }

    std::fs::write(path, CONFIG_TEMPLATE)
        .map_err(|e| anyhow::anyhow!("Failed to write config file {}: {e}", path.display()))?;

    if toml::from_str::<FileConfig>(CONFIG_TEMPLATE).is_err() {
        bail!("Generated config template is not valid TOML");
    }

    println!("Config file written to: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_template_parses_to_defaults() {
        let config: FileConfig = toml::from_str(CONFIG_TEMPLATE).unwrap();

        assert!(config.output.is_none());
        assert!(config.bundle.command.is_none());
        assert!(config.snapshots.paths.is_none());
        assert!(config.pages.report.is_none());
    }

    #[test]
    fn test_init_config_writes_once() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("size-snapshot.toml");

        init_config(&path).unwrap();
        assert!(path.exists());

        std::fs::write(&path, "output = \"kept.json\"\n").unwrap();
        init_config(&path).unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "output = \"kept.json\"\n"
        );
    }

    #[test]
    fn test_format_config_without_sources() {
        let text = format_config(&SnapshotConfig::new("/ws"), 0);

        assert!(text.contains("root          = \"/ws\""));
        assert!(text.contains("command              = (none)"));
        assert!(text.contains("report        = (none)"));
    }
}
