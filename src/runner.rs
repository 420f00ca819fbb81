//! Build runner abstraction.
//!
//! The bundler is a black box that produces a stats object. [`CommandRunner`]
//! spawns it as a child process and deserializes the stats straight from its
//! stdout, so the (potentially very large) raw stats never touch the disk.

use std::io::BufReader;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use log::{debug, warn};

use crate::error::{Result, SnapshotError};
use crate::sources::bundle_stats::BundleStats;

/// Produces a bundle stats object.
pub trait BuildRunner: Send + Sync {
    /// Run the build and return its stats.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::BuildRunner`] when no stats can be produced.
    fn run(&self) -> Result<BundleStats>;
}

impl<F> BuildRunner for F
where
    F: Fn() -> Result<BundleStats> + Send + Sync,
{
    fn run(&self) -> Result<BundleStats> {
        self()
    }
}

/// Runs an external command that prints the stats JSON on stdout.
///
/// The child's stderr is inherited so build diagnostics stay visible.
#[derive(Debug, Clone)]
pub struct CommandRunner {
    program: String,
    args: Vec<String>,
    cwd: PathBuf,
}

impl CommandRunner {
    /// Create a runner from a program-and-arguments list.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::BuildRunner`] if `command` is empty.
    pub fn new(command: &[String], cwd: impl Into<PathBuf>) -> Result<Self> {
        let (program, args) = command
            .split_first()
            .ok_or_else(|| SnapshotError::BuildRunner("empty build command".to_string()))?;

        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
            cwd: cwd.into(),
        })
    }
}

impl BuildRunner for CommandRunner {
    fn run(&self) -> Result<BundleStats> {
        debug!(
            "Spawning `{} {}` in {}",
            self.program,
            self.args.join(" "),
            self.cwd.display()
        );

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .current_dir(&self.cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| {
                SnapshotError::BuildRunner(format!("failed to spawn `{}`: {e}", self.program))
            })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| SnapshotError::BuildRunner("stdout was not captured".to_string()))?;

        let parsed = serde_json::from_reader::<_, BundleStats>(BufReader::new(stdout));

        // a child blocked on a full pipe would never exit
        if parsed.is_err()
            && let Err(e) = child.kill()
        {
            warn!("Failed to kill `{}`: {e}", self.program);
        }

        let status = child.wait().map_err(|e| {
            SnapshotError::BuildRunner(format!("failed to wait for `{}`: {e}", self.program))
        })?;

        let stats = parsed.map_err(|e| {
            SnapshotError::BuildRunner(format!("`{}` printed invalid stats: {e}", self.program))
        })?;

        if !status.success() {
            return Err(SnapshotError::BuildRunner(format!(
                "`{}` exited with {status}",
                self.program
            )));
        }

        Ok(stats)
    }
}
