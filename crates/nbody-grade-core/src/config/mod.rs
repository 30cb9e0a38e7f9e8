//! Grader configuration
//!
//! Configuration lives in `nbody-grade.toml`. Every field has a default, so a
//! missing file is equivalent to an empty one.

pub mod types;

use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::catalog::SimulatorVersion;
use crate::error::{GradeError, Result};

pub use types::{
    GraderConfig, PathsConfig, RunnerConfig, DEFAULT_LAUNCHER, DEFAULT_PROGRAM,
    DEFAULT_TIMEOUT_SECS,
};

/// File name looked up in the working directory when no path is given
pub const CONFIG_FILE: &str = "nbody-grade.toml";

impl GraderConfig {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|e| GradeError::io("read config", path, e))?;
        Self::parse(&content, path)
    }

    fn parse(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|e| GradeError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Load `explicit` if given, else `nbody-grade.toml` in `dir` if present,
    /// else defaults.
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        let candidate = dir.join(CONFIG_FILE);
        if candidate.exists() {
            tracing::debug!(path = %candidate.display(), "loading config");
            Self::load(&candidate)
        } else {
            Ok(Self::default())
        }
    }
}

impl RunnerConfig {
    /// Simulator program for a version
    pub fn program_for(&self, version: SimulatorVersion) -> String {
        self.program.replace("{version}", version.as_str())
    }

    /// Launcher words for a worker count, split like a shell would
    pub fn launcher_for(&self, workers: u32) -> Result<Vec<String>> {
        let expanded = self.launcher.replace("{workers}", &workers.to_string());
        shlex::split(&expanded).ok_or_else(|| {
            GradeError::Usage(format!("invalid launcher command: {}", self.launcher))
        })
    }

    /// Timeout as a duration, `None` when disabled
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}
