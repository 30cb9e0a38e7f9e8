//! Configuration type definitions

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Default launcher wrapped around the simulator binary
pub const DEFAULT_LAUNCHER: &str = "mpirun -n {workers}";

/// Default simulator program name; `{version}` is substituted
pub const DEFAULT_PROGRAM: &str = "nbody-release-{version}";

/// Default per-run timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 600;

/// Top-level grader configuration (`nbody-grade.toml`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GraderConfig {
    /// How the simulator is launched
    #[serde(default)]
    pub runner: RunnerConfig,

    /// Benchmark inputs and session outputs
    #[serde(default)]
    pub paths: PathsConfig,
}

/// Simulator invocation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunnerConfig {
    /// Shell-word launcher prefix; `{workers}` is substituted. Empty runs the
    /// program directly.
    #[serde(default = "default_launcher")]
    pub launcher: String,

    /// Simulator program; `{version}` is substituted
    #[serde(default = "default_program")]
    pub program: String,

    /// Per-run timeout in seconds (0 disables)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            launcher: default_launcher(),
            program: default_program(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Filesystem locations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PathsConfig {
    /// Directory holding `<scene>-init.txt` and `<scene>-ref.txt`
    #[serde(default = "default_benchmark_dir")]
    pub benchmark_dir: PathBuf,

    /// Session output directory, cleared at session start
    #[serde(default = "default_logs_dir")]
    pub logs_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            benchmark_dir: default_benchmark_dir(),
            logs_dir: default_logs_dir(),
        }
    }
}

fn default_launcher() -> String {
    DEFAULT_LAUNCHER.to_string()
}

fn default_program() -> String {
    DEFAULT_PROGRAM.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_benchmark_dir() -> PathBuf {
    PathBuf::from("src/benchmark-files")
}

fn default_logs_dir() -> PathBuf {
    PathBuf::from("logs")
}
