//! CLI argument parsing for nbody-grade
//!
//! Global flags: --format, --quiet, --verbose, --log-level, --log-json, --config

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

use nbody_grade_core::catalog::{Platform, SimulatorVersion};

/// Output format for nbody-grade commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable tables (default)
    #[default]
    Human,
    /// JSON output for machine consumption
    Json,
}

/// nbody-grade - grade a parallel N-body simulator for correctness and speed
#[derive(Parser, Debug)]
#[command(name = "nbody-grade")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(long, global = true, value_enum, default_value = "human")]
    pub format: OutputFormat,

    /// Suppress progress output
    #[arg(long, short, global = true)]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Log level or filter directive (e.g. "info", "nbody_grade_core=trace")
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Path to an nbody-grade.toml configuration file
    #[arg(long, global = true, env = "NBODY_GRADE_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the full benchmark matrix and print time and score tables
    Run(RunArgs),

    /// List benchmark scenes, worker counts and reference times
    Scenes {
        /// Simulator version (v1 or v2)
        #[arg(value_name = "VERSION", value_parser = parse_version)]
        sim_version: SimulatorVersion,

        /// Platform (ghc or psc)
        #[arg(value_parser = parse_platform, allow_hyphen_values = true)]
        platform: Platform,
    },

    /// Compare one output file against a reference file
    Validate {
        /// Particle file produced by the simulator
        actual: PathBuf,

        /// Expected particle file
        reference: PathBuf,

        /// Scene name; selects the tolerance ("repeat" scenes are looser)
        #[arg(long)]
        scene: String,
    },

    /// Score a measured time against a reference time
    Score {
        /// Measured simulation time in seconds
        actual_secs: f64,

        /// Reference simulation time in seconds
        reference_secs: f64,
    },
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Simulator version (v1 or v2)
    #[arg(value_name = "VERSION", value_parser = parse_version)]
    pub sim_version: SimulatorVersion,

    /// Load balancing: 0 = off, 1 = on
    #[arg(value_name = "MODE", value_parser = parse_mode, action = ArgAction::Set)]
    pub load_balance: bool,

    /// Platform (ghc or psc; -ghc and -psc are accepted too)
    #[arg(value_parser = parse_platform, allow_hyphen_values = true)]
    pub platform: Platform,

    /// Only grade these scenes (repeatable)
    #[arg(long = "scene", value_name = "NAME")]
    pub scenes: Vec<String>,

    /// Per-run timeout in seconds (0 disables)
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Directory for simulator outputs and logs (cleared at start)
    #[arg(long)]
    pub logs_dir: Option<PathBuf>,

    /// Directory holding <scene>-init.txt and <scene>-ref.txt
    #[arg(long)]
    pub benchmark_dir: Option<PathBuf>,

    /// Launcher prefix, e.g. "mpirun -n {workers}" ("" runs the program directly)
    #[arg(long)]
    pub launcher: Option<String>,

    /// Simulator program, e.g. "./nbody-release-{version}"
    #[arg(long)]
    pub program: Option<String>,
}

fn parse_version(s: &str) -> Result<SimulatorVersion, String> {
    s.parse().map_err(|e: nbody_grade_core::error::GradeError| e.to_string())
}

fn parse_platform(s: &str) -> Result<Platform, String> {
    s.parse().map_err(|e: nbody_grade_core::error::GradeError| e.to_string())
}

fn parse_mode(s: &str) -> Result<bool, String> {
    match s {
        "0" => Ok(false),
        "1" => Ok(true),
        other => Err(format!("invalid mode: {other} (expected: 0 or 1)")),
    }
}
