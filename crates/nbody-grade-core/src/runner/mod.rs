//! Run driver: one simulator run per (scene, configuration) cell
//!
//! The driver builds a structured [`Invocation`], hands it to a [`Simulator`]
//! and turns the outcome into a [`RunArtifact`] carrying the measured elapsed
//! time. How the simulator is actually executed is hidden behind the
//! [`Simulator`] trait; [`ProcessSimulator`] is the real implementation.

mod process;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;
use tracing::{debug, info, warn};

use crate::catalog::{Configuration, Scene, SimulatorVersion};
use crate::config::GraderConfig;
use crate::error::{GradeError, Result};

pub use process::ProcessSimulator;

/// Marker line the simulator prints when it finishes
static TIMING_MARKER: OnceLock<Option<Regex>> = OnceLock::new();

fn timing_marker() -> Option<&'static Regex> {
    TIMING_MARKER
        .get_or_init(|| {
            match Regex::new(r"total simulation time: ([0-9]+(?:\.[0-9]*)?(?:[eE][-+]?[0-9]+)?)s") {
                Ok(re) => Some(re),
                Err(e) => {
                    warn!(error = %e, "Failed to compile timing marker regex");
                    None
                }
            }
        })
        .as_ref()
}

/// Extract the elapsed simulation time (seconds) from simulator log text.
/// The first marker wins.
pub fn parse_elapsed(log_text: &str) -> Option<f64> {
    timing_marker()?
        .captures(log_text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// A fully resolved simulator command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Executable to spawn (the launcher, or the simulator itself)
    pub program: String,
    /// Arguments, one per element; never re-split by a shell
    pub args: Vec<String>,
    /// File that receives the simulator's standard output
    pub stdout_path: PathBuf,
}

impl Invocation {
    /// Human-readable command line for logs
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .map(|word| shlex::try_quote(word).unwrap_or_else(|_| word.into()))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Value following `flag` in the argument list
    pub fn arg_value(&self, flag: &str) -> Option<&str> {
        self.args
            .iter()
            .position(|a| a == flag)
            .and_then(|i| self.args.get(i + 1))
            .map(String::as_str)
    }
}

/// How a simulator process ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// The process terminated on its own
    Exited { exit_code: i32, stderr: String },
    /// The process was killed after exceeding its time limit
    TimedOut { after: Duration },
}

/// Executes simulator invocations
pub trait Simulator {
    /// Run `invocation` to completion, blocking the caller.
    fn run(&self, invocation: &Invocation) -> Result<ProcessOutcome>;
}

/// Artifacts of one successful run
#[derive(Debug, Clone, PartialEq)]
pub struct RunArtifact {
    pub output_path: PathBuf,
    pub log_path: PathBuf,
    pub exit_code: i32,
    pub elapsed_secs: f64,
}

/// Runs scenes through a [`Simulator`] using the grader configuration
pub struct RunDriver {
    simulator: Box<dyn Simulator>,
    config: GraderConfig,
    version: SimulatorVersion,
}

impl RunDriver {
    pub fn new(
        simulator: Box<dyn Simulator>,
        config: GraderConfig,
        version: SimulatorVersion,
    ) -> Self {
        Self {
            simulator,
            config,
            version,
        }
    }

    pub fn config(&self) -> &GraderConfig {
        &self.config
    }

    pub fn benchmark_dir(&self) -> &Path {
        &self.config.paths.benchmark_dir
    }

    pub fn logs_dir(&self) -> &Path {
        &self.config.paths.logs_dir
    }

    /// Build the simulator command for a cell
    pub fn invocation(&self, scene: &Scene, configuration: &Configuration) -> Result<Invocation> {
        let paths = &self.config.paths;
        let mut words = self.config.runner.launcher_for(configuration.workers)?;
        words.push(self.config.runner.program_for(self.version));

        if configuration.load_balance {
            words.push("-lb".to_string());
        }

        words.extend([
            "-n".to_string(),
            scene.particle_count.to_string(),
            "-i".to_string(),
            scene.iterations.to_string(),
            "-in".to_string(),
            scene.init_file(&paths.benchmark_dir).display().to_string(),
            "-s".to_string(),
            format_space_size(scene.space_size),
            "-o".to_string(),
            scene.output_file(&paths.logs_dir).display().to_string(),
        ]);

        let program = words.remove(0);
        Ok(Invocation {
            program,
            args: words,
            stdout_path: scene.log_file(&paths.logs_dir),
        })
    }

    /// Run one cell and measure it. Any failure is fatal for the session.
    pub fn run(&self, scene: &Scene, configuration: &Configuration) -> Result<RunArtifact> {
        let invocation = self.invocation(scene, configuration)?;
        debug!(command = %invocation.command_line(), "launching simulator");

        let exit_code = match self.simulator.run(&invocation)? {
            ProcessOutcome::Exited { exit_code, stderr } => {
                if exit_code != 0 {
                    if !stderr.trim().is_empty() {
                        warn!(scene = %scene.name, stderr = %stderr.trim(), "simulator stderr");
                    }
                    return Err(GradeError::Process {
                        scene: scene.name.clone(),
                        workers: configuration.workers,
                        exit_code,
                    });
                }
                exit_code
            }
            ProcessOutcome::TimedOut { after } => {
                warn!(scene = %scene.name, workers = configuration.workers, ?after, "simulator timed out");
                return Err(GradeError::Timeout {
                    scene: scene.name.clone(),
                    workers: configuration.workers,
                    secs: after.as_secs(),
                });
            }
        };

        let log_path = invocation.stdout_path;
        let log_text = fs::read_to_string(&log_path)
            .map_err(|e| GradeError::io("read log", &log_path, e))?;
        let elapsed_secs = parse_elapsed(&log_text)
            .ok_or_else(|| GradeError::TimingMarkerMissing {
                log_path: log_path.clone(),
            })?;

        info!(
            scene = %scene.name,
            workers = configuration.workers,
            elapsed_secs,
            "simulation finished"
        );

        Ok(RunArtifact {
            output_path: scene.output_file(self.logs_dir()),
            log_path,
            exit_code,
            elapsed_secs,
        })
    }
}

/// Space sizes are passed with one decimal like `500.0`, matching how the
/// benchmark table is written.
fn format_space_size(space_size: f64) -> String {
    if space_size.fract() == 0.0 {
        format!("{space_size:.1}")
    } else {
        space_size.to_string()
    }
}
