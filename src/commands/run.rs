//! `nbody-grade run` - grade the full scene x configuration matrix

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use nbody_grade_core::catalog::{configurations, Catalog, Configuration, Scene};
use nbody_grade_core::config::GraderConfig;
use nbody_grade_core::error::Result;
use nbody_grade_core::report::{render_human, render_json};
use nbody_grade_core::runner::{ProcessSimulator, RunDriver};
use nbody_grade_core::session::{CellObserver, CellResult, GradingSession, SilentObserver};
use tracing::info;

use crate::cli::RunArgs;
use crate::commands::dispatch::CommandContext;

/// Prints a line before and after every cell
struct ProgressObserver;

impl CellObserver for ProgressObserver {
    fn on_cell_start(&mut self, scene: &Scene, configuration: &Configuration) {
        println!(
            "--- running {} on {} workers ---",
            scene.name, configuration.workers
        );
    }

    fn on_cell_done(&mut self, _scene: &Scene, _configuration: &Configuration, cell: &CellResult) {
        println!("total simulation time: {:.6}s", cell.elapsed_secs);
    }
}

/// Command-line flags win over the config file
fn apply_overrides(config: &mut GraderConfig, args: &RunArgs) {
    if let Some(secs) = args.timeout_secs {
        config.runner.timeout_secs = secs;
    }
    if let Some(launcher) = &args.launcher {
        config.runner.launcher = launcher.clone();
    }
    if let Some(program) = &args.program {
        config.runner.program = program.clone();
    }
    if let Some(dir) = &args.logs_dir {
        config.paths.logs_dir = dir.clone();
    }
    if let Some(dir) = &args.benchmark_dir {
        config.paths.benchmark_dir = dir.clone();
    }
}

/// Ctrl-C sets the returned flag; the session stops at the next check
fn install_interrupt_handler() -> Arc<AtomicBool> {
    let interrupted = Arc::new(AtomicBool::new(false));
    let interrupted_clone = interrupted.clone();
    let _ = ctrlc::set_handler(move || {
        interrupted_clone.store(true, Ordering::SeqCst);
    });
    interrupted
}

pub fn execute(ctx: &CommandContext, args: &RunArgs) -> Result<()> {
    let mut config = ctx.load_config()?;
    apply_overrides(&mut config, args);

    let catalog = Catalog::builtin(args.sim_version)?.select(&args.scenes)?;
    let configurations = configurations(args.sim_version, args.platform, args.load_balance);

    info!(
        version = %args.sim_version,
        platform = %args.platform,
        load_balance = args.load_balance,
        scenes = catalog.scenes().len(),
        program = %config.runner.program_for(args.sim_version),
        "starting grading session"
    );

    let interrupted = install_interrupt_handler();
    let simulator =
        ProcessSimulator::new(config.runner.timeout()).with_interrupt(interrupted.clone());
    let driver = RunDriver::new(Box::new(simulator), config, args.sim_version);
    let session = GradingSession::new(catalog, args.platform, configurations, driver)?
        .with_interrupt(interrupted);

    let report = if ctx.shows_progress() {
        session.run_all(&mut ProgressObserver)?
    } else {
        session.run_all(&mut SilentObserver)?
    };

    if ctx.is_json() {
        let json = render_json(&report)?;
        println!("{json}");
    } else {
        print!("{}", render_human(&report));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nbody_grade_core::catalog::{Platform, SimulatorVersion};
    use std::path::PathBuf;

    fn args() -> RunArgs {
        RunArgs {
            sim_version: SimulatorVersion::V2,
            load_balance: true,
            platform: Platform::Ghc,
            scenes: Vec::new(),
            timeout_secs: None,
            logs_dir: None,
            benchmark_dir: None,
            launcher: None,
            program: None,
        }
    }

    #[test]
    fn test_no_flags_keeps_config() {
        let mut config = GraderConfig::default();
        apply_overrides(&mut config, &args());
        assert_eq!(config, GraderConfig::default());
    }

    #[test]
    fn test_flags_override_config() {
        let mut config = GraderConfig::default();
        let args = RunArgs {
            timeout_secs: Some(0),
            launcher: Some(String::new()),
            program: Some("./fake-nbody".to_string()),
            logs_dir: Some(PathBuf::from("out")),
            benchmark_dir: Some(PathBuf::from("bench")),
            ..args()
        };
        apply_overrides(&mut config, &args);

        assert_eq!(config.runner.timeout_secs, 0);
        assert_eq!(config.runner.launcher, "");
        assert_eq!(config.runner.program, "./fake-nbody");
        assert_eq!(config.paths.logs_dir, PathBuf::from("out"));
        assert_eq!(config.paths.benchmark_dir, PathBuf::from("bench"));
    }
}
