//! Command trait and context for dispatching commands

use std::path::PathBuf;
use std::time::Instant;

use nbody_grade_core::config::GraderConfig;
use nbody_grade_core::error::Result;
use tracing::debug;

use crate::cli::{Cli, Commands, OutputFormat};
use crate::commands::{run, scenes, score, validate};

/// Shared context for command execution
pub struct CommandContext<'a> {
    pub cli: &'a Cli,
    pub root: &'a PathBuf,
    pub start: Instant,
}

impl<'a> CommandContext<'a> {
    pub fn new(cli: &'a Cli, root: &'a PathBuf, start: Instant) -> Self {
        Self { cli, root, start }
    }

    /// `--config`, else `nbody-grade.toml` in the working directory, else defaults
    pub fn load_config(&self) -> Result<GraderConfig> {
        GraderConfig::discover(self.cli.config.as_deref(), self.root)
    }

    pub fn is_json(&self) -> bool {
        self.cli.format == OutputFormat::Json
    }

    /// Progress lines are only shown for human output
    pub fn shows_progress(&self) -> bool {
        !self.cli.quiet && !self.is_json()
    }
}

/// Trait for commands that can be executed
pub trait Command {
    fn execute(&self, ctx: &CommandContext) -> Result<()>;
}

impl Command for Commands {
    fn execute(&self, ctx: &CommandContext) -> Result<()> {
        let result = match self {
            Commands::Run(args) => run::execute(ctx, args),
            Commands::Scenes {
                sim_version,
                platform,
            } => scenes::execute(ctx, *sim_version, *platform),
            Commands::Validate {
                actual,
                reference,
                scene,
            } => validate::execute(ctx, actual, reference, scene),
            Commands::Score {
                actual_secs,
                reference_secs,
            } => score::execute(ctx, *actual_secs, *reference_secs),
        };
        debug!(elapsed = ?ctx.start.elapsed(), ok = result.is_ok(), "command");
        result
    }
}
