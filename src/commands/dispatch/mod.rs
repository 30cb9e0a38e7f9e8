//! Command dispatch logic for nbody-grade

use std::env;
use std::time::Instant;

use nbody_grade_core::error::{GradeError, Result};
use tracing::debug;

use crate::cli::Cli;

mod command;

pub use command::{Command, CommandContext};

pub fn run(cli: &Cli, start: Instant) -> Result<()> {
    let root = env::current_dir().map_err(|e| GradeError::io("resolve", ".", e))?;

    debug!(elapsed = ?start.elapsed(), root = %root.display(), "resolve_root");

    let ctx = CommandContext::new(cli, &root, start);
    cli.command.execute(&ctx)
}
