//! `nbody-grade validate` - compare a single output file with its reference

use std::path::Path;

use nbody_grade_core::error::{GradeError, Result};
use nbody_grade_core::validate::validate;
use serde_json::json;

use crate::commands::dispatch::CommandContext;

pub fn execute(ctx: &CommandContext, actual: &Path, reference: &Path, scene: &str) -> Result<()> {
    let summary = validate(actual, reference, scene).map_err(|e| GradeError::validation(scene, e))?;

    if ctx.is_json() {
        let output = json!({
            "scene": scene,
            "valid": true,
            "summary": summary,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if !ctx.cli.quiet {
        println!(
            "{scene}: ok ({} records, threshold {:?}, max deviation {:?})",
            summary.records, summary.threshold, summary.max_abs_diff
        );
    }

    Ok(())
}
